/// The handful of vector operations the tiled kernel is written against.
///
/// One implementation exists per instruction set (`F32x8` for AVX2, `F32x4`
/// for NEON) plus the portable [`Scalar`](crate::simd::scalar::Scalar) lanes.
/// All pointers are to `f32` and every load/store moves exactly `LANES`
/// elements; the kernel never issues partial vectors.
pub trait SimdVec: Copy {
    /// Number of f32 lanes in one vector.
    const LANES: usize;

    /// A vector with every lane set to `0.0`.
    ///
    /// # Safety
    ///
    /// The instruction set backing `Self` must be available on the running CPU.
    unsafe fn zero() -> Self;

    /// A vector with every lane set to `value`.
    ///
    /// # Safety
    ///
    /// The instruction set backing `Self` must be available on the running CPU.
    unsafe fn splat(value: f32) -> Self;

    /// Loads `LANES` consecutive values starting at `ptr`. No alignment is required.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `LANES` f32 values.
    unsafe fn load(ptr: *const f32) -> Self;

    /// Writes all lanes to `LANES` consecutive values starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `LANES` f32 values.
    unsafe fn store_at(&self, ptr: *mut f32);

    /// Returns `self + a * b` with a single rounding per lane.
    ///
    /// # Safety
    ///
    /// The instruction set backing `Self` must be available on the running CPU.
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self;
}
