//! Vector register types used by the tiled kernel.
//!
//! Exactly one instruction-set backend is compiled in, chosen by `build.rs`
//! through the `avx2`, `neon` or `fallback` cfg. [`Lane`] names the active
//! backend type and [`LANES`] its width, which is also the band width of the
//! preswizzled layout.

#[cfg(avx2)]
pub mod avx2;

#[cfg(neon)]
pub mod neon;

pub mod scalar;

pub mod traits;

pub use traits::SimdVec;

#[cfg(avx2)]
pub type Lane = avx2::f32x8::F32x8;

#[cfg(neon)]
pub type Lane = neon::f32x4::F32x4;

#[cfg(fallback)]
pub type Lane = scalar::Scalar<4>;

/// Width of the active backend in f32 lanes.
pub const LANES: usize = <Lane as SimdVec>::LANES;

/// Human-readable name of the backend selected at build time.
pub const BACKEND: &str = if cfg!(avx2) {
    "avx2+fma"
} else if cfg!(neon) {
    "neon"
} else {
    "scalar"
};
