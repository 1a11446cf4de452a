#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::simd::traits::SimdVec;

pub const LANE_COUNT: usize = 4;

/// A SIMD vector of 4 32-bit floating point values
#[derive(Copy, Clone, Debug)]
pub struct F32x4 {
    elements: float32x4_t,
}

impl SimdVec for F32x4 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self {
            elements: vdupq_n_f32(0.0),
        }
    }

    /// Broadcasts `value` into all four lanes.
    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: vdupq_n_f32(value),
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");
        Self {
            elements: vld1q_f32(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");
        vst1q_f32(ptr, self.elements);
    }

    // vfmaq_f32(a, b, c) computes a + b * c with a single rounding
    #[inline(always)]
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self {
        Self {
            elements: vfmaq_f32(self.elements, a.elements, b.elements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmadd_matches_mul_add() {
        let a = [1.0f32, -2.0, 0.25, 8.0];
        let b = [3.0f32, 3.0, 4.0, 0.125];
        let mut out = [0.0f32; LANE_COUNT];
        unsafe {
            F32x4::splat(2.0)
                .fmadd(F32x4::load(a.as_ptr()), F32x4::load(b.as_ptr()))
                .store_at(out.as_mut_ptr());
        }
        for i in 0..LANE_COUNT {
            assert_eq!(out[i], a[i].mul_add(b[i], 2.0));
        }
    }

    #[test]
    fn test_zero() {
        let mut out = [1.0f32; LANE_COUNT];
        unsafe { F32x4::zero().store_at(out.as_mut_ptr()) };
        assert_eq!(out, [0.0; LANE_COUNT]);
    }
}
