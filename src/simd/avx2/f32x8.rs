//! AVX2 8-lane f32 vector used by the tiled kernel.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: AVX2 and FMA3 (Intel Haswell, AMD Excavator and later)
//! - **Target Architecture**: x86_64
//!
//! The build script only selects this backend when the build host reports
//! both features; [`crate::kernel`] still confirms them at runtime before
//! entering AVX2 code.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::traits::SimdVec;

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX2 256-bit register containing 8 packed f32 values
    pub elements: __m256,
}

impl SimdVec for F32x8 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self {
            elements: _mm256_setzero_ps(),
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: _mm256_set1_ps(value),
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");
        Self {
            elements: _mm256_loadu_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");
        _mm256_storeu_ps(ptr, self.elements);
    }

    /// Fused multiply-add: `self + a * b`.
    #[inline(always)]
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self {
        Self {
            elements: _mm256_fmadd_ps(a.elements, b.elements, self.elements),
        }
    }
}
