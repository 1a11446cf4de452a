//! Portable lanes used when no vector backend was selected at build time.
//!
//! `Scalar<L>` behaves like an `L`-lane register held in an array. Each lane
//! uses `f32::mul_add`, so its arithmetic is bit-identical to a hardware FMA
//! backend of the same width.

use crate::simd::traits::SimdVec;

/// `L` f32 lanes processed one at a time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scalar<const L: usize> {
    elements: [f32; L],
}

impl<const L: usize> Scalar<L> {
    /// Copy of the lanes.
    pub fn to_array(self) -> [f32; L] {
        self.elements
    }
}

impl<const L: usize> SimdVec for Scalar<L> {
    const LANES: usize = L;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self { elements: [0.0; L] }
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: [value; L],
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");
        let mut elements = [0.0; L];
        std::ptr::copy_nonoverlapping(ptr, elements.as_mut_ptr(), L);
        Self { elements }
    }

    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");
        std::ptr::copy_nonoverlapping(self.elements.as_ptr(), ptr, L);
    }

    #[inline(always)]
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self {
        let mut elements = self.elements;
        for ((acc, x), y) in elements.iter_mut().zip(a.elements).zip(b.elements) {
            *acc = x.mul_add(y, *acc);
        }
        Self { elements }
    }
}
