use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{allocation_error, layout_error, Result};

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Element types for which the all-zero bit pattern is a valid value (`0.0`).
pub trait ZeroBits: Copy + sealed::Sealed {}
impl ZeroBits for f32 {}
impl ZeroBits for f64 {}

/// An owned, fixed-length buffer whose first element sits on an `align`-byte boundary.
///
/// Memory comes from `std::alloc::alloc_zeroed` and is released with the same
/// `Layout` on drop, so it never passes through `Vec`'s allocator bookkeeping.
/// The buffer derefs to a slice, which is how every kernel consumes it.
///
/// # Example
///
/// ```
/// use tilegemm::utils::AlignedVec;
///
/// let buf = AlignedVec::<f32>::new_zeroed(16, 64).unwrap();
/// assert_eq!(buf.as_ptr() as usize % 64, 0);
/// assert!(buf.iter().all(|&x| x == 0.0));
/// ```
pub struct AlignedVec<T: ZeroBits> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

// SAFETY: AlignedVec uniquely owns its allocation, like Vec<T>.
unsafe impl<T: ZeroBits + Send> Send for AlignedVec<T> {}
unsafe impl<T: ZeroBits + Sync> Sync for AlignedVec<T> {}

impl<T: ZeroBits> AlignedVec<T> {
    /// Allocates `len` zero-initialised elements aligned to `align` bytes.
    ///
    /// # Errors
    ///
    /// - `LayoutError` if `align` is not a power of two, is smaller than the
    ///   natural alignment of `T`, or the byte size overflows.
    /// - `AllocationError` if the allocator returns null.
    pub fn new_zeroed(len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() || align < mem::align_of::<T>() {
            return Err(layout_error(
                len,
                align,
                "alignment must be a power of two no smaller than the element alignment",
            ));
        }

        let size = len
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| layout_error(len, align, "byte size overflows usize"))?;

        let layout = Layout::from_size_align(size, align)
            .map_err(|e| layout_error(size, align, e.to_string()))?;

        if size == 0 {
            // Zero-sized layouts must not reach the allocator.
            let ptr = NonNull::new(align as *mut T).ok_or_else(|| {
                layout_error(size, align, "alignment does not form a valid pointer")
            })?;
            return Ok(AlignedVec { ptr, len, layout });
        }

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut T)
            .ok_or_else(|| allocation_error(size, align, "allocator returned null"))?;

        Ok(AlignedVec { ptr, len, layout })
    }

    /// Alignment the buffer was created with, in bytes.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl<T: ZeroBits> Drop for AlignedVec<T> {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: allocated in new_zeroed with this exact layout.
            unsafe {
                dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
            }
        }
    }
}

impl<T: ZeroBits> Deref for AlignedVec<T> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        // SAFETY: ptr is valid for len initialised elements for the lifetime of self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: ZeroBits> DerefMut for AlignedVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: as in deref, and &mut self guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: ZeroBits + fmt::Debug> fmt::Debug for AlignedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedVec")
            .field("len", &self.len)
            .field("align", &self.layout.align())
            .finish()
    }
}
