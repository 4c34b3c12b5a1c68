//! Raw typed buffer allocation
//!
//! Thin wrappers over `std::alloc` used by the container engines. They compute
//! array layouts with overflow checks, map allocator failures to
//! [`CollectionError::OutOfMemory`], and never touch the allocator for
//! zero-sized element types or zero-length requests.

use crate::error::{CollectionError, Result};
use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

#[inline]
fn layout_for<T>(cap: usize) -> Result<Layout> {
    Layout::array::<T>(cap)
        .map_err(|_| CollectionError::out_of_memory(cap.saturating_mul(mem::size_of::<T>())))
}

#[inline]
fn needs_allocation<T>(cap: usize) -> bool {
    cap != 0 && mem::size_of::<T>() != 0
}

/// Allocate an uninitialized buffer able to hold `cap` values of `T`
pub(crate) fn alloc_array<T>(cap: usize) -> Result<NonNull<T>> {
    if !needs_allocation::<T>(cap) {
        return Ok(NonNull::dangling());
    }

    let layout = layout_for::<T>(cap)?;
    let ptr = unsafe { alloc::alloc(layout) as *mut T };
    NonNull::new(ptr).ok_or_else(|| CollectionError::out_of_memory(layout.size()))
}

/// Resize a buffer from `old_cap` to `new_cap` slots, keeping the prefix bytes
///
/// On failure the original buffer is untouched and still owned by the caller.
///
/// # Safety
///
/// `ptr` must come from [`alloc_array`] or [`realloc_array`] with `old_cap`.
pub(crate) unsafe fn realloc_array<T>(
    ptr: NonNull<T>,
    old_cap: usize,
    new_cap: usize,
) -> Result<NonNull<T>> {
    if !needs_allocation::<T>(old_cap) {
        return alloc_array(new_cap);
    }
    if !needs_allocation::<T>(new_cap) {
        unsafe { dealloc_array(ptr, old_cap) };
        return Ok(NonNull::dangling());
    }

    let old_layout = layout_for::<T>(old_cap)?;
    let new_layout = layout_for::<T>(new_cap)?;
    let new_ptr =
        unsafe { alloc::realloc(ptr.as_ptr() as *mut u8, old_layout, new_layout.size()) as *mut T };
    NonNull::new(new_ptr).ok_or_else(|| CollectionError::out_of_memory(new_layout.size()))
}

/// Release a buffer without dropping any values inside it
///
/// # Safety
///
/// `ptr` must come from [`alloc_array`] or [`realloc_array`] with `cap`.
pub(crate) unsafe fn dealloc_array<T>(ptr: NonNull<T>, cap: usize) {
    if !needs_allocation::<T>(cap) {
        return;
    }
    if let Ok(layout) = layout_for::<T>(cap) {
        unsafe { alloc::dealloc(ptr.as_ptr() as *mut u8, layout) };
    }
}

/// Fixed-size scratch storage that frees its memory but never drops contents
///
/// Used for the merge step of the array sort, where values are moved in and
/// out bitwise and ownership is tracked by the caller.
pub(crate) struct ScratchBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
}

impl<T> ScratchBuf<T> {
    pub(crate) fn new(cap: usize) -> Result<Self> {
        Ok(Self {
            ptr: alloc_array(cap)?,
            cap,
        })
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> Drop for ScratchBuf<T> {
    fn drop(&mut self) {
        unsafe { dealloc_array(self.ptr, self.cap) };
    }
}
