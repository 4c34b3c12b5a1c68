//! DynArray: contiguous growable array with explicit capacity control
//!
//! The array owns a single heap buffer obtained straight from the allocator.
//! Growth, shrinking and reallocation timing are decided here rather than
//! delegated to `Vec`, so the capacity of the buffer is always predictable:
//!
//! - `push_back`/`insert` on a full array grow to `max(1, 2 * capacity)`
//! - `reserve(c)` grows to exactly `c` when `c > capacity`, never shrinks
//! - `shrink_to_fit` reallocates to exactly `len`
//! - `clear` keeps the buffer
//!
//! The buffer pointer is null exactly when the capacity is zero.

use crate::error::{check_index, check_insert_index, CollectionError, Result};
use crate::raw::{alloc_array, dealloc_array, realloc_array, ScratchBuf};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

const CONTAINER: &str = "DynArray";

/// Contiguous growable array built on a manually managed buffer
///
/// # Examples
///
/// ```rust
/// use rawcoll::DynArray;
///
/// let mut arr = DynArray::from([1, 2, 4, 5]);
/// arr.insert(2, 3).unwrap();
/// assert_eq!(arr.as_slice(), &[1, 2, 3, 4, 5]);
///
/// assert!(arr.insert(10, 99).is_err());
/// assert_eq!(arr.pop_back().unwrap(), 5);
/// ```
pub struct DynArray<T> {
    ptr: Option<NonNull<T>>,
    len: usize,
    cap: usize,
    _marker: PhantomData<T>,
}

impl<T> DynArray<T> {
    /// Create a new empty array without allocating
    #[inline]
    pub fn new() -> Self {
        Self {
            ptr: None,
            len: 0,
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Create an empty array whose buffer holds exactly `cap` elements
    pub fn with_capacity(cap: usize) -> Result<Self> {
        let mut arr = Self::new();
        arr.reserve(cap)?;
        Ok(arr)
    }

    /// Create an array of `size` copies of `value`
    pub fn with_size(size: usize, value: T) -> Result<Self>
    where
        T: Clone,
    {
        let mut arr = Self::with_capacity(size)?;
        for _ in 0..size {
            arr.push_back(value.clone())?;
        }
        Ok(arr)
    }

    /// Create an array of `size` default values
    pub fn with_default_size(size: usize) -> Result<Self>
    where
        T: Default,
    {
        let mut arr = Self::with_capacity(size)?;
        for _ in 0..size {
            arr.push_back(T::default())?;
        }
        Ok(arr)
    }

    /// Create an array holding clones of every element of `items`
    pub fn try_from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        let mut arr = Self::with_capacity(items.len())?;
        arr.extend_from_slice(items)?;
        Ok(arr)
    }

    /// Number of live elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the array holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current buffer
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Pointer to the buffer, null when no buffer is allocated
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null(),
        }
    }

    /// Mutable pointer to the buffer, null when no buffer is allocated
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// View the live elements as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self.ptr {
            Some(ptr) if self.len > 0 => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.len) },
            _ => &[],
        }
    }

    /// View the live elements as a mutable slice
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.ptr {
            Some(ptr) if self.len > 0 => unsafe {
                slice::from_raw_parts_mut(ptr.as_ptr(), self.len)
            },
            _ => &mut [],
        }
    }

    /// Grow the buffer to hold at least `cap` elements
    ///
    /// Requests at or below the current capacity are ignored; the buffer never
    /// shrinks here.
    pub fn reserve(&mut self, cap: usize) -> Result<()> {
        if cap <= self.cap {
            return Ok(());
        }
        self.reallocate(cap)
    }

    /// Reallocate the buffer to exactly `len` slots
    ///
    /// An empty array releases its buffer entirely.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.len == self.cap {
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// Append an element, doubling the capacity first when the buffer is full
    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.len == self.cap {
            self.grow()?;
        }

        unsafe {
            ptr::write(self.as_mut_ptr().add(self.len), value);
        }
        self.len += 1;
        Ok(())
    }

    /// Append into spare capacity without growing
    ///
    /// # Safety
    ///
    /// `len()` must be strictly below `capacity()`.
    #[inline]
    pub(crate) unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.cap);
        unsafe {
            ptr::write(self.as_mut_ptr().add(self.len), value);
        }
        self.len += 1;
    }

    /// Remove and return the last element
    pub fn pop_back(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(CollectionError::underflow(CONTAINER, "pop_back"));
        }
        self.len -= 1;
        Ok(unsafe { ptr::read(self.as_ptr().add(self.len)) })
    }

    /// Reference to the first element
    pub fn front(&self) -> Result<&T> {
        self.as_slice()
            .first()
            .ok_or_else(|| CollectionError::underflow(CONTAINER, "front"))
    }

    /// Mutable reference to the first element
    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice()
            .first_mut()
            .ok_or_else(|| CollectionError::underflow(CONTAINER, "front_mut"))
    }

    /// Reference to the last element
    pub fn back(&self) -> Result<&T> {
        self.as_slice()
            .last()
            .ok_or_else(|| CollectionError::underflow(CONTAINER, "back"))
    }

    /// Mutable reference to the last element
    pub fn back_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice()
            .last_mut()
            .ok_or_else(|| CollectionError::underflow(CONTAINER, "back_mut"))
    }

    /// Bounds-checked access to the element at `index`
    pub fn at(&self, index: usize) -> Result<&T> {
        check_index(index, self.len)?;
        Ok(unsafe { &*self.as_ptr().add(index) })
    }

    /// Bounds-checked mutable access to the element at `index`
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        check_index(index, self.len)?;
        Ok(unsafe { &mut *self.as_mut_ptr().add(index) })
    }

    /// Insert `value` at `index`, shifting the tail one slot to the right
    ///
    /// `index == len()` appends. The bound is checked before any growth.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        check_insert_index(index, self.len)?;

        if self.len == self.cap {
            self.grow()?;
        }

        unsafe {
            let slot = self.as_mut_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.len - index);
            ptr::write(slot, value);
        }
        self.len += 1;
        Ok(())
    }

    /// Remove and return the element at `index`, shifting the tail left
    pub fn erase(&mut self, index: usize) -> Result<T> {
        check_index(index, self.len)?;

        unsafe {
            let slot = self.as_mut_ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            Ok(value)
        }
    }

    /// Drop every element, keeping the buffer and its capacity
    pub fn clear(&mut self) {
        let live: *mut [T] = self.as_mut_slice();
        // a panicking destructor must not leave dropped slots inside `len`
        self.len = 0;
        unsafe {
            ptr::drop_in_place(live);
        }
    }

    /// Move the contents out, leaving `self` empty with no buffer
    ///
    /// The returned array owns the original buffer; `self` stays usable.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Append clones of every element of `items`
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<()>
    where
        T: Clone,
    {
        let required = self
            .len
            .checked_add(items.len())
            .ok_or_else(|| CollectionError::out_of_memory(usize::MAX))?;
        self.reserve(required)?;
        for item in items {
            self.push_back(item.clone())?;
        }
        Ok(())
    }

    /// Sort in ascending order with a stable merge sort
    pub fn sort(&mut self) -> Result<()>
    where
        T: PartialOrd,
    {
        self.sort_with(|a, b| a < b)
    }

    /// Sort with a "goes before" predicate using a stable merge sort
    ///
    /// `goes_before(a, b)` must return `true` when `a` has to be placed ahead
    /// of `b`. Elements for which neither goes before the other keep their
    /// relative order. Passing `|a, b| a > b` sorts in descending order.
    ///
    /// If the predicate panics every element is still present exactly once,
    /// though the order is unspecified.
    pub fn sort_with<F>(&mut self, mut goes_before: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> bool,
    {
        if self.len < 2 {
            return Ok(());
        }
        let last = self.len - 1;
        self.merge_sort(0, last, &mut goes_before)
    }

    fn merge_sort<F>(&mut self, left: usize, right: usize, goes_before: &mut F) -> Result<()>
    where
        F: FnMut(&T, &T) -> bool,
    {
        if left >= right {
            return Ok(());
        }
        let mid = left + (right - left) / 2;
        self.merge_sort(left, mid, goes_before)?;
        self.merge_sort(mid + 1, right, goes_before)?;
        self.merge(left, mid, right, goes_before)
    }

    /// Merge the sorted runs `[left, mid]` and `[mid + 1, right]`
    fn merge<F>(&mut self, left: usize, mid: usize, right: usize, goes_before: &mut F) -> Result<()>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let left_len = mid - left + 1;
        let right_len = right - mid;
        let left_run = ScratchBuf::<T>::new(left_len)?;
        let right_run = ScratchBuf::<T>::new(right_len)?;

        let base = self.as_mut_ptr();
        // the hole is dropped before the scratch buffers it reads from
        let mut hole = unsafe {
            ptr::copy_nonoverlapping(base.add(left), left_run.as_ptr(), left_len);
            ptr::copy_nonoverlapping(base.add(mid + 1), right_run.as_ptr(), right_len);
            MergeHole {
                dest: base.add(left),
                left: left_run.as_ptr(),
                left_len,
                i: 0,
                right: right_run.as_ptr(),
                right_len,
                j: 0,
            }
        };

        while hole.i < hole.left_len && hole.j < hole.right_len {
            unsafe {
                let l = hole.left.add(hole.i);
                let r = hole.right.add(hole.j);
                // ties take the left run
                if goes_before(&*r, &*l) {
                    ptr::copy_nonoverlapping(r, hole.dest, 1);
                    hole.j += 1;
                } else {
                    ptr::copy_nonoverlapping(l, hole.dest, 1);
                    hole.i += 1;
                }
                hole.dest = hole.dest.add(1);
            }
        }
        Ok(())
    }

    fn grow(&mut self) -> Result<()> {
        let new_cap = if self.cap == 0 {
            1
        } else {
            self.cap
                .checked_mul(2)
                .ok_or_else(|| CollectionError::out_of_memory(usize::MAX))?
        };
        self.reallocate(new_cap)
    }

    /// Move the buffer to exactly `new_cap` slots; `new_cap` must be `>= len`
    fn reallocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap >= self.len);
        log::trace!("DynArray reallocating from {} to {} slots", self.cap, new_cap);

        if new_cap == 0 {
            if let Some(ptr) = self.ptr.take() {
                unsafe { dealloc_array(ptr, self.cap) };
            }
            self.cap = 0;
            return Ok(());
        }

        let new_ptr = match self.ptr {
            Some(ptr) => unsafe { realloc_array(ptr, self.cap, new_cap)? },
            None => alloc_array(new_cap)?,
        };
        self.ptr = Some(new_ptr);
        self.cap = new_cap;
        Ok(())
    }
}

/// Remaining halves of an in-progress merge
///
/// On drop, whatever is left of both runs is copied behind `dest`, so the
/// destination range holds every element exactly once even if the predicate
/// unwinds.
struct MergeHole<T> {
    dest: *mut T,
    left: *mut T,
    left_len: usize,
    i: usize,
    right: *mut T,
    right_len: usize,
    j: usize,
}

impl<T> Drop for MergeHole<T> {
    fn drop(&mut self) {
        unsafe {
            let rest_left = self.left_len - self.i;
            ptr::copy_nonoverlapping(self.left.add(self.i), self.dest, rest_left);
            ptr::copy_nonoverlapping(
                self.right.add(self.j),
                self.dest.add(rest_left),
                self.right_len - self.j,
            );
        }
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        self.clear();
        if let Some(ptr) = self.ptr.take() {
            unsafe { dealloc_array(ptr, self.cap) };
        }
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for DynArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.at(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T> IndexMut<usize> for DynArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match self.at_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T: Hash> Hash for DynArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T: Clone> Clone for DynArray<T> {
    /// Deep copy into a fresh buffer of the same capacity
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        if let Err(err) = copy.reserve(self.cap) {
            panic!("DynArray clone failed: {}", err);
        }
        for item in self.as_slice() {
            // capacity is already sufficient, so this never reallocates
            unsafe {
                ptr::write(copy.as_mut_ptr().add(copy.len), item.clone());
            }
            copy.len += 1;
        }
        copy
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend(iter);
        arr
    }
}

impl<T> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            if let Err(err) = self.push_back(item) {
                panic!("DynArray extend failed: {}", err);
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut arr = mem::ManuallyDrop::new(self);
        IntoIter {
            ptr: arr.ptr.take(),
            cap: arr.cap,
            start: 0,
            end: arr.len,
            _marker: PhantomData,
        }
    }
}

/// Owning iterator over the elements of a [`DynArray`]
pub struct IntoIter<T> {
    ptr: Option<NonNull<T>>,
    cap: usize,
    start: usize,
    end: usize,
    _marker: PhantomData<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let ptr = self.ptr?;
        if self.start == self.end {
            return None;
        }
        let value = unsafe { ptr::read(ptr.as_ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        let ptr = self.ptr?;
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { ptr::read(ptr.as_ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            unsafe {
                let rest = slice::from_raw_parts_mut(ptr.as_ptr().add(self.start), self.end - self.start);
                ptr::drop_in_place(rest);
                dealloc_array(ptr, self.cap);
            }
        }
    }
}

// Safety: DynArray<T> uniquely owns its buffer, like Vec<T>
unsafe impl<T: Send> Send for DynArray<T> {}

// Safety: shared access only hands out &T
unsafe impl<T: Sync> Sync for DynArray<T> {}

unsafe impl<T: Send> Send for IntoIter<T> {}

unsafe impl<T: Sync> Sync for IntoIter<T> {}
