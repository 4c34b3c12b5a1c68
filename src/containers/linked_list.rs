//! DList: doubly linked list over individually allocated nodes
//!
//! Each element lives in its own heap node carrying links to its neighbours.
//! The list owns the chain through `head`, keeps `tail` as a back reference
//! for O(1) appends, and tracks the element count. The following hold after
//! every public operation:
//!
//! - `head`, `tail` and `len` are all empty together
//! - walking `next` from `head` visits `len` nodes and ends at `tail`
//! - for every node, `node.next.prev == node` and `node.prev.next == node`
//!
//! [`DList::verify_links`] checks all of the above and is used heavily by
//! the test suite.

use crate::error::{check_index, check_insert_index, CollectionError, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

const CONTAINER: &str = "DList";

type Link<T> = Option<NonNull<Node<T>>>;

struct Node<T> {
    value: T,
    prev: Link<T>,
    next: Link<T>,
}

impl<T> Node<T> {
    fn alloc(value: T, prev: Link<T>, next: Link<T>) -> NonNull<Node<T>> {
        NonNull::from(Box::leak(Box::new(Node { value, prev, next })))
    }
}

/// Doubly linked list with O(1) operations at both ends
///
/// # Examples
///
/// ```rust
/// use rawcoll::DList;
///
/// let mut list = DList::from([3, 1, 4, 1, 5, 9]);
/// list.sort();
/// assert_eq!(list, DList::from([1, 1, 3, 4, 5, 9]));
///
/// list.reverse();
/// assert_eq!(*list.front().unwrap(), 9);
/// assert!(list.verify_links());
/// ```
pub struct DList<T> {
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

impl<T> DList<T> {
    /// Create an empty list
    #[inline]
    pub fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Prepend an element in O(1)
    pub fn push_front(&mut self, value: T) {
        let node = Node::alloc(value, None, self.head);
        match self.head {
            Some(head) => unsafe { (*head.as_ptr()).prev = Some(node) },
            None => self.tail = Some(node),
        }
        self.head = Some(node);
        self.len += 1;
    }

    /// Append an element in O(1)
    pub fn push_back(&mut self, value: T) {
        let node = Node::alloc(value, self.tail, None);
        match self.tail {
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.len += 1;
    }

    /// Remove and return the first element
    pub fn pop_front(&mut self) -> Result<T> {
        let head = self
            .head
            .ok_or_else(|| CollectionError::underflow(CONTAINER, "pop_front"))?;

        let node = unsafe { Box::from_raw(head.as_ptr()) };
        self.head = node.next;
        match self.head {
            Some(next) => unsafe { (*next.as_ptr()).prev = None },
            None => self.tail = None,
        }
        self.len -= 1;
        Ok(node.value)
    }

    /// Remove and return the last element
    pub fn pop_back(&mut self) -> Result<T> {
        let tail = self
            .tail
            .ok_or_else(|| CollectionError::underflow(CONTAINER, "pop_back"))?;

        let node = unsafe { Box::from_raw(tail.as_ptr()) };
        self.tail = node.prev;
        match self.tail {
            Some(prev) => unsafe { (*prev.as_ptr()).next = None },
            None => self.head = None,
        }
        self.len -= 1;
        Ok(node.value)
    }

    /// Reference to the first element
    pub fn front(&self) -> Result<&T> {
        match self.head {
            Some(head) => Ok(unsafe { &(*head.as_ptr()).value }),
            None => Err(CollectionError::underflow(CONTAINER, "front")),
        }
    }

    /// Mutable reference to the first element
    pub fn front_mut(&mut self) -> Result<&mut T> {
        match self.head {
            Some(head) => Ok(unsafe { &mut (*head.as_ptr()).value }),
            None => Err(CollectionError::underflow(CONTAINER, "front_mut")),
        }
    }

    /// Reference to the last element
    pub fn back(&self) -> Result<&T> {
        match self.tail {
            Some(tail) => Ok(unsafe { &(*tail.as_ptr()).value }),
            None => Err(CollectionError::underflow(CONTAINER, "back")),
        }
    }

    /// Mutable reference to the last element
    pub fn back_mut(&mut self) -> Result<&mut T> {
        match self.tail {
            Some(tail) => Ok(unsafe { &mut (*tail.as_ptr()).value }),
            None => Err(CollectionError::underflow(CONTAINER, "back_mut")),
        }
    }

    /// Reference to the element at `index`, walking from the head
    pub fn at(&self, index: usize) -> Result<&T> {
        check_index(index, self.len)?;
        Ok(unsafe { &(*self.node_at(index).as_ptr()).value })
    }

    /// Mutable reference to the element at `index`, walking from the head
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        check_index(index, self.len)?;
        Ok(unsafe { &mut (*self.node_at(index).as_ptr()).value })
    }

    /// Insert `value` so that it ends up at `index`
    ///
    /// `0` and `len()` are handled in O(1); interior positions walk to the
    /// current occupant and link the new node in front of it. Nothing is
    /// allocated when the index is rejected.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        check_insert_index(index, self.len)?;

        if index == 0 {
            self.push_front(value);
            return Ok(());
        }
        if index == self.len {
            self.push_back(value);
            return Ok(());
        }

        let next = self.node_at(index);
        unsafe {
            let prev = (*next.as_ptr()).prev;
            let node = Node::alloc(value, prev, Some(next));
            (*next.as_ptr()).prev = Some(node);
            if let Some(prev) = prev {
                (*prev.as_ptr()).next = Some(node);
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Remove and return the element at `index`
    pub fn erase(&mut self, index: usize) -> Result<T> {
        check_index(index, self.len)?;

        if index == 0 {
            return self.pop_front();
        }
        if index == self.len - 1 {
            return self.pop_back();
        }

        let node = unsafe { Box::from_raw(self.node_at(index).as_ptr()) };
        unsafe {
            if let Some(prev) = node.prev {
                (*prev.as_ptr()).next = node.next;
            }
            if let Some(next) = node.next {
                (*next.as_ptr()).prev = node.prev;
            }
        }
        self.len -= 1;
        Ok(node.value)
    }

    /// Remove every element, freeing each node exactly once
    pub fn clear(&mut self) {
        while self.pop_front().is_ok() {}
    }

    /// Reverse the list in place by swapping every node's links
    pub fn reverse(&mut self) {
        let mut cursor = self.head;
        while let Some(node) = cursor {
            unsafe {
                let node = &mut *node.as_ptr();
                mem::swap(&mut node.prev, &mut node.next);
                // the old successor now sits in `prev`
                cursor = node.prev;
            }
        }
        mem::swap(&mut self.head, &mut self.tail);
    }

    /// Check whether any element equals `value`
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|item| item == value)
    }

    /// Sort in ascending order with a stable merge sort over the node chain
    pub fn sort(&mut self)
    where
        T: PartialOrd,
    {
        self.sort_with(|a, b| a < b)
    }

    /// Sort with a "goes before" predicate using a stable merge sort
    ///
    /// Nodes are relinked, never moved or reallocated. Elements for which
    /// neither goes before the other keep their relative order.
    ///
    /// If the predicate panics, the list keeps every element in its original
    /// order with consistent links.
    pub fn sort_with<F>(&mut self, mut goes_before: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let (Some(head), Some(tail)) = (self.head, self.tail) else {
            return;
        };
        if self.len < 2 {
            return;
        }

        let len = self.len;
        let mut guard = SortGuard {
            list: self,
            tail,
            len,
            armed: true,
        };
        let sorted = unsafe { merge_sort(Some(head), &mut goes_before) };
        guard.armed = false;
        unsafe { guard.list.relink(sorted, len) };
    }

    /// Check the structural invariants of the chain
    ///
    /// Returns `true` when the forward walk from `head` and the backward walk
    /// from `tail` both visit exactly `len()` nodes, every `prev`/`next` pair
    /// agrees, and the ends are terminated.
    pub fn verify_links(&self) -> bool {
        if self.head.is_none() || self.tail.is_none() || self.len == 0 {
            return self.head.is_none() && self.tail.is_none() && self.len == 0;
        }

        unsafe {
            let mut count = 0;
            let mut prev: Link<T> = None;
            let mut cursor = self.head;
            while let Some(node) = cursor {
                if (*node.as_ptr()).prev != prev {
                    return false;
                }
                count += 1;
                if count > self.len {
                    return false;
                }
                prev = cursor;
                cursor = (*node.as_ptr()).next;
            }
            if count != self.len || prev != self.tail {
                return false;
            }

            count = 0;
            let mut next: Link<T> = None;
            cursor = self.tail;
            while let Some(node) = cursor {
                if (*node.as_ptr()).next != next {
                    return false;
                }
                count += 1;
                if count > self.len {
                    return false;
                }
                next = cursor;
                cursor = (*node.as_ptr()).prev;
            }
            count == self.len && next == self.head
        }
    }

    /// Iterate over references from front to back
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            head: self.head,
            tail: self.tail,
            len: self.len,
            _marker: PhantomData,
        }
    }

    /// Iterate over mutable references from front to back
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            head: self.head,
            tail: self.tail,
            len: self.len,
            _marker: PhantomData,
        }
    }

    /// Cursor positioned on the first node, or on the ghost position if empty
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor {
            current: self.head,
            index: 0,
            list: self,
        }
    }

    /// Cursor positioned on the last node, or on the ghost position if empty
    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor {
            current: self.tail,
            index: self.len.saturating_sub(1),
            list: self,
        }
    }

    /// Walk from the head to the node at `index`; `index` must be `< len`
    fn node_at(&self, index: usize) -> NonNull<Node<T>> {
        debug_assert!(index < self.len);
        let mut node = match self.head {
            Some(head) => head,
            None => unreachable!("node_at called on an empty list"),
        };
        for _ in 0..index {
            node = match unsafe { (*node.as_ptr()).next } {
                Some(next) => next,
                None => unreachable!("chain shorter than len"),
            };
        }
        node
    }

    /// Adopt a chain linked through `next` only, rebuilding `prev` and `tail`
    unsafe fn relink(&mut self, head: Link<T>, len: usize) {
        let mut prev: Link<T> = None;
        let mut cursor = head;
        while let Some(node) = cursor {
            unsafe {
                (*node.as_ptr()).prev = prev;
                cursor = (*node.as_ptr()).next;
            }
            prev = Some(node);
        }
        self.head = head;
        self.tail = prev;
        self.len = len;
    }
}

/// Restores the pre-sort order if the sort unwinds
///
/// The sort only rewrites `next` links, so walking `prev` from the old tail
/// still reaches every node exactly once.
struct SortGuard<'a, T> {
    list: &'a mut DList<T>,
    tail: NonNull<Node<T>>,
    len: usize,
    armed: bool,
}

impl<T> Drop for SortGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut next: Link<T> = None;
        let mut cursor = Some(self.tail);
        while let Some(node) = cursor {
            unsafe {
                (*node.as_ptr()).next = next;
                cursor = (*node.as_ptr()).prev;
            }
            next = Some(node);
        }
        unsafe { self.list.relink(next, self.len) };
    }
}

/// Sort a `next`-linked chain, returning its new head
///
/// `prev` links are left untouched, so inside the returned chain they are
/// stale.
unsafe fn merge_sort<T, F>(head: Link<T>, goes_before: &mut F) -> Link<T>
where
    F: FnMut(&T, &T) -> bool,
{
    let first = match head {
        Some(node) if unsafe { (*node.as_ptr()).next.is_some() } => node,
        _ => return head,
    };

    unsafe {
        let second = split(first);
        let left = merge_sort(Some(first), goes_before);
        let right = merge_sort(second, goes_before);
        merge(left, right, goes_before)
    }
}

/// Cut a chain of two or more nodes in half and return the second half
///
/// A fast cursor advances two links per link of the slow cursor; the slow
/// cursor stops on the last node of the first half.
unsafe fn split<T>(head: NonNull<Node<T>>) -> Link<T> {
    unsafe {
        let mut slow = head;
        let mut fast = (*head.as_ptr()).next;
        loop {
            let Some(one) = fast else { break };
            let Some(two) = (*one.as_ptr()).next else { break };
            match (*slow.as_ptr()).next {
                Some(next) => slow = next,
                None => break,
            }
            fast = (*two.as_ptr()).next;
        }
        (*slow.as_ptr()).next.take()
    }
}

/// Merge two sorted chains, taking from `left` on ties
unsafe fn merge<T, F>(mut left: Link<T>, mut right: Link<T>, goes_before: &mut F) -> Link<T>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut head: Link<T> = None;
    let mut tail: Link<T> = None;

    unsafe {
        while let (Some(l), Some(r)) = (left, right) {
            let picked = if goes_before(&(*r.as_ptr()).value, &(*l.as_ptr()).value) {
                right = (*r.as_ptr()).next;
                r
            } else {
                left = (*l.as_ptr()).next;
                l
            };
            match tail {
                Some(t) => (*t.as_ptr()).next = Some(picked),
                None => head = Some(picked),
            }
            tail = Some(picked);
        }

        let rest = left.or(right);
        match tail {
            Some(t) => (*t.as_ptr()).next = rest,
            None => head = rest,
        }
    }
    head
}

impl<T> Default for DList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone> Clone for DList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for DList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for DList<T> {}

impl<T: Hash> Hash for DList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for DList<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T> FromIterator<T> for DList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for DList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a DList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for DList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

/// Borrowing iterator over a [`DList`]
pub struct Iter<'a, T> {
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _marker: PhantomData<&'a Node<T>>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.head.map(|node| unsafe {
            let node = &*node.as_ptr();
            self.len -= 1;
            self.head = node.next;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.tail.map(|node| unsafe {
            let node = &*node.as_ptr();
            self.len -= 1;
            self.tail = node.prev;
            &node.value
        })
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable borrowing iterator over a [`DList`]
pub struct IterMut<'a, T> {
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _marker: PhantomData<&'a mut Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.head.map(|node| unsafe {
            let node = &mut *node.as_ptr();
            self.len -= 1;
            self.head = node.next;
            &mut node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.tail.map(|node| unsafe {
            let node = &mut *node.as_ptr();
            self.len -= 1;
            self.tail = node.prev;
            &mut node.value
        })
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator over a [`DList`]
pub struct IntoIter<T> {
    list: DList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

/// Read-only position inside a [`DList`]
///
/// A cursor either rests on a node or on the "ghost" position, which stands
/// for both one-past-the-end and one-before-the-start. Stepping off either
/// end lands on the ghost; stepping from the ghost wraps to the opposite end.
pub struct Cursor<'a, T> {
    current: Link<T>,
    index: usize,
    list: &'a DList<T>,
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Cursor<'a, T> {
    /// Element under the cursor, `None` on the ghost position
    pub fn current(&self) -> Option<&'a T> {
        self.current.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Index of the element under the cursor, `None` on the ghost position
    pub fn index(&self) -> Option<usize> {
        self.current.map(|_| self.index)
    }

    /// Step towards the back
    pub fn move_next(&mut self) {
        match self.current {
            Some(node) => {
                self.current = unsafe { (*node.as_ptr()).next };
                self.index += 1;
            }
            None => {
                self.current = self.list.head;
                self.index = 0;
            }
        }
    }

    /// Step towards the front
    pub fn move_prev(&mut self) {
        match self.current {
            Some(node) => {
                self.current = unsafe { (*node.as_ptr()).prev };
                self.index = self.index.checked_sub(1).unwrap_or(self.list.len);
            }
            None => {
                self.current = self.list.tail;
                self.index = self.list.len.saturating_sub(1);
            }
        }
    }
}

// Safety: the list uniquely owns its nodes, like std's LinkedList
unsafe impl<T: Send> Send for DList<T> {}

unsafe impl<T: Sync> Sync for DList<T> {}

unsafe impl<T: Sync> Send for Iter<'_, T> {}

unsafe impl<T: Sync> Sync for Iter<'_, T> {}

unsafe impl<T: Send> Send for IterMut<'_, T> {}

unsafe impl<T: Sync> Sync for IterMut<'_, T> {}
