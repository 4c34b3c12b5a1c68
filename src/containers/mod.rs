//! Container types built on manual allocation
//!
//! ## Containers
//!
//! - **`DynArray<T>`** - Contiguous growable array with doubling growth and a stable merge sort
//! - **`DList<T>`** - Doubly linked list with O(1) operations at both ends and a node-relinking merge sort
//! - **`BucketMap<K,V>`** - Separate-chaining hash map that rehashes above a load-factor threshold
//!
//! Fallible operations return [`crate::Result`]; popping or peeking an empty
//! container yields an underflow error, positional access past the end an
//! out-of-range error, and erasing an absent key a key-not-found error.

mod bucket_map;
mod dyn_array;
mod linked_list;

pub use bucket_map::{BucketMap, DefaultHashBuilder};
pub use dyn_array::{DynArray, IntoIter as DynArrayIntoIter};
pub use linked_list::{
    Cursor as DListCursor, DList, IntoIter as DListIntoIter, Iter as DListIter,
    IterMut as DListIterMut,
};
