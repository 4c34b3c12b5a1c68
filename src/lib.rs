//! # rawcoll: Generic Containers on Manual Allocation
//!
//! This crate provides three generic containers that manage their own memory
//! instead of delegating to the standard collections:
//!
//! - **`DynArray<T>`**: contiguous storage that doubles its capacity on growth,
//!   with O(1) indexed access and a stable merge sort
//! - **`DList<T>`**: a doubly linked list with O(1) push/pop at both ends and a
//!   merge sort that relinks nodes without moving values
//! - **`BucketMap<K,V>`**: a separate-chaining hash map that rehashes before an
//!   insert would push the load factor above 0.75
//!
//! All fallible operations return [`Result`] with a [`CollectionError`]
//! describing underflow, out-of-range access, missing keys, allocation
//! failure or invalid arguments.
//!
//! ## Quick Start
//!
//! ```rust
//! use rawcoll::{BucketMap, DList, DynArray};
//!
//! let mut array = DynArray::new();
//! for value in [5, 3, 8, 1] {
//!     array.push_back(value).unwrap();
//! }
//! array.sort().unwrap();
//! assert_eq!(array.as_slice(), &[1, 3, 5, 8]);
//!
//! let mut list: DList<i32> = [3, 1, 2].into();
//! list.push_front(0);
//! list.sort();
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
//!
//! let mut map = BucketMap::new();
//! map.insert_or_assign("key", "value").unwrap();
//! assert!(map.contains("key"));
//! assert!(map.erase("missing").is_err());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod containers;
pub mod error;

mod raw;

// Re-export core types
pub use config::{BucketMapConfig, Config};
pub use containers::{BucketMap, DList, DynArray};
pub use error::{CollectionError, ErrorKind, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize rawcoll
///
/// Only emits a debug record; the library installs no logger of its own.
pub fn init() {
    log::debug!("Initializing rawcoll v{}", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        init();
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_version_info() {
        assert!(VERSION.contains('.'));
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2);
    }

    #[test]
    fn test_reexports_work_together() {
        let mut map: BucketMap<u32, DList<u32>> = BucketMap::new();
        for i in 0..6 {
            map.get_or_insert_default(i % 2).unwrap().push_back(i);
        }
        let evens: DynArray<u32> = map.get(&0).unwrap().iter().copied().collect();
        assert_eq!(evens.as_slice(), &[0, 2, 4]);

        let err = DynArray::<u8>::new().pop_back().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Underflow);
    }
}
