//! Error handling for the rawcoll containers
//!
//! Every fallible container operation reports a [`CollectionError`]. The error
//! carries a kind (see [`ErrorKind`]) and a descriptive message, and is returned
//! synchronously to the caller. No operation retries internally, and a failed
//! operation never leaves a container partially mutated.

use thiserror::Error;

/// Main error type for the container library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Removal or end access requested on an empty container
    #[error("Underflow: {operation} on empty {container}")]
    Underflow {
        /// Name of the container type
        container: &'static str,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Index outside the valid bound for the operation
    #[error("Out of range: index {index}, size {size}")]
    OutOfRange {
        /// The invalid index
        index: usize,
        /// The container size at the time of the call
        size: usize,
    },

    /// Key absent from a map
    #[error("Key not found: {key}")]
    KeyNotFound {
        /// Debug rendering of the missing key
        key: String,
    },

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Argument rejected before any mutation took place
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

/// Error kinds, for callers that branch on the failure class only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CollectionError::Underflow`]
    Underflow,
    /// See [`CollectionError::OutOfRange`]
    OutOfRange,
    /// See [`CollectionError::KeyNotFound`]
    KeyNotFound,
    /// See [`CollectionError::OutOfMemory`]
    OutOfMemory,
    /// See [`CollectionError::InvalidArgument`]
    InvalidArgument,
    /// See [`CollectionError::Configuration`]
    Configuration,
}

impl CollectionError {
    /// Create an underflow error
    pub fn underflow(container: &'static str, operation: &'static str) -> Self {
        Self::Underflow {
            container,
            operation,
        }
    }

    /// Create an out of range error
    pub fn out_of_range(index: usize, size: usize) -> Self {
        Self::OutOfRange { index, size }
    }

    /// Create a key not found error from any debuggable key
    pub fn key_not_found<K: std::fmt::Debug + ?Sized>(key: &K) -> Self {
        Self::KeyNotFound {
            key: format!("{:?}", key),
        }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Underflow { .. } => ErrorKind::Underflow,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Only allocation failures may succeed when retried; every other kind
    /// reflects a caller mistake that retrying cannot fix.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Underflow { .. } => "underflow",
            Self::OutOfRange { .. } => "bounds",
            Self::KeyNotFound { .. } => "lookup",
            Self::OutOfMemory { .. } => "memory",
            Self::InvalidArgument { .. } => "argument",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Assert that an index addresses a live element
#[inline]
pub fn check_index(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(CollectionError::out_of_range(index, size))
    } else {
        Ok(())
    }
}

/// Assert that an index is a valid insertion point (`index == size` appends)
#[inline]
pub fn check_insert_index(index: usize, size: usize) -> Result<()> {
    if index > size {
        Err(CollectionError::out_of_range(index, size))
    } else {
        Ok(())
    }
}
