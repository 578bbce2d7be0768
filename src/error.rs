//! Error handling for the growmap library
//!
//! Every container operation that can fail has a fallible form returning
//! [`Result`]. The non-fallible forms hand the same errors to the container's
//! [`IllegalOpPolicy`](crate::policy::IllegalOpPolicy) instead.

use thiserror::Error;

/// Main error type for the growmap library
#[derive(Error, Debug)]
pub enum ContainerError {
    /// Removal from a container holding no elements
    #[error("Empty container: cannot {operation} from an empty buffer")]
    EmptyContainer {
        /// The operation that was attempted
        operation: &'static str,
    },

    /// Positional access past the last element
    #[error("Index out of range: index {index}, size {size}")]
    IndexOutOfRange {
        /// The invalid index
        index: usize,
        /// The number of elements at the time of the call
        size: usize,
    },

    /// Operation on a container that is not initialized
    #[error("Invalid container: {reason}")]
    InvalidContainer {
        /// Why the container cannot be used
        reason: String,
    },

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContainerError {
    /// Create an empty container error
    pub fn empty_container(operation: &'static str) -> Self {
        Self::EmptyContainer { operation }
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, size: usize) -> Self {
        Self::IndexOutOfRange { index, size }
    }

    /// Create an invalid container error
    pub fn invalid_container<S: Into<String>>(reason: S) -> Self {
        Self::InvalidContainer {
            reason: reason.into(),
        }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is one of the illegal-operation conditions that
    /// containers route through their policy
    pub fn is_illegal_operation(&self) -> bool {
        matches!(
            self,
            Self::EmptyContainer { .. }
                | Self::IndexOutOfRange { .. }
                | Self::InvalidContainer { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyContainer { .. } => "empty",
            Self::IndexOutOfRange { .. } => "bounds",
            Self::InvalidContainer { .. } => "invalid",
            Self::OutOfMemory { .. } => "memory",
            Self::Configuration { .. } => "config",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Assert that an index addresses an existing element
#[inline]
pub fn check_index(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(ContainerError::index_out_of_range(index, size))
    } else {
        Ok(())
    }
}
