//! Errors reported by the tables and their wrappers.

use alloc::string::String;

use thiserror::Error;

/// Errors reported by fallible table operations.
///
/// Every variant is raised before the table is mutated: a call that returns
/// an error leaves the collection exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument was rejected at the call that introduced it.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// A mutation was attempted through a handle that forbids it.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Name of the refused operation
        operation: &'static str,
    },

    /// There is no element to act upon.
    #[error("no such element")]
    NoSuchElement,

    /// The call is not valid in the current state of a cursor.
    #[error("illegal state: {message}")]
    IllegalState {
        /// Description of the violated precondition
        message: &'static str,
    },

    /// Allocating the backing arrays for a rehash failed.
    #[error("allocation failed while resizing to {slots} slots")]
    ResourceExhausted {
        /// Number of slots the table tried to allocate
        slots: usize,
    },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
