//! Error types for ferrous-collections
//!
//! Every public operation returns one [`Error`] per failure. Classification
//! and staging problems are raised before anything is sent to the store;
//! failures reported by the store are passed through as a single
//! operation-level error.

use std::io;

use crate::config::ConfigParseError;

/// Main error type for collection operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operand or value of the wrong kind (bad key, foreign namespace,
    /// stored string that does not decode to the declared element type)
    #[error("TypeError: {0}")]
    Type(String),

    /// Missing member or empty collection
    #[error("KeyError: {0}")]
    Key(String),

    /// Argument outside the semantics of the operation
    #[error("ValueError: {0}")]
    Value(String),

    /// Error reply from the store
    #[error("{0}")]
    Store(String),

    /// Malformed or unexpected reply
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Network/IO errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connection could not be established or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store did not answer in time; the outcome is unknown
    #[error("Operation timed out; outcome unknown")]
    Timeout,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigParseError),
}

/// Type alias for Results throughout ferrous-collections
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a store error from the raw bytes of an error reply
    pub fn from_reply(bytes: &[u8]) -> Self {
        Error::Store(String::from_utf8_lossy(bytes).into_owned())
    }

    /// True when the outcome of the failed operation is unknown to the
    /// caller, i.e. the store may or may not have applied it
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Error::Timeout | Error::Io(_) | Error::Connection(_))
    }
}
