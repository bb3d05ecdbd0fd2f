//! In-process store
//!
//! Data structures and command semantics backing [`crate::store::MemoryStore`].
//! Commands run directly on the [`crate::command::Command`] enum; replies are
//! the RESP frames a remote store would send.

pub mod commands;
pub mod engine;
pub mod sorted_set;
pub mod value;

pub use engine::{Database, StorageEngine, DEFAULT_DATABASES};
pub use sorted_set::SortedSet;
pub use value::{StoredValue, Value, ValueType};

/// Database index type
pub type DatabaseIndex = usize;

/// Key type for storage
pub type Key = String;

/// Command failures, rendered as error replies
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// Operation against wrong type
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// Value is not an integer or out of range
    #[error("ERR value is not an integer or out of range")]
    NotInteger,

    /// Integer overflow
    #[error("ERR increment or decrement would overflow")]
    IntegerOverflow,

    /// Score arithmetic produced NaN
    #[error("ERR resulting score is not a number (NaN)")]
    NotANumber,

    /// Index out of range
    #[error("ERR index out of range")]
    IndexOutOfRange,

    /// Key not found
    #[error("ERR no such key")]
    NoSuchKey,

    /// Database index out of range
    #[error("ERR DB index is out of range")]
    InvalidDatabase,

    /// MOVE into the current database
    #[error("ERR source and destination objects are the same")]
    SameObject,

    /// Wrong number of arguments for command
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongNumberOfArgs(String),

    /// Syntax error in command
    #[error("ERR syntax error")]
    SyntaxError,

    /// Generic command error with message
    #[error("ERR {0}")]
    Generic(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CommandError::WrongType.to_string(),
            "WRONGTYPE Operation against a key holding the wrong kind of value"
        );
        assert_eq!(
            CommandError::WrongNumberOfArgs("sadd".into()).to_string(),
            "ERR wrong number of arguments for 'sadd' command"
        );
    }
}
