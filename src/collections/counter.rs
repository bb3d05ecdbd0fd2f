//! Plain string value that can be incremented in place

use super::keyspace::{Binding, Keyspace};
use crate::client::Client;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::{extract_integer, extract_optional_string, extract_string};

/// Handle to a string key
#[derive(Debug, Clone)]
pub struct Counter {
    binding: Binding,
}

impl Keyspace for Counter {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }
}

impl Counter {
    pub fn open(client: &Client, key: impl Into<String>) -> Result<Self> {
        Ok(Counter {
            binding: Binding::new(client, key)?,
        })
    }

    /// Bind to `key` and store `value`
    pub fn with_value(client: &Client, key: impl Into<String>, value: impl ToString) -> Result<Self> {
        let counter = Self::open(client, key)?;
        counter.set(value)?;
        Ok(counter)
    }

    fn own_key(&self) -> String {
        self.binding.key().to_string()
    }

    /// Current value, `None` when the key is absent
    pub fn value(&self) -> Result<Option<String>> {
        extract_optional_string(&self.binding.execute(Command::Get { key: self.own_key() })?)
    }

    pub fn set(&self, value: impl ToString) -> Result<()> {
        let command = Command::Set {
            key: self.own_key(),
            value: value.to_string(),
        };
        self.binding.execute(command)?;
        Ok(())
    }

    /// Append `suffix`; returns the new length
    pub fn append(&self, suffix: &str) -> Result<usize> {
        let command = Command::Append {
            key: self.own_key(),
            value: suffix.to_string(),
        };
        let len = extract_integer(&self.binding.execute(command)?)?;
        usize::try_from(len).map_err(|_| Error::Protocol(format!("negative length {}", len)))
    }

    /// Characters `start..=end`; negative offsets count from the end
    pub fn get_range(&self, start: i64, end: i64) -> Result<String> {
        let command = Command::GetRange {
            key: self.own_key(),
            start,
            end,
        };
        extract_string(&self.binding.execute(command)?)
    }

    /// Add `by`; an absent key counts as 0. Returns the new value.
    pub fn incr(&self, by: i64) -> Result<i64> {
        let command = Command::IncrBy {
            key: self.own_key(),
            delta: by,
        };
        self.arithmetic(command, "increment")
    }

    /// Subtract `by`. Returns the new value.
    pub fn decr(&self, by: i64) -> Result<i64> {
        let command = Command::DecrBy {
            key: self.own_key(),
            delta: by,
        };
        self.arithmetic(command, "decrement")
    }

    fn arithmetic(&self, command: Command, verb: &str) -> Result<i64> {
        match self.binding.execute(command) {
            Ok(reply) => extract_integer(&reply),
            Err(Error::Store(message)) if message.contains("not an integer") => Err(Error::Type(format!(
                "cannot {} '{}': value is not an integer",
                verb,
                self.binding.key()
            ))),
            Err(err) => Err(err),
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.binding.execute(Command::Del { keys: vec![self.own_key()] })?;
        Ok(())
    }
}
