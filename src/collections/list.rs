//! Sequence stored under one key

use std::marker::PhantomData;

use super::keyspace::{Binding, Keyspace};
use crate::algebra::materialize;
use crate::client::Client;
use crate::codec::Element;
use crate::command::Command;
use crate::error::{Error, Result};

/// Handle to a list in the store
#[derive(Debug, Clone)]
pub struct List<T> {
    binding: Binding,
    _element: PhantomData<fn() -> T>,
}

impl<T> Keyspace for List<T> {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }
}

impl<T: Element> List<T> {
    pub fn open(client: &Client, key: impl Into<String>) -> Result<Self> {
        Ok(List {
            binding: Binding::new(client, key)?,
            _element: PhantomData,
        })
    }

    /// Bind to `key` and append `items`
    pub fn with_items(client: &Client, key: impl Into<String>, items: impl IntoIterator<Item = T>) -> Result<Self> {
        let list = Self::open(client, key)?;
        list.extend(items)?;
        Ok(list)
    }

    fn own_key(&self) -> String {
        self.binding.key().to_string()
    }

    pub fn len(&self) -> Result<usize> {
        materialize::count(&self.binding.execute(Command::LLen { key: self.own_key() })?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Item at `index`; negative counts from the end
    pub fn get(&self, index: i64) -> Result<Option<T>> {
        let command = Command::LIndex {
            key: self.own_key(),
            index,
        };
        materialize::optional(&self.binding.execute(command)?)
    }

    /// Items `start..=stop`
    pub fn range(&self, start: i64, stop: i64) -> Result<Vec<T>> {
        let command = Command::LRange {
            key: self.own_key(),
            start,
            stop,
        };
        materialize::sequence(self.binding.execute(command)?)
    }

    pub fn items(&self) -> Result<Vec<T>> {
        self.range(0, -1)
    }

    /// Overwrite the item at `index`
    pub fn set(&self, index: i64, value: &T) -> Result<()> {
        let command = Command::LSet {
            key: self.own_key(),
            index,
            value: value.encode(),
        };
        self.binding.execute(command).map_err(|err| match err {
            Error::Store(message) if message.contains("out of range") || message.contains("no such key") => {
                Error::Value(format!("index {} out of range for '{}'", index, self.binding.key()))
            }
            other => other,
        })?;
        Ok(())
    }

    /// Append one item; returns the new length
    pub fn push(&self, value: &T) -> Result<usize> {
        self.extend([value.clone()])
    }

    /// Prepend one item; returns the new length
    pub fn push_front(&self, value: &T) -> Result<usize> {
        let command = Command::LPush {
            key: self.own_key(),
            values: vec![value.encode()],
        };
        materialize::count(&self.binding.execute(command)?)
    }

    /// Append every item with one command; returns the new length
    pub fn extend(&self, items: impl IntoIterator<Item = T>) -> Result<usize> {
        let values: Vec<String> = items.into_iter().map(|item| item.encode()).collect();
        if values.is_empty() {
            return self.len();
        }
        materialize::count(&self.binding.execute(Command::RPush { key: self.own_key(), values })?)
    }

    pub fn pop(&self) -> Result<Option<T>> {
        materialize::optional(&self.binding.execute(Command::RPop { key: self.own_key() })?)
    }

    pub fn pop_front(&self) -> Result<Option<T>> {
        materialize::optional(&self.binding.execute(Command::LPop { key: self.own_key() })?)
    }

    /// Remove occurrences of `value`: the first `count` from the head when
    /// positive, from the tail when negative, all of them when zero. Fails
    /// with [`Error::Value`] if nothing was removed.
    pub fn remove(&self, value: &T, count: i64) -> Result<usize> {
        let command = Command::LRem {
            key: self.own_key(),
            count,
            value: value.encode(),
        };
        let removed = materialize::count(&self.binding.execute(command)?)?;
        if removed == 0 {
            return Err(Error::Value(format!("{:?} is not in list '{}'", value, self.binding.key())));
        }
        Ok(removed)
    }

    pub fn contains(&self, value: &T) -> Result<bool> {
        Ok(self.count(value)? > 0)
    }

    /// Occurrences of `value`
    pub fn count(&self, value: &T) -> Result<usize> {
        Ok(self.items()?.iter().filter(|item| *item == value).count())
    }

    pub fn clear(&self) -> Result<()> {
        self.binding.execute(Command::Del { keys: vec![self.own_key()] })?;
        Ok(())
    }
}
