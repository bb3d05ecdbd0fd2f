//! Mapping from string fields to typed values, stored as a hash

use std::collections::HashMap;
use std::marker::PhantomData;

use super::keyspace::{Binding, Keyspace};
use crate::algebra::materialize;
use crate::client::Client;
use crate::codec::Element;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::{extract_array, extract_string};

/// Handle to a hash in the store
#[derive(Debug, Clone)]
pub struct Dict<T> {
    binding: Binding,
    _element: PhantomData<fn() -> T>,
}

impl<T> Keyspace for Dict<T> {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }
}

impl<T: Element> Dict<T> {
    pub fn open(client: &Client, key: impl Into<String>) -> Result<Self> {
        Ok(Dict {
            binding: Binding::new(client, key)?,
            _element: PhantomData,
        })
    }

    /// Bind to `key` and write `entries` with one command
    pub fn with_entries<F: Into<String>>(
        client: &Client,
        key: impl Into<String>,
        entries: impl IntoIterator<Item = (F, T)>,
    ) -> Result<Self> {
        let dict = Self::open(client, key)?;
        let pairs: Vec<(String, String)> = entries
            .into_iter()
            .map(|(field, value)| (field.into(), value.encode()))
            .collect();
        if !pairs.is_empty() {
            dict.binding.execute(Command::HSet { key: dict.own_key(), pairs })?;
        }
        Ok(dict)
    }

    fn own_key(&self) -> String {
        self.binding.key().to_string()
    }

    pub fn len(&self) -> Result<usize> {
        materialize::count(&self.binding.execute(Command::HLen { key: self.own_key() })?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, field: &str) -> Result<Option<T>> {
        let command = Command::HGet {
            key: self.own_key(),
            field: field.to_string(),
        };
        materialize::optional(&self.binding.execute(command)?)
    }

    /// Set `field`; true if it did not exist
    pub fn insert(&self, field: &str, value: &T) -> Result<bool> {
        let command = Command::HSet {
            key: self.own_key(),
            pairs: vec![(field.to_string(), value.encode())],
        };
        materialize::flag(&self.binding.execute(command)?)
    }

    /// Delete `field`, failing with [`Error::Key`] if it does not exist
    pub fn remove(&self, field: &str) -> Result<()> {
        let command = Command::HDel {
            key: self.own_key(),
            fields: vec![field.to_string()],
        };
        if !materialize::flag(&self.binding.execute(command)?)? {
            return Err(Error::Key(format!("field '{}' not in '{}'", field, self.binding.key())));
        }
        Ok(())
    }

    pub fn contains_key(&self, field: &str) -> Result<bool> {
        let command = Command::HExists {
            key: self.own_key(),
            field: field.to_string(),
        };
        materialize::flag(&self.binding.execute(command)?)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let reply = self.binding.execute(Command::HKeys { key: self.own_key() })?;
        extract_array(reply)?.iter().map(extract_string).collect()
    }

    pub fn values(&self) -> Result<Vec<T>> {
        materialize::sequence(self.binding.execute(Command::HVals { key: self.own_key() })?)
    }

    pub fn entries(&self) -> Result<HashMap<String, T>> {
        let items = extract_array(self.binding.execute(Command::HGetAll { key: self.own_key() })?)?;
        items
            .chunks(2)
            .map(|pair| match pair {
                [field, value] => Ok((extract_string(field)?, materialize::element(value)?)),
                _ => Err(Error::Protocol("HGETALL reply has an odd number of items".to_string())),
            })
            .collect()
    }

    pub fn clear(&self) -> Result<()> {
        self.binding.execute(Command::Del { keys: vec![self.own_key()] })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let client = Client::memory();
        let dict = Dict::with_entries(&client, "h", [("a", 1i64), ("b", 2)]).unwrap();

        assert_eq!(dict.len().unwrap(), 2);
        assert_eq!(dict.get("a").unwrap(), Some(1));
        assert_eq!(dict.get("z").unwrap(), None);
        assert!(dict.insert("c", &3).unwrap());
        assert!(!dict.insert("c", &4).unwrap());
        assert_eq!(dict.get("c").unwrap(), Some(4));

        dict.remove("a").unwrap();
        assert!(matches!(dict.remove("a"), Err(Error::Key(_))));
        assert!(!dict.contains_key("a").unwrap());
    }

    #[test]
    fn test_listing() {
        let client = Client::memory();
        let dict = Dict::with_entries(&client, "h", [("x", true), ("y", false)]).unwrap();

        let mut keys = dict.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);

        let mut values = dict.values().unwrap();
        values.sort();
        assert_eq!(values, vec![false, true]);

        let entries = dict.entries().unwrap();
        assert_eq!(entries.get("x"), Some(&true));
        assert_eq!(entries.len(), 2);

        dict.clear().unwrap();
        assert!(dict.is_empty().unwrap());
    }

    #[test]
    fn test_wrong_element_type() {
        let client = Client::memory();
        Dict::with_entries(&client, "h", [("a", "text".to_string())]).unwrap();
        let typed: Dict<i64> = client.dict("h").unwrap();
        assert!(matches!(typed.get("a"), Err(Error::Type(_))));
    }
}
