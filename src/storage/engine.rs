//! In-process storage engine
//!
//! Multiple databases behind one lock. A batch of commands is executed
//! while holding the lock, so nothing else can observe it half applied.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::trace;

use super::commands;
use super::value::{StoredValue, Value};
use super::{DatabaseIndex, Key};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::RespFrame;

/// Number of databases, as in a default store configuration
pub const DEFAULT_DATABASES: usize = 16;

/// Main storage engine
#[derive(Debug)]
pub struct StorageEngine {
    databases: RwLock<Vec<Database>>,
    database_count: usize,
}

/// A single database instance
#[derive(Debug, Default)]
pub struct Database {
    data: HashMap<Key, StoredValue>,
}

impl StorageEngine {
    /// Create a new storage engine with default settings
    pub fn new() -> Arc<Self> {
        Self::with_databases(DEFAULT_DATABASES)
    }

    /// Create a storage engine with `count` databases
    pub fn with_databases(count: usize) -> Arc<Self> {
        let databases = (0..count).map(|_| Database::new()).collect();
        Arc::new(StorageEngine {
            databases: RwLock::new(databases),
            database_count: count,
        })
    }

    pub fn database_count(&self) -> usize {
        self.database_count
    }

    /// Execute one command against database `db`
    pub fn execute(&self, db: DatabaseIndex, command: &Command) -> Result<RespFrame> {
        let mut replies = self.execute_batch(db, std::slice::from_ref(command))?;
        replies
            .pop()
            .ok_or_else(|| Error::Protocol("empty reply".to_string()))
    }

    /// Execute commands in order under a single lock. Like EXEC, a failing
    /// command yields an error reply and the rest still run.
    pub fn execute_batch(&self, db: DatabaseIndex, commands: &[Command]) -> Result<Vec<RespFrame>> {
        let mut databases = self
            .databases
            .write()
            .map_err(|_| Error::Store("ERR storage lock poisoned".to_string()))?;

        let mut current = db;
        let replies = commands
            .iter()
            .map(|command| {
                trace!(target: "ferrous::storage", db = current, %command, "execute");
                commands::dispatch(&mut databases, &mut current, command)
            })
            .collect();

        Ok(replies)
    }

    /// Number of live keys in `db`
    pub fn key_count(&self, db: DatabaseIndex) -> Result<usize> {
        let mut databases = self
            .databases
            .write()
            .map_err(|_| Error::Store("ERR storage lock poisoned".to_string()))?;
        Ok(databases.get_mut(db).map(|db| db.keys().len()).unwrap_or(0))
    }
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop `key` if its expiration has passed
    fn purge_if_expired(&mut self, key: &str) {
        if self.data.get(key).map_or(false, StoredValue::is_expired) {
            self.data.remove(key);
        }
    }

    /// Live entry under `key`
    pub fn get(&mut self, key: &str) -> Option<&StoredValue> {
        self.purge_if_expired(key);
        self.data.get(key)
    }

    /// Live entry under `key`, mutable
    pub fn get_mut(&mut self, key: &str) -> Option<&mut StoredValue> {
        self.purge_if_expired(key);
        self.data.get_mut(key)
    }

    /// Live entry under `key`, created with `make` when absent
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> Value) -> &mut StoredValue {
        self.purge_if_expired(key);
        self.data
            .entry(key.to_string())
            .or_insert_with(|| StoredValue::new(make()))
    }

    pub fn contains(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store a persistent value, replacing whatever was there
    pub fn insert(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), StoredValue::new(value));
    }

    /// Store an entry with its metadata
    pub fn insert_stored(&mut self, key: &str, stored: StoredValue) {
        self.data.insert(key.to_string(), stored);
    }

    pub fn remove(&mut self, key: &str) -> Option<StoredValue> {
        self.purge_if_expired(key);
        self.data.remove(key)
    }

    /// Remove `key` when it holds a collection that became empty
    pub fn remove_if_empty(&mut self, key: &str) {
        if self
            .data
            .get(key)
            .map_or(false, |stored| stored.value.is_empty_collection())
        {
            self.data.remove(key);
        }
    }

    /// All live keys
    pub fn keys(&mut self) -> Vec<Key> {
        self.data.retain(|_, stored| !stored.is_expired());
        self.data.keys().cloned().collect()
    }
}
