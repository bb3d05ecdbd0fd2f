//! Entry point: a store plus the namespace reserved for temporary keys
//!
//! A [`Client`] is cheap to clone; every handle it creates holds its own
//! clone and issues commands through the shared store.

use std::fmt;
use std::sync::Arc;

use crate::codec::Element;
use crate::collections::{Counter, Dict, List, Set, ZSet};
use crate::config::{Config, DEFAULT_TEMP_KEY_PREFIX};
use crate::error::{Error, Result};
use crate::command::Command;
use crate::protocol::extract_array;
use crate::store::{MemoryStore, Store, TcpStore};

/// Shared access to one store namespace
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn Store>,
    temp_prefix: Arc<str>,
}

impl Client {
    /// Wrap a store, using the default temporary key prefix
    pub fn new(store: impl Store + 'static) -> Self {
        Client {
            store: Arc::new(store),
            temp_prefix: Arc::from(DEFAULT_TEMP_KEY_PREFIX),
        }
    }

    /// Wrap a shared store with a custom temporary key prefix
    pub fn with_prefix(store: Arc<dyn Store>, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(Error::Value("temporary key prefix must not be empty".to_string()));
        }
        Ok(Client {
            store,
            temp_prefix: Arc::from(prefix),
        })
    }

    /// Connect to a remote store
    pub fn connect(config: Config) -> Result<Self> {
        let prefix = config.temp_key_prefix.clone();
        Self::with_prefix(Arc::new(TcpStore::connect(config)?), prefix)
    }

    /// Client over a fresh in-process store
    pub fn memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }

    /// Namespace of the underlying store
    pub fn namespace(&self) -> String {
        self.store.namespace()
    }

    /// Run one command; an error reply becomes `Err`
    pub fn execute(&self, command: Command) -> Result<crate::protocol::RespFrame> {
        self.store.execute(command)
    }

    /// Refuse keys a handle must not be bound to
    pub(crate) fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::Type("key must be a non-empty string".to_string()));
        }
        if key.starts_with(&*self.temp_prefix) {
            return Err(Error::Type(format!(
                "key '{}' is inside the reserved namespace '{}'",
                key, self.temp_prefix
            )));
        }
        Ok(())
    }

    /// Number of temporary keys currently present in the store. Zero
    /// whenever no algebra call is in flight.
    pub fn temp_key_count(&self) -> Result<usize> {
        let pattern = format!("{}*", escape_glob(&self.temp_prefix));
        let reply = self.store.execute(Command::Keys { pattern })?;
        Ok(extract_array(reply)?.len())
    }

    pub fn set<T: Element>(&self, key: impl Into<String>) -> Result<Set<T>> {
        Set::open(self, key)
    }

    pub fn zset<T: Element>(&self, key: impl Into<String>) -> Result<ZSet<T>> {
        ZSet::open(self, key)
    }

    pub fn list<T: Element>(&self, key: impl Into<String>) -> Result<List<T>> {
        List::open(self, key)
    }

    pub fn dict<T: Element>(&self, key: impl Into<String>) -> Result<Dict<T>> {
        Dict::open(self, key)
    }

    pub fn counter(&self, key: impl Into<String>) -> Result<Counter> {
        Counter::open(self, key)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("namespace", &self.store.namespace())
            .field("temp_prefix", &self.temp_prefix)
            .finish()
    }
}

/// Escape glob metacharacters so `raw` matches literally
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
