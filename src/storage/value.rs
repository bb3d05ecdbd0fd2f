//! Value types for the in-process store
//!
//! Defines the data types a key can hold and the per-key expiration
//! metadata.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, SystemTime};

use super::sorted_set::SortedSet;

/// All value types a key can hold
#[derive(Debug, Clone)]
pub enum Value {
    /// String value
    String(String),

    /// List value (ordered collection)
    List(VecDeque<String>),

    /// Set value (unordered unique collection)
    Set(HashSet<String>),

    /// Hash value (field-value pairs)
    Hash(HashMap<String, String>),

    /// Sorted set value
    SortedSet(SortedSet),
}

/// Value type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    List,
    Set,
    Hash,
    SortedSet,
}

impl ValueType {
    /// Name reported by TYPE
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Set => "set",
            ValueType::Hash => "hash",
            ValueType::SortedSet => "zset",
        }
    }
}

impl Value {
    /// Get the type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Set(_) => ValueType::Set,
            Value::Hash(_) => ValueType::Hash,
            Value::SortedSet(_) => ValueType::SortedSet,
        }
    }

    /// Collections that become empty are removed from the keyspace.
    /// An empty string is still a value.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Value::String(_) => false,
            Value::List(list) => list.is_empty(),
            Value::Set(set) => set.is_empty(),
            Value::Hash(hash) => hash.is_empty(),
            Value::SortedSet(zset) => zset.is_empty(),
        }
    }

    /// Try to parse string value as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }
}

/// A stored entry with value and expiration
#[derive(Debug, Clone)]
pub struct StoredValue {
    /// The actual value
    pub value: Value,

    /// Wall-clock expiration; `None` means persistent
    pub expires_at: Option<SystemTime>,
}

impl StoredValue {
    /// Create a new persistent stored value
    pub fn new(value: Value) -> Self {
        StoredValue {
            value,
            expires_at: None,
        }
    }

    /// Check if this stored value has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires_at| SystemTime::now() >= expires_at)
            .unwrap_or(false)
    }

    /// Set expiration relative to now
    pub fn set_expiration(&mut self, expires_in: Duration) {
        self.expires_at = Some(SystemTime::now() + expires_in);
    }

    /// Remaining time to live; `None` when persistent
    pub fn ttl(&self) -> Option<Duration> {
        self.expires_at.map(|expires_at| {
            expires_at
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO)
        })
    }
}
