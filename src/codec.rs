//! Element encoding
//!
//! The store only holds strings. Every element type declares how it is
//! written and how a stored string is read back.

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Declared element type of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Integer,
    Boolean,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Integer => "integer",
            ElementKind::Boolean => "boolean",
        }
    }
}

/// A value that can be stored as a collection element
pub trait Element: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    const KIND: ElementKind;

    /// String written to the store
    fn encode(&self) -> String;

    /// Reconstruct a value from its stored string
    fn decode(raw: &str) -> Result<Self>;
}

impl Element for String {
    const KIND: ElementKind = ElementKind::Text;

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Result<Self> {
        Ok(raw.to_string())
    }
}

impl Element for i64 {
    const KIND: ElementKind = ElementKind::Integer;

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Result<Self> {
        raw.parse::<i64>().map_err(|_| decode_error::<Self>(raw))
    }
}

/// `"1"` / `"0"`; any non-zero integer reads back as `true`
impl Element for bool {
    const KIND: ElementKind = ElementKind::Boolean;

    fn encode(&self) -> String {
        let raw = if *self { "1" } else { "0" };
        raw.to_string()
    }

    fn decode(raw: &str) -> Result<Self> {
        raw.parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| decode_error::<Self>(raw))
    }
}

fn decode_error<T: Element>(raw: &str) -> Error {
    Error::Type(format!("cannot decode '{}' as {}", raw, T::KIND.name()))
}

/// Decode every stored string in `raw`
pub fn decode_all<T: Element, C: FromIterator<T>>(raw: impl IntoIterator<Item = String>) -> Result<C> {
    raw.into_iter().map(|s| T::decode(&s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_identity() {
        for s in ["", "hello", "with space", "ünïcödé"] {
            assert_eq!(String::decode(&s.to_string().encode()).unwrap(), s);
        }
    }

    #[test]
    fn test_integer_boundaries() {
        for n in [0i64, -1, 1, i64::MIN, i64::MAX] {
            assert_eq!(i64::decode(&n.encode()).unwrap(), n);
        }
        assert!(matches!(i64::decode("1.5"), Err(Error::Type(_))));
        assert!(matches!(i64::decode(""), Err(Error::Type(_))));
    }

    #[test]
    fn test_boolean_encoding() {
        assert_eq!(true.encode(), "1");
        assert_eq!(false.encode(), "0");
        assert!(bool::decode("1").unwrap());
        assert!(!bool::decode("0").unwrap());
        assert!(bool::decode("-7").unwrap());
        assert!(matches!(bool::decode("true"), Err(Error::Type(_))));
    }

    #[test]
    fn test_decode_all() {
        let values: Vec<i64> = decode_all::<i64, _>(vec!["3".to_string(), "-2".to_string()]).unwrap();
        assert_eq!(values, vec![3, -2]);
        assert!(decode_all::<i64, Vec<i64>>(vec!["x".to_string()]).is_err());
    }
}
