//! Hash commands: HSET, HGET, HDEL, HLEN, HEXISTS, HKEYS, HVALS, HGETALL

use std::collections::HashMap;

use super::{bulk_array, CommandResult};
use crate::protocol::RespFrame;
use crate::storage::{CommandError, Database, Value};

fn read<'a>(db: &'a mut Database, key: &str) -> Result<Option<&'a mut HashMap<String, String>>, CommandError> {
    match db.get_mut(key).map(|stored| &mut stored.value) {
        None => Ok(None),
        Some(Value::Hash(hash)) => Ok(Some(hash)),
        Some(_) => Err(CommandError::WrongType),
    }
}

/// Returns the number of fields that were added
pub fn hset(db: &mut Database, key: &str, pairs: &[(String, String)]) -> CommandResult {
    let stored = db.get_or_insert_with(key, || Value::Hash(HashMap::new()));
    let hash = match &mut stored.value {
        Value::Hash(hash) => hash,
        _ => return Err(CommandError::WrongType),
    };

    let added = pairs
        .iter()
        .filter(|(field, value)| hash.insert(field.clone(), value.clone()).is_none())
        .count();
    Ok(RespFrame::Integer(added as i64))
}

pub fn hget(db: &mut Database, key: &str, field: &str) -> CommandResult {
    let value = read(db, key)?.and_then(|hash| hash.get(field).cloned());
    Ok(value.map_or_else(RespFrame::null_bulk, RespFrame::from))
}

pub fn hdel(db: &mut Database, key: &str, fields: &[String]) -> CommandResult {
    let removed = match read(db, key)? {
        Some(hash) => fields.iter().filter(|field| hash.remove(*field).is_some()).count(),
        None => 0,
    };
    db.remove_if_empty(key);
    Ok(RespFrame::Integer(removed as i64))
}

pub fn hlen(db: &mut Database, key: &str) -> CommandResult {
    let len = read(db, key)?.map_or(0, |hash| hash.len());
    Ok(RespFrame::Integer(len as i64))
}

pub fn hexists(db: &mut Database, key: &str, field: &str) -> CommandResult {
    let exists = read(db, key)?.map_or(false, |hash| hash.contains_key(field));
    Ok(RespFrame::from(exists))
}

pub fn hkeys(db: &mut Database, key: &str) -> CommandResult {
    let fields: Vec<String> = read(db, key)?.map_or_else(Vec::new, |hash| hash.keys().cloned().collect());
    Ok(bulk_array(fields))
}

pub fn hvals(db: &mut Database, key: &str) -> CommandResult {
    let values: Vec<String> = read(db, key)?.map_or_else(Vec::new, |hash| hash.values().cloned().collect());
    Ok(bulk_array(values))
}

/// Flat array: field, value, field, value, ...
pub fn hgetall(db: &mut Database, key: &str) -> CommandResult {
    let flat: Vec<String> = read(db, key)?.map_or_else(Vec::new, |hash| {
        hash.iter()
            .flat_map(|(field, value)| [field.clone(), value.clone()])
            .collect()
    });
    Ok(bulk_array(flat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(f, v)| (f.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_hset_counts_new_fields() {
        let mut db = Database::new();
        assert_eq!(hset(&mut db, "h", &pairs(&[("a", "1"), ("b", "2")])).unwrap(), RespFrame::Integer(2));
        assert_eq!(hset(&mut db, "h", &pairs(&[("a", "9"), ("c", "3")])).unwrap(), RespFrame::Integer(1));
        assert_eq!(hget(&mut db, "h", "a").unwrap(), RespFrame::bulk_string("9"));
        assert_eq!(hlen(&mut db, "h").unwrap(), RespFrame::Integer(3));
    }

    #[test]
    fn test_hdel_and_exists() {
        let mut db = Database::new();
        hset(&mut db, "h", &pairs(&[("a", "1")])).unwrap();
        assert_eq!(hexists(&mut db, "h", "a").unwrap(), RespFrame::Integer(1));
        assert_eq!(hdel(&mut db, "h", &["a".into(), "x".into()]).unwrap(), RespFrame::Integer(1));
        assert!(!db.contains("h"));
        assert_eq!(hget(&mut db, "h", "a").unwrap(), RespFrame::null_bulk());
    }

    #[test]
    fn test_hgetall_is_flat() {
        let mut db = Database::new();
        hset(&mut db, "h", &pairs(&[("f", "v")])).unwrap();
        assert_eq!(hgetall(&mut db, "h").unwrap(), bulk_array(["f", "v"]));
    }

    #[test]
    fn test_wrong_type() {
        let mut db = Database::new();
        db.insert("s", Value::String("x".into()));
        assert_eq!(hget(&mut db, "s", "f"), Err(CommandError::WrongType));
    }
}
