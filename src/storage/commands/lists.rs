//! List commands: RPUSH, LPUSH, LRANGE, LLEN, LINDEX, LSET, LREM, LPOP, RPOP

use std::collections::VecDeque;

use super::{bulk_array, normalize_range, CommandResult};
use crate::protocol::RespFrame;
use crate::storage::{CommandError, Database, Value};

fn read<'a>(db: &'a mut Database, key: &str) -> Result<Option<&'a mut VecDeque<String>>, CommandError> {
    match db.get_mut(key).map(|stored| &mut stored.value) {
        None => Ok(None),
        Some(Value::List(list)) => Ok(Some(list)),
        Some(_) => Err(CommandError::WrongType),
    }
}

fn write<'a>(db: &'a mut Database, key: &str) -> Result<&'a mut VecDeque<String>, CommandError> {
    match &mut db.get_or_insert_with(key, || Value::List(VecDeque::new())).value {
        Value::List(list) => Ok(list),
        _ => Err(CommandError::WrongType),
    }
}

/// Resolve a possibly negative index
fn position(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    (0..len as i64).contains(&resolved).then_some(resolved as usize)
}

pub fn rpush(db: &mut Database, key: &str, values: &[String]) -> CommandResult {
    let list = write(db, key)?;
    list.extend(values.iter().cloned());
    Ok(RespFrame::Integer(list.len() as i64))
}

/// Each value goes to the head in turn, so the last one ends up first
pub fn lpush(db: &mut Database, key: &str, values: &[String]) -> CommandResult {
    let list = write(db, key)?;
    for value in values {
        list.push_front(value.clone());
    }
    Ok(RespFrame::Integer(list.len() as i64))
}

pub fn lrange(db: &mut Database, key: &str, start: i64, stop: i64) -> CommandResult {
    let items: Vec<String> = match read(db, key)? {
        Some(list) => match normalize_range(start, stop, list.len()) {
            Some((start, stop)) => list.range(start..=stop).cloned().collect(),
            None => Vec::new(),
        },
        None => Vec::new(),
    };
    Ok(bulk_array(items))
}

pub fn llen(db: &mut Database, key: &str) -> CommandResult {
    let len = read(db, key)?.map_or(0, |list| list.len());
    Ok(RespFrame::Integer(len as i64))
}

pub fn lindex(db: &mut Database, key: &str, index: i64) -> CommandResult {
    let item = read(db, key)?.and_then(|list| {
        position(index, list.len()).and_then(|i| list.get(i).cloned())
    });
    Ok(item.map_or_else(RespFrame::null_bulk, RespFrame::from))
}

pub fn lset(db: &mut Database, key: &str, index: i64, value: &str) -> CommandResult {
    let list = read(db, key)?.ok_or(CommandError::NoSuchKey)?;
    let i = position(index, list.len()).ok_or(CommandError::IndexOutOfRange)?;
    list[i] = value.to_string();
    Ok(RespFrame::ok())
}

/// count > 0 removes from the head, count < 0 from the tail, 0 removes all
pub fn lrem(db: &mut Database, key: &str, count: i64, value: &str) -> CommandResult {
    let list = match read(db, key)? {
        Some(list) => list,
        None => return Ok(RespFrame::Integer(0)),
    };

    let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
    let mut removed = 0;

    if count >= 0 {
        let mut i = 0;
        while i < list.len() && removed < limit {
            if list[i] == value {
                list.remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
    } else {
        let mut i = list.len();
        while i > 0 && removed < limit {
            i -= 1;
            if list[i] == value {
                list.remove(i);
                removed += 1;
            }
        }
    }

    db.remove_if_empty(key);
    Ok(RespFrame::Integer(removed as i64))
}

pub fn lpop(db: &mut Database, key: &str) -> CommandResult {
    let item = read(db, key)?.and_then(|list| list.pop_front());
    db.remove_if_empty(key);
    Ok(item.map_or_else(RespFrame::null_bulk, RespFrame::from))
}

pub fn rpop(db: &mut Database, key: &str) -> CommandResult {
    let item = read(db, key)?.and_then(|list| list.pop_back());
    db.remove_if_empty(key);
    Ok(item.map_or_else(RespFrame::null_bulk, RespFrame::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_push_and_range() {
        let mut db = Database::new();
        rpush(&mut db, "l", &strings(&["b", "c"])).unwrap();
        assert_eq!(lpush(&mut db, "l", &strings(&["a", "z"])).unwrap(), RespFrame::Integer(4));
        assert_eq!(lrange(&mut db, "l", 0, -1).unwrap(), bulk_array(["z", "a", "b", "c"]));
        assert_eq!(lrange(&mut db, "l", -2, 10).unwrap(), bulk_array(["b", "c"]));
    }

    #[test]
    fn test_index_and_set() {
        let mut db = Database::new();
        rpush(&mut db, "l", &strings(&["a", "b"])).unwrap();
        assert_eq!(lindex(&mut db, "l", -1).unwrap(), RespFrame::bulk_string("b"));
        assert_eq!(lindex(&mut db, "l", 2).unwrap(), RespFrame::null_bulk());

        lset(&mut db, "l", 0, "x").unwrap();
        assert_eq!(lindex(&mut db, "l", 0).unwrap(), RespFrame::bulk_string("x"));
        assert_eq!(lset(&mut db, "l", 5, "x"), Err(CommandError::IndexOutOfRange));
        assert_eq!(lset(&mut db, "missing", 0, "x"), Err(CommandError::NoSuchKey));
    }

    #[test]
    fn test_lrem_directions() {
        let mut db = Database::new();
        rpush(&mut db, "l", &strings(&["a", "b", "a", "c", "a"])).unwrap();
        assert_eq!(lrem(&mut db, "l", -1, "a").unwrap(), RespFrame::Integer(1));
        assert_eq!(lrange(&mut db, "l", 0, -1).unwrap(), bulk_array(["a", "b", "a", "c"]));
        assert_eq!(lrem(&mut db, "l", 1, "a").unwrap(), RespFrame::Integer(1));
        assert_eq!(lrange(&mut db, "l", 0, -1).unwrap(), bulk_array(["b", "a", "c"]));
        assert_eq!(lrem(&mut db, "l", 0, "zz").unwrap(), RespFrame::Integer(0));
    }

    #[test]
    fn test_pop_removes_empty_list() {
        let mut db = Database::new();
        rpush(&mut db, "l", &strings(&["a"])).unwrap();
        assert_eq!(rpop(&mut db, "l").unwrap(), RespFrame::bulk_string("a"));
        assert!(!db.contains("l"));
        assert_eq!(lpop(&mut db, "l").unwrap(), RespFrame::null_bulk());
    }
}
