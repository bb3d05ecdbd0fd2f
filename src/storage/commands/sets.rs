//! Set commands
//!
//! Membership primitives plus the multi-key combinators SUNION, SINTER and
//! SDIFF and their *STORE forms. A missing key is an empty set.

use std::collections::HashSet;

use rand::seq::IteratorRandom;

use super::{bulk_array, CommandResult};
use crate::protocol::RespFrame;
use crate::storage::{CommandError, Database, Value};

fn read<'a>(db: &'a mut Database, key: &str) -> Result<Option<&'a mut HashSet<String>>, CommandError> {
    match db.get_mut(key).map(|stored| &mut stored.value) {
        None => Ok(None),
        Some(Value::Set(set)) => Ok(Some(set)),
        Some(_) => Err(CommandError::WrongType),
    }
}

/// Members of `key`, empty when the key is absent
fn members(db: &mut Database, key: &str) -> Result<HashSet<String>, CommandError> {
    Ok(read(db, key)?.map(|set| set.clone()).unwrap_or_default())
}

/// Replace `destination` with `result`; an empty result deletes it
fn store(db: &mut Database, destination: &str, result: HashSet<String>) -> CommandResult {
    let len = result.len();
    db.remove(destination);
    if len > 0 {
        db.insert(destination, Value::Set(result));
    }
    Ok(RespFrame::Integer(len as i64))
}

pub fn sadd(db: &mut Database, key: &str, new_members: &[String]) -> CommandResult {
    let stored = db.get_or_insert_with(key, || Value::Set(HashSet::new()));
    let set = match &mut stored.value {
        Value::Set(set) => set,
        _ => return Err(CommandError::WrongType),
    };

    let added = new_members
        .iter()
        .filter(|member| set.insert((*member).clone()))
        .count();
    Ok(RespFrame::Integer(added as i64))
}

pub fn srem(db: &mut Database, key: &str, doomed: &[String]) -> CommandResult {
    let removed = match read(db, key)? {
        Some(set) => doomed.iter().filter(|member| set.remove(*member)).count(),
        None => 0,
    };
    db.remove_if_empty(key);
    Ok(RespFrame::Integer(removed as i64))
}

pub fn sismember(db: &mut Database, key: &str, member: &str) -> CommandResult {
    let found = read(db, key)?.map_or(false, |set| set.contains(member));
    Ok(RespFrame::from(found))
}

pub fn scard(db: &mut Database, key: &str) -> CommandResult {
    let len = read(db, key)?.map_or(0, |set| set.len());
    Ok(RespFrame::Integer(len as i64))
}

pub fn smembers(db: &mut Database, key: &str) -> CommandResult {
    Ok(bulk_array(members(db, key)?))
}

pub fn spop(db: &mut Database, key: &str) -> CommandResult {
    let popped = match read(db, key)? {
        Some(set) => {
            let chosen = set.iter().choose(&mut rand::thread_rng()).cloned();
            if let Some(member) = &chosen {
                set.remove(member);
            }
            chosen
        }
        None => None,
    };
    db.remove_if_empty(key);
    Ok(popped.map_or_else(RespFrame::null_bulk, RespFrame::from))
}

pub fn srandmember(db: &mut Database, key: &str) -> CommandResult {
    let chosen = read(db, key)?.and_then(|set| set.iter().choose(&mut rand::thread_rng()).cloned());
    Ok(chosen.map_or_else(RespFrame::null_bulk, RespFrame::from))
}

fn union(db: &mut Database, keys: &[String]) -> Result<HashSet<String>, CommandError> {
    let mut result = HashSet::new();
    for key in keys {
        result.extend(members(db, key)?);
    }
    Ok(result)
}

fn intersection(db: &mut Database, keys: &[String]) -> Result<HashSet<String>, CommandError> {
    // Type-check every key even when an earlier one is missing
    let sets = keys
        .iter()
        .map(|key| members(db, key))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sets = sets.into_iter();
    let mut result = sets.next().unwrap_or_default();
    for set in sets {
        result.retain(|member| set.contains(member));
    }
    Ok(result)
}

fn difference(db: &mut Database, keys: &[String]) -> Result<HashSet<String>, CommandError> {
    let mut result = members(db, &keys[0])?;
    for key in &keys[1..] {
        for member in members(db, key)? {
            result.remove(&member);
        }
    }
    Ok(result)
}

pub fn sunion(db: &mut Database, keys: &[String]) -> CommandResult {
    Ok(bulk_array(union(db, keys)?))
}

pub fn sinter(db: &mut Database, keys: &[String]) -> CommandResult {
    Ok(bulk_array(intersection(db, keys)?))
}

pub fn sdiff(db: &mut Database, keys: &[String]) -> CommandResult {
    Ok(bulk_array(difference(db, keys)?))
}

pub fn sunionstore(db: &mut Database, destination: &str, keys: &[String]) -> CommandResult {
    let result = union(db, keys)?;
    store(db, destination, result)
}

pub fn sinterstore(db: &mut Database, destination: &str, keys: &[String]) -> CommandResult {
    let result = intersection(db, keys)?;
    store(db, destination, result)
}

pub fn sdiffstore(db: &mut Database, destination: &str, keys: &[String]) -> CommandResult {
    let result = difference(db, keys)?;
    store(db, destination, result)
}
