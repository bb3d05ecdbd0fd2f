//! String commands: GET, SET, APPEND, INCRBY, DECRBY, GETRANGE

use super::CommandResult;
use crate::protocol::RespFrame;
use crate::storage::{CommandError, Database, Value};

fn read<'a>(db: &'a mut Database, key: &str) -> Result<Option<&'a String>, CommandError> {
    match db.get(key).map(|stored| &stored.value) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(CommandError::WrongType),
    }
}

pub fn get(db: &mut Database, key: &str) -> CommandResult {
    Ok(match read(db, key)? {
        Some(s) => RespFrame::bulk_string(s),
        None => RespFrame::null_bulk(),
    })
}

/// Replaces any value and clears its expiration
pub fn set(db: &mut Database, key: &str, value: &str) -> CommandResult {
    db.insert(key, Value::String(value.to_string()));
    Ok(RespFrame::ok())
}

pub fn append(db: &mut Database, key: &str, value: &str) -> CommandResult {
    let stored = db.get_or_insert_with(key, || Value::String(String::new()));
    match &mut stored.value {
        Value::String(s) => {
            s.push_str(value);
            Ok(RespFrame::Integer(s.len() as i64))
        }
        _ => Err(CommandError::WrongType),
    }
}

/// INCRBY; DECRBY arrives here with the delta negated
pub fn incr_by(db: &mut Database, key: &str, delta: i64) -> CommandResult {
    let stored = db.get_or_insert_with(key, || Value::String("0".to_string()));
    let current = match &stored.value {
        Value::String(_) => stored.value.as_integer().ok_or(CommandError::NotInteger)?,
        _ => return Err(CommandError::WrongType),
    };

    let updated = current
        .checked_add(delta)
        .ok_or(CommandError::IntegerOverflow)?;
    stored.value = Value::String(updated.to_string());
    Ok(RespFrame::Integer(updated))
}

/// Byte range with inclusive, possibly negative, offsets
pub fn getrange(db: &mut Database, key: &str, start: i64, end: i64) -> CommandResult {
    let bytes = match read(db, key)? {
        Some(s) => s.as_bytes(),
        None => return Ok(RespFrame::bulk_string("")),
    };

    let len = bytes.len() as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { (len + end).max(0) } else { end.min(len - 1) };

    if len == 0 || start > end || start >= len {
        return Ok(RespFrame::bulk_string(""));
    }
    Ok(RespFrame::bulk_string(&bytes[start as usize..=end as usize]))
}
