//! Command handlers
//!
//! One module per data type. [`dispatch`] routes a [`Command`] to its
//! handler and turns handler failures into error replies.

pub mod hashes;
pub mod keys;
pub mod lists;
pub mod sets;
pub mod sorted_sets;
pub mod strings;

use super::{CommandError, Database, DatabaseIndex};
use crate::command::Command;
use crate::protocol::RespFrame;

/// Result of a single command handler
pub type CommandResult = std::result::Result<RespFrame, CommandError>;

/// Execute one command. `current` is the selected database and is
/// updated by SELECT.
pub fn dispatch(databases: &mut [Database], current: &mut DatabaseIndex, command: &Command) -> RespFrame {
    match route(databases, current, command) {
        Ok(frame) => frame,
        Err(err) => RespFrame::error(err.to_string()),
    }
}

fn route(databases: &mut [Database], current: &mut DatabaseIndex, command: &Command) -> CommandResult {
    match command {
        Command::Select { db } => {
            if *db >= databases.len() {
                return Err(CommandError::InvalidDatabase);
            }
            *current = *db;
            return Ok(RespFrame::ok());
        }
        Command::Move { key, db } => return keys::move_key(databases, *current, key, *db),
        _ => {}
    }

    let db = databases
        .get_mut(*current)
        .ok_or(CommandError::InvalidDatabase)?;

    match command {
        Command::Ping => Ok(RespFrame::simple_string("PONG")),
        Command::Auth { .. } => Err(CommandError::Generic(
            "AUTH <password> called without any password configured for the default user".to_string(),
        )),
        Command::Select { .. } | Command::Move { .. } => Err(CommandError::SyntaxError),

        Command::Del { keys } => keys::del(db, non_empty(command, keys)?),
        Command::Exists { key } => keys::exists(db, key),
        Command::Type { key } => keys::key_type(db, key),
        Command::Rename { key, new_key } => keys::rename(db, key, new_key),
        Command::RenameNx { key, new_key } => keys::renamenx(db, key, new_key),
        Command::Expire { key, seconds } => keys::expire(db, key, *seconds),
        Command::ExpireAt { key, timestamp } => keys::expireat(db, key, *timestamp),
        Command::Ttl { key } => keys::ttl(db, key),
        Command::Keys { pattern } => keys::keys(db, pattern),

        Command::Get { key } => strings::get(db, key),
        Command::Set { key, value } => strings::set(db, key, value),
        Command::Append { key, value } => strings::append(db, key, value),
        Command::IncrBy { key, delta } => strings::incr_by(db, key, *delta),
        Command::DecrBy { key, delta } => {
            let delta = delta.checked_neg().ok_or(CommandError::IntegerOverflow)?;
            strings::incr_by(db, key, delta)
        }
        Command::GetRange { key, start, end } => strings::getrange(db, key, *start, *end),

        Command::RPush { key, values } => lists::rpush(db, key, non_empty(command, values)?),
        Command::LPush { key, values } => lists::lpush(db, key, non_empty(command, values)?),
        Command::LRange { key, start, stop } => lists::lrange(db, key, *start, *stop),
        Command::LLen { key } => lists::llen(db, key),
        Command::LIndex { key, index } => lists::lindex(db, key, *index),
        Command::LSet { key, index, value } => lists::lset(db, key, *index, value),
        Command::LRem { key, count, value } => lists::lrem(db, key, *count, value),
        Command::LPop { key } => lists::lpop(db, key),
        Command::RPop { key } => lists::rpop(db, key),

        Command::HSet { key, pairs } => hashes::hset(db, key, non_empty(command, pairs)?),
        Command::HGet { key, field } => hashes::hget(db, key, field),
        Command::HDel { key, fields } => hashes::hdel(db, key, non_empty(command, fields)?),
        Command::HLen { key } => hashes::hlen(db, key),
        Command::HExists { key, field } => hashes::hexists(db, key, field),
        Command::HKeys { key } => hashes::hkeys(db, key),
        Command::HVals { key } => hashes::hvals(db, key),
        Command::HGetAll { key } => hashes::hgetall(db, key),

        Command::SAdd { key, members } => sets::sadd(db, key, non_empty(command, members)?),
        Command::SRem { key, members } => sets::srem(db, key, non_empty(command, members)?),
        Command::SIsMember { key, member } => sets::sismember(db, key, member),
        Command::SCard { key } => sets::scard(db, key),
        Command::SMembers { key } => sets::smembers(db, key),
        Command::SPop { key } => sets::spop(db, key),
        Command::SRandMember { key } => sets::srandmember(db, key),
        Command::SUnion { keys } => sets::sunion(db, non_empty(command, keys)?),
        Command::SInter { keys } => sets::sinter(db, non_empty(command, keys)?),
        Command::SDiff { keys } => sets::sdiff(db, non_empty(command, keys)?),
        Command::SUnionStore { destination, keys } => {
            sets::sunionstore(db, destination, non_empty(command, keys)?)
        }
        Command::SInterStore { destination, keys } => {
            sets::sinterstore(db, destination, non_empty(command, keys)?)
        }
        Command::SDiffStore { destination, keys } => {
            sets::sdiffstore(db, destination, non_empty(command, keys)?)
        }

        Command::ZAdd { key, entries } => sorted_sets::zadd(db, key, non_empty(command, entries)?),
        Command::ZRem { key, members } => sorted_sets::zrem(db, key, non_empty(command, members)?),
        Command::ZScore { key, member } => sorted_sets::zscore(db, key, member),
        Command::ZRank { key, member } => sorted_sets::zrank(db, key, member, false),
        Command::ZRevRank { key, member } => sorted_sets::zrank(db, key, member, true),
        Command::ZCard { key } => sorted_sets::zcard(db, key),
        Command::ZRange { key, start, stop, with_scores } => {
            sorted_sets::zrange(db, key, *start, *stop, false, *with_scores)
        }
        Command::ZRevRange { key, start, stop, with_scores } => {
            sorted_sets::zrange(db, key, *start, *stop, true, *with_scores)
        }
        Command::ZRangeByScore { key, min, max, with_scores, limit } => {
            sorted_sets::zrangebyscore(db, key, min, max, false, *with_scores, *limit)
        }
        Command::ZRevRangeByScore { key, max, min, with_scores, limit } => {
            sorted_sets::zrangebyscore(db, key, min, max, true, *with_scores, *limit)
        }
        Command::ZRemRangeByRank { key, start, stop } => {
            sorted_sets::zremrangebyrank(db, key, *start, *stop)
        }
        Command::ZRemRangeByScore { key, min, max } => sorted_sets::zremrangebyscore(db, key, min, max),
        Command::ZIncrBy { key, increment, member } => sorted_sets::zincrby(db, key, *increment, member),
        Command::ZUnionStore(store) => sorted_sets::zunionstore(db, store),
        Command::ZInterStore(store) => sorted_sets::zinterstore(db, store),
        Command::ZDiffStore { destination, keys } => {
            sorted_sets::zdiffstore(db, destination, non_empty(command, keys)?)
        }
    }
}

/// Variadic arguments must not be empty
fn non_empty<'a, T>(command: &Command, items: &'a [T]) -> Result<&'a [T], CommandError> {
    if items.is_empty() {
        Err(CommandError::WrongNumberOfArgs(command.name().to_lowercase()))
    } else {
        Ok(items)
    }
}

/// Resolve an inclusive `start..=stop` range where negative indexes count
/// from the end. `None` when the range selects nothing.
pub fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

/// Array reply of bulk strings
pub(crate) fn bulk_array<I, S>(items: I) -> RespFrame
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    RespFrame::array(items.into_iter().map(RespFrame::bulk_string).collect())
}
