//! Sorted set commands
//!
//! Rank and score range reads, range removal, and the multi-key
//! ZUNIONSTORE / ZINTERSTORE / ZDIFFSTORE. The multi-key commands accept
//! plain sets as sources, their members scoring 1.

use std::collections::HashMap;

use super::{normalize_range, CommandResult};
use crate::command::{ScoreBound, ZStore};
use crate::protocol::{format_score, RespFrame};
use crate::storage::{CommandError, Database, SortedSet, Value};

fn read<'a>(db: &'a mut Database, key: &str) -> Result<Option<&'a mut SortedSet>, CommandError> {
    match db.get_mut(key).map(|stored| &mut stored.value) {
        None => Ok(None),
        Some(Value::SortedSet(zset)) => Ok(Some(zset)),
        Some(_) => Err(CommandError::WrongType),
    }
}

fn write<'a>(db: &'a mut Database, key: &str) -> Result<&'a mut SortedSet, CommandError> {
    match &mut db.get_or_insert_with(key, || Value::SortedSet(SortedSet::new())).value {
        Value::SortedSet(zset) => Ok(zset),
        _ => Err(CommandError::WrongType),
    }
}

/// Source of a multi-key command: a sorted set, or a set scoring 1
fn scored_source(db: &mut Database, key: &str) -> Result<Option<HashMap<String, f64>>, CommandError> {
    match db.get(key).map(|stored| &stored.value) {
        None => Ok(None),
        Some(Value::SortedSet(zset)) => Ok(Some(
            zset.iter().map(|(member, score)| (member.to_string(), score)).collect(),
        )),
        Some(Value::Set(set)) => Ok(Some(set.iter().map(|member| (member.clone(), 1.0)).collect())),
        Some(_) => Err(CommandError::WrongType),
    }
}

fn score_reply(score: f64) -> RespFrame {
    RespFrame::bulk_string(format_score(score))
}

/// Members, optionally interleaved with their scores
fn range_reply(items: Vec<(String, f64)>, with_scores: bool) -> RespFrame {
    let mut frames = Vec::with_capacity(items.len() * if with_scores { 2 } else { 1 });
    for (member, score) in items {
        frames.push(RespFrame::from(member));
        if with_scores {
            frames.push(score_reply(score));
        }
    }
    RespFrame::array(frames)
}

/// Replace `destination` with `result`; an empty result deletes it
fn store(db: &mut Database, destination: &str, result: HashMap<String, f64>) -> CommandResult {
    let len = result.len();
    db.remove(destination);
    if len > 0 {
        db.insert(destination, Value::SortedSet(result.into_iter().collect()));
    }
    Ok(RespFrame::Integer(len as i64))
}

pub fn zadd(db: &mut Database, key: &str, entries: &[(f64, String)]) -> CommandResult {
    if entries.iter().any(|(score, _)| score.is_nan()) {
        return Err(CommandError::Generic("value is not a valid float".to_string()));
    }

    let zset = write(db, key)?;
    let added = entries
        .iter()
        .filter(|(score, member)| zset.insert(member.clone(), *score).is_none())
        .count();
    Ok(RespFrame::Integer(added as i64))
}

pub fn zrem(db: &mut Database, key: &str, members: &[String]) -> CommandResult {
    let removed = match read(db, key)? {
        Some(zset) => members.iter().filter(|member| zset.remove(member).is_some()).count(),
        None => 0,
    };
    db.remove_if_empty(key);
    Ok(RespFrame::Integer(removed as i64))
}

pub fn zscore(db: &mut Database, key: &str, member: &str) -> CommandResult {
    let score = read(db, key)?.and_then(|zset| zset.score(member));
    Ok(score.map_or_else(RespFrame::null_bulk, score_reply))
}

pub fn zrank(db: &mut Database, key: &str, member: &str, reverse: bool) -> CommandResult {
    let rank = read(db, key)?.and_then(|zset| {
        zset.rank(member)
            .map(|rank| if reverse { zset.len() - 1 - rank } else { rank })
    });
    Ok(rank.map_or_else(RespFrame::null_bulk, |rank| RespFrame::Integer(rank as i64)))
}

pub fn zcard(db: &mut Database, key: &str) -> CommandResult {
    let len = read(db, key)?.map_or(0, |zset| zset.len());
    Ok(RespFrame::Integer(len as i64))
}

/// ZRANGE / ZREVRANGE. For the reverse form ranks count from the highest
/// score.
pub fn zrange(
    db: &mut Database,
    key: &str,
    start: i64,
    stop: i64,
    reverse: bool,
    with_scores: bool,
) -> CommandResult {
    let items = match read(db, key)? {
        Some(zset) => {
            let len = zset.len();
            match normalize_range(start, stop, len) {
                Some((start, stop)) if reverse => {
                    let mut items = zset.range_by_rank(len - 1 - stop, len - 1 - start);
                    items.reverse();
                    items
                }
                Some((start, stop)) => zset.range_by_rank(start, stop),
                None => Vec::new(),
            }
        }
        None => Vec::new(),
    };
    Ok(range_reply(items, with_scores))
}

/// ZRANGEBYSCORE / ZREVRANGEBYSCORE
pub fn zrangebyscore(
    db: &mut Database,
    key: &str,
    min: &ScoreBound,
    max: &ScoreBound,
    reverse: bool,
    with_scores: bool,
    limit: Option<(usize, usize)>,
) -> CommandResult {
    let mut items = read(db, key)?.map_or_else(Vec::new, |zset| zset.range_by_score(min, max));
    if reverse {
        items.reverse();
    }
    if let Some((offset, count)) = limit {
        items = items.into_iter().skip(offset).take(count).collect();
    }
    Ok(range_reply(items, with_scores))
}

pub fn zremrangebyrank(db: &mut Database, key: &str, start: i64, stop: i64) -> CommandResult {
    let removed = match read(db, key)? {
        Some(zset) => match normalize_range(start, stop, zset.len()) {
            Some((start, stop)) => zset.remove_range_by_rank(start, stop),
            None => 0,
        },
        None => 0,
    };
    db.remove_if_empty(key);
    Ok(RespFrame::Integer(removed as i64))
}

pub fn zremrangebyscore(db: &mut Database, key: &str, min: &ScoreBound, max: &ScoreBound) -> CommandResult {
    let removed = read(db, key)?.map_or(0, |zset| zset.remove_range_by_score(min, max));
    db.remove_if_empty(key);
    Ok(RespFrame::Integer(removed as i64))
}

pub fn zincrby(db: &mut Database, key: &str, increment: f64, member: &str) -> CommandResult {
    if increment.is_nan() {
        return Err(CommandError::Generic("value is not a valid float".to_string()));
    }

    let zset = write(db, key)?;
    let updated = zset.score(member).unwrap_or(0.0) + increment;
    if updated.is_nan() {
        db.remove_if_empty(key);
        return Err(CommandError::NotANumber);
    }
    zset.insert(member.to_string(), updated);
    Ok(score_reply(updated))
}

/// Weighted score; `inf * 0` counts as 0
fn weighted(score: f64, weight: f64) -> f64 {
    let value = score * weight;
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Sources of a ZUNIONSTORE / ZINTERSTORE with their weights
fn weighted_sources(
    db: &mut Database,
    args: &ZStore,
    command: &str,
) -> Result<Vec<(Option<HashMap<String, f64>>, f64)>, CommandError> {
    if args.keys.is_empty() {
        return Err(CommandError::Generic(format!(
            "at least 1 input key is needed for '{}' command",
            command
        )));
    }

    let weights = match &args.weights {
        Some(weights) if weights.len() != args.keys.len() => return Err(CommandError::SyntaxError),
        Some(weights) => weights.clone(),
        None => vec![1.0; args.keys.len()],
    };
    if weights.iter().any(|w| w.is_nan()) {
        return Err(CommandError::Generic("weight value is not a float".to_string()));
    }

    args.keys
        .iter()
        .zip(weights)
        .map(|(key, weight)| Ok((scored_source(db, key)?, weight)))
        .collect()
}

pub fn zunionstore(db: &mut Database, args: &ZStore) -> CommandResult {
    let sources = weighted_sources(db, args, "zunionstore")?;

    let mut result: HashMap<String, f64> = HashMap::new();
    for (source, weight) in sources {
        for (member, score) in source.unwrap_or_default() {
            let score = weighted(score, weight);
            result
                .entry(member)
                .and_modify(|acc| *acc = args.aggregate.combine(*acc, score))
                .or_insert(score);
        }
    }

    store(db, &args.destination, result)
}

pub fn zinterstore(db: &mut Database, args: &ZStore) -> CommandResult {
    let sources = weighted_sources(db, args, "zinterstore")?;

    let mut sources = sources.into_iter();
    let mut result: HashMap<String, f64> = match sources.next() {
        Some((Some(first), weight)) => first
            .into_iter()
            .map(|(member, score)| (member, weighted(score, weight)))
            .collect(),
        _ => HashMap::new(),
    };

    for (source, weight) in sources {
        let source = source.unwrap_or_default();
        result.retain(|member, acc| match source.get(member) {
            Some(score) => {
                *acc = args.aggregate.combine(*acc, weighted(*score, weight));
                true
            }
            None => false,
        });
    }

    store(db, &args.destination, result)
}

/// Members of the first key absent from all others, keeping first-key scores
pub fn zdiffstore(db: &mut Database, destination: &str, keys: &[String]) -> CommandResult {
    let mut result = scored_source(db, &keys[0])?.unwrap_or_default();
    for key in &keys[1..] {
        if let Some(other) = scored_source(db, key)? {
            result.retain(|member, _| !other.contains_key(member));
        }
    }
    store(db, destination, result)
}
