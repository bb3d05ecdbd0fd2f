//! Store commands issued by the collection layer
//!
//! Every command the crate sends is a variant of [`Command`]. The in-process
//! store executes the enum directly; the TCP store encodes it as a RESP
//! array of bulk strings.

use std::fmt;

use crate::protocol::{format_score, RespFrame};

/// Score combination for multi-key sorted set commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregate {
    #[default]
    Sum,
    Min,
    Max,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }

    /// Combine two already-weighted scores
    pub fn combine(&self, a: f64, b: f64) -> f64 {
        let combined = match self {
            Aggregate::Sum => a + b,
            Aggregate::Min => a.min(b),
            Aggregate::Max => a.max(b),
        };
        // inf + -inf
        if combined.is_nan() {
            0.0
        } else {
            combined
        }
    }
}

/// One end of a score range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    Inclusive(f64),
    Exclusive(f64),
}

impl ScoreBound {
    /// `-inf`
    pub const MIN: ScoreBound = ScoreBound::Inclusive(f64::NEG_INFINITY);

    /// `+inf`
    pub const MAX: ScoreBound = ScoreBound::Inclusive(f64::INFINITY);

    /// True if `score` lies above this bound used as a minimum
    pub fn admits_from_below(&self, score: f64) -> bool {
        match *self {
            ScoreBound::Inclusive(min) => score >= min,
            ScoreBound::Exclusive(min) => score > min,
        }
    }

    /// True if `score` lies below this bound used as a maximum
    pub fn admits_from_above(&self, score: f64) -> bool {
        match *self {
            ScoreBound::Inclusive(max) => score <= max,
            ScoreBound::Exclusive(max) => score < max,
        }
    }

    /// Wire spelling: `1.5`, `(1.5`, `-inf`, `+inf`
    pub fn encode(&self) -> String {
        match *self {
            ScoreBound::Inclusive(score) => format_score(score),
            ScoreBound::Exclusive(score) => format!("({}", format_score(score)),
        }
    }
}

impl From<f64> for ScoreBound {
    fn from(score: f64) -> Self {
        ScoreBound::Inclusive(score)
    }
}

/// Destination, sources and options of ZUNIONSTORE / ZINTERSTORE
#[derive(Debug, Clone, PartialEq)]
pub struct ZStore {
    pub destination: String,
    pub keys: Vec<String>,
    pub weights: Option<Vec<f64>>,
    pub aggregate: Aggregate,
}

impl ZStore {
    pub fn new(destination: impl Into<String>, keys: Vec<String>) -> Self {
        ZStore {
            destination: destination.into(),
            keys,
            weights: None,
            aggregate: Aggregate::Sum,
        }
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    fn push_args(&self, args: &mut Vec<String>) {
        args.push(self.destination.clone());
        args.push(self.keys.len().to_string());
        args.extend(self.keys.iter().cloned());
        if let Some(weights) = &self.weights {
            args.push("WEIGHTS".to_string());
            args.extend(weights.iter().map(|w| format_score(*w)));
        }
        if self.aggregate != Aggregate::Sum {
            args.push("AGGREGATE".to_string());
            args.push(self.aggregate.as_str().to_string());
        }
    }
}

/// A single store command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Connection
    Ping,
    Auth { password: String },
    Select { db: usize },

    // Keys
    Del { keys: Vec<String> },
    Exists { key: String },
    Type { key: String },
    Rename { key: String, new_key: String },
    RenameNx { key: String, new_key: String },
    Expire { key: String, seconds: u64 },
    ExpireAt { key: String, timestamp: u64 },
    Ttl { key: String },
    Move { key: String, db: usize },
    Keys { pattern: String },

    // Strings
    Get { key: String },
    Set { key: String, value: String },
    Append { key: String, value: String },
    IncrBy { key: String, delta: i64 },
    DecrBy { key: String, delta: i64 },
    GetRange { key: String, start: i64, end: i64 },

    // Lists
    RPush { key: String, values: Vec<String> },
    LPush { key: String, values: Vec<String> },
    LRange { key: String, start: i64, stop: i64 },
    LLen { key: String },
    LIndex { key: String, index: i64 },
    LSet { key: String, index: i64, value: String },
    LRem { key: String, count: i64, value: String },
    LPop { key: String },
    RPop { key: String },

    // Hashes
    HSet { key: String, pairs: Vec<(String, String)> },
    HGet { key: String, field: String },
    HDel { key: String, fields: Vec<String> },
    HLen { key: String },
    HExists { key: String, field: String },
    HKeys { key: String },
    HVals { key: String },
    HGetAll { key: String },

    // Sets
    SAdd { key: String, members: Vec<String> },
    SRem { key: String, members: Vec<String> },
    SIsMember { key: String, member: String },
    SCard { key: String },
    SMembers { key: String },
    SPop { key: String },
    SRandMember { key: String },
    SUnion { keys: Vec<String> },
    SInter { keys: Vec<String> },
    SDiff { keys: Vec<String> },
    SUnionStore { destination: String, keys: Vec<String> },
    SInterStore { destination: String, keys: Vec<String> },
    SDiffStore { destination: String, keys: Vec<String> },

    // Sorted sets
    ZAdd { key: String, entries: Vec<(f64, String)> },
    ZRem { key: String, members: Vec<String> },
    ZScore { key: String, member: String },
    ZRank { key: String, member: String },
    ZRevRank { key: String, member: String },
    ZCard { key: String },
    ZRange { key: String, start: i64, stop: i64, with_scores: bool },
    ZRevRange { key: String, start: i64, stop: i64, with_scores: bool },
    /// `limit` is `LIMIT offset count`
    ZRangeByScore { key: String, min: ScoreBound, max: ScoreBound, with_scores: bool, limit: Option<(usize, usize)> },
    ZRevRangeByScore { key: String, max: ScoreBound, min: ScoreBound, with_scores: bool, limit: Option<(usize, usize)> },
    ZRemRangeByRank { key: String, start: i64, stop: i64 },
    ZRemRangeByScore { key: String, min: ScoreBound, max: ScoreBound },
    ZIncrBy { key: String, increment: f64, member: String },
    ZUnionStore(ZStore),
    ZInterStore(ZStore),
    ZDiffStore { destination: String, keys: Vec<String> },
}

impl Command {
    /// Command name as sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Auth { .. } => "AUTH",
            Command::Select { .. } => "SELECT",
            Command::Del { .. } => "DEL",
            Command::Exists { .. } => "EXISTS",
            Command::Type { .. } => "TYPE",
            Command::Rename { .. } => "RENAME",
            Command::RenameNx { .. } => "RENAMENX",
            Command::Expire { .. } => "EXPIRE",
            Command::ExpireAt { .. } => "EXPIREAT",
            Command::Ttl { .. } => "TTL",
            Command::Move { .. } => "MOVE",
            Command::Keys { .. } => "KEYS",
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Append { .. } => "APPEND",
            Command::IncrBy { .. } => "INCRBY",
            Command::DecrBy { .. } => "DECRBY",
            Command::GetRange { .. } => "GETRANGE",
            Command::RPush { .. } => "RPUSH",
            Command::LPush { .. } => "LPUSH",
            Command::LRange { .. } => "LRANGE",
            Command::LLen { .. } => "LLEN",
            Command::LIndex { .. } => "LINDEX",
            Command::LSet { .. } => "LSET",
            Command::LRem { .. } => "LREM",
            Command::LPop { .. } => "LPOP",
            Command::RPop { .. } => "RPOP",
            Command::HSet { .. } => "HSET",
            Command::HGet { .. } => "HGET",
            Command::HDel { .. } => "HDEL",
            Command::HLen { .. } => "HLEN",
            Command::HExists { .. } => "HEXISTS",
            Command::HKeys { .. } => "HKEYS",
            Command::HVals { .. } => "HVALS",
            Command::HGetAll { .. } => "HGETALL",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SCard { .. } => "SCARD",
            Command::SMembers { .. } => "SMEMBERS",
            Command::SPop { .. } => "SPOP",
            Command::SRandMember { .. } => "SRANDMEMBER",
            Command::SUnion { .. } => "SUNION",
            Command::SInter { .. } => "SINTER",
            Command::SDiff { .. } => "SDIFF",
            Command::SUnionStore { .. } => "SUNIONSTORE",
            Command::SInterStore { .. } => "SINTERSTORE",
            Command::SDiffStore { .. } => "SDIFFSTORE",
            Command::ZAdd { .. } => "ZADD",
            Command::ZRem { .. } => "ZREM",
            Command::ZScore { .. } => "ZSCORE",
            Command::ZRank { .. } => "ZRANK",
            Command::ZRevRank { .. } => "ZREVRANK",
            Command::ZCard { .. } => "ZCARD",
            Command::ZRange { .. } => "ZRANGE",
            Command::ZRevRange { .. } => "ZREVRANGE",
            Command::ZRangeByScore { .. } => "ZRANGEBYSCORE",
            Command::ZRevRangeByScore { .. } => "ZREVRANGEBYSCORE",
            Command::ZRemRangeByRank { .. } => "ZREMRANGEBYRANK",
            Command::ZRemRangeByScore { .. } => "ZREMRANGEBYSCORE",
            Command::ZIncrBy { .. } => "ZINCRBY",
            Command::ZUnionStore(_) => "ZUNIONSTORE",
            Command::ZInterStore(_) => "ZINTERSTORE",
            Command::ZDiffStore { .. } => "ZDIFFSTORE",
        }
    }

    /// Full argument vector, command name first
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.name().to_string()];

        match self {
            Command::Ping => {}
            Command::Auth { password } => args.push(password.clone()),
            Command::Select { db } => args.push(db.to_string()),

            Command::Del { keys }
            | Command::SUnion { keys }
            | Command::SInter { keys }
            | Command::SDiff { keys } => args.extend(keys.iter().cloned()),

            Command::Exists { key }
            | Command::Type { key }
            | Command::Ttl { key }
            | Command::Get { key }
            | Command::LLen { key }
            | Command::LPop { key }
            | Command::RPop { key }
            | Command::HLen { key }
            | Command::HKeys { key }
            | Command::HVals { key }
            | Command::HGetAll { key }
            | Command::SCard { key }
            | Command::SMembers { key }
            | Command::SPop { key }
            | Command::SRandMember { key }
            | Command::ZCard { key } => args.push(key.clone()),

            Command::Rename { key, new_key } | Command::RenameNx { key, new_key } => {
                args.push(key.clone());
                args.push(new_key.clone());
            }
            Command::Expire { key, seconds } => {
                args.push(key.clone());
                args.push(seconds.to_string());
            }
            Command::ExpireAt { key, timestamp } => {
                args.push(key.clone());
                args.push(timestamp.to_string());
            }
            Command::Move { key, db } => {
                args.push(key.clone());
                args.push(db.to_string());
            }
            Command::Keys { pattern } => args.push(pattern.clone()),

            Command::Set { key, value } | Command::Append { key, value } => {
                args.push(key.clone());
                args.push(value.clone());
            }
            Command::IncrBy { key, delta } | Command::DecrBy { key, delta } => {
                args.push(key.clone());
                args.push(delta.to_string());
            }
            Command::GetRange { key, start, end } => {
                args.push(key.clone());
                args.push(start.to_string());
                args.push(end.to_string());
            }

            Command::RPush { key, values } | Command::LPush { key, values } => {
                args.push(key.clone());
                args.extend(values.iter().cloned());
            }
            Command::LRange { key, start, stop }
            | Command::ZRemRangeByRank { key, start, stop } => {
                args.push(key.clone());
                args.push(start.to_string());
                args.push(stop.to_string());
            }
            Command::LIndex { key, index } => {
                args.push(key.clone());
                args.push(index.to_string());
            }
            Command::LSet { key, index, value } => {
                args.push(key.clone());
                args.push(index.to_string());
                args.push(value.clone());
            }
            Command::LRem { key, count, value } => {
                args.push(key.clone());
                args.push(count.to_string());
                args.push(value.clone());
            }

            Command::HSet { key, pairs } => {
                args.push(key.clone());
                for (field, value) in pairs {
                    args.push(field.clone());
                    args.push(value.clone());
                }
            }
            Command::HGet { key, field } | Command::HExists { key, field } => {
                args.push(key.clone());
                args.push(field.clone());
            }
            Command::HDel { key, fields } => {
                args.push(key.clone());
                args.extend(fields.iter().cloned());
            }

            Command::SAdd { key, members }
            | Command::SRem { key, members }
            | Command::ZRem { key, members } => {
                args.push(key.clone());
                args.extend(members.iter().cloned());
            }
            Command::SIsMember { key, member }
            | Command::ZScore { key, member }
            | Command::ZRank { key, member }
            | Command::ZRevRank { key, member } => {
                args.push(key.clone());
                args.push(member.clone());
            }
            Command::SUnionStore { destination, keys }
            | Command::SInterStore { destination, keys }
            | Command::SDiffStore { destination, keys } => {
                args.push(destination.clone());
                args.extend(keys.iter().cloned());
            }

            Command::ZAdd { key, entries } => {
                args.push(key.clone());
                for (score, member) in entries {
                    args.push(format_score(*score));
                    args.push(member.clone());
                }
            }
            Command::ZRange { key, start, stop, with_scores }
            | Command::ZRevRange { key, start, stop, with_scores } => {
                args.push(key.clone());
                args.push(start.to_string());
                args.push(stop.to_string());
                if *with_scores {
                    args.push("WITHSCORES".to_string());
                }
            }
            Command::ZRangeByScore { key, min: from, max: to, with_scores, limit }
            | Command::ZRevRangeByScore { key, max: from, min: to, with_scores, limit } => {
                args.push(key.clone());
                args.push(from.encode());
                args.push(to.encode());
                if *with_scores {
                    args.push("WITHSCORES".to_string());
                }
                if let Some((offset, count)) = limit {
                    args.push("LIMIT".to_string());
                    args.push(offset.to_string());
                    args.push(count.to_string());
                }
            }
            Command::ZRemRangeByScore { key, min, max } => {
                args.push(key.clone());
                args.push(min.encode());
                args.push(max.encode());
            }
            Command::ZIncrBy { key, increment, member } => {
                args.push(key.clone());
                args.push(format_score(*increment));
                args.push(member.clone());
            }
            Command::ZUnionStore(store) | Command::ZInterStore(store) => store.push_args(&mut args),
            Command::ZDiffStore { destination, keys } => {
                args.push(destination.clone());
                args.push(keys.len().to_string());
                args.extend(keys.iter().cloned());
            }
        }

        args
    }

    /// Encode as a RESP array of bulk strings
    pub fn to_frame(&self) -> RespFrame {
        RespFrame::command(self.args())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Never echo credentials
            Command::Auth { .. } => write!(f, "AUTH ****"),
            _ => write!(f, "{}", self.args().join(" ")),
        }
    }
}
