//! Key lifecycle commands: DEL, EXISTS, TYPE, RENAME, RENAMENX, EXPIRE,
//! EXPIREAT, TTL, MOVE, KEYS

use std::time::{Duration, UNIX_EPOCH};

use super::{bulk_array, CommandResult};
use crate::protocol::RespFrame;
use crate::storage::{CommandError, Database, DatabaseIndex};

pub fn del(db: &mut Database, keys: &[String]) -> CommandResult {
    let removed = keys.iter().filter(|key| db.remove(key).is_some()).count();
    Ok(RespFrame::Integer(removed as i64))
}

pub fn exists(db: &mut Database, key: &str) -> CommandResult {
    Ok(RespFrame::from(db.contains(key)))
}

pub fn key_type(db: &mut Database, key: &str) -> CommandResult {
    let name = db
        .get(key)
        .map(|stored| stored.value.value_type().name())
        .unwrap_or("none");
    Ok(RespFrame::simple_string(name))
}

pub fn rename(db: &mut Database, key: &str, new_key: &str) -> CommandResult {
    let stored = db.remove(key).ok_or(CommandError::NoSuchKey)?;
    // Overwrites the destination, expiration travels with the value
    db.insert_stored(new_key, stored);
    Ok(RespFrame::ok())
}

pub fn renamenx(db: &mut Database, key: &str, new_key: &str) -> CommandResult {
    if !db.contains(key) {
        return Err(CommandError::NoSuchKey);
    }
    if db.contains(new_key) {
        return Ok(RespFrame::Integer(0));
    }
    rename(db, key, new_key)?;
    Ok(RespFrame::Integer(1))
}

pub fn expire(db: &mut Database, key: &str, seconds: u64) -> CommandResult {
    match db.get_mut(key) {
        Some(stored) => {
            stored.set_expiration(Duration::from_secs(seconds));
            Ok(RespFrame::Integer(1))
        }
        None => Ok(RespFrame::Integer(0)),
    }
}

pub fn expireat(db: &mut Database, key: &str, timestamp: u64) -> CommandResult {
    match db.get_mut(key) {
        Some(stored) => {
            stored.expires_at = Some(UNIX_EPOCH + Duration::from_secs(timestamp));
            Ok(RespFrame::Integer(1))
        }
        None => Ok(RespFrame::Integer(0)),
    }
}

/// -2 when the key does not exist, -1 when it has no expiration
pub fn ttl(db: &mut Database, key: &str) -> CommandResult {
    let reply = match db.get(key) {
        None => -2,
        Some(stored) => match stored.ttl() {
            None => -1,
            Some(remaining) => ((remaining.as_millis() + 500) / 1000) as i64,
        },
    };
    Ok(RespFrame::Integer(reply))
}

pub fn move_key(
    databases: &mut [Database],
    current: DatabaseIndex,
    key: &str,
    target: DatabaseIndex,
) -> CommandResult {
    if target >= databases.len() || current >= databases.len() {
        return Err(CommandError::InvalidDatabase);
    }
    if target == current {
        return Err(CommandError::SameObject);
    }
    if !databases[current].contains(key) || databases[target].contains(key) {
        return Ok(RespFrame::Integer(0));
    }

    match databases[current].remove(key) {
        Some(stored) => {
            databases[target].insert_stored(key, stored);
            Ok(RespFrame::Integer(1))
        }
        None => Ok(RespFrame::Integer(0)),
    }
}

pub fn keys(db: &mut Database, pattern: &str) -> CommandResult {
    let mut matching: Vec<String> = db
        .keys()
        .into_iter()
        .filter(|key| pattern_matches(pattern, key))
        .collect();
    matching.sort();
    Ok(bulk_array(matching))
}

/// Glob-style pattern matching: `*`, `?`, `[abc]`, `[^a-z]`, `\x`
pub fn pattern_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut p = 0;
    let mut t = 0;
    let mut star: Option<usize> = None;
    let mut star_match = 0;

    while t < text.len() {
        if p < pattern.len() {
            match pattern[p] {
                '?' => {
                    p += 1;
                    t += 1;
                    continue;
                }
                '*' => {
                    star = Some(p);
                    star_match = t;
                    p += 1;
                    continue;
                }
                '[' => {
                    if let Some(end) = pattern[p..].iter().position(|&c| c == ']') {
                        let class_end = p + end;
                        let negate = p + 1 < class_end && pattern[p + 1] == '^';
                        let mut i = if negate { p + 2 } else { p + 1 };

                        let mut matched = false;
                        while i < class_end {
                            if i + 2 < class_end && pattern[i + 1] == '-' {
                                if text[t] >= pattern[i] && text[t] <= pattern[i + 2] {
                                    matched = true;
                                    break;
                                }
                                i += 3;
                            } else {
                                if text[t] == pattern[i] {
                                    matched = true;
                                    break;
                                }
                                i += 1;
                            }
                        }

                        if matched != negate {
                            p = class_end + 1;
                            t += 1;
                            continue;
                        }
                    }
                }
                '\\' if p + 1 < pattern.len() => {
                    if pattern[p + 1] == text[t] {
                        p += 2;
                        t += 1;
                        continue;
                    }
                }
                c => {
                    if c == text[t] {
                        p += 1;
                        t += 1;
                        continue;
                    }
                }
            }
        }

        // Backtrack to the last star
        match star {
            Some(star_pos) => {
                p = star_pos + 1;
                star_match += 1;
                t = star_match;
            }
            None => return false,
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Value;
    use std::time::SystemTime;

    fn unix_now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    fn db_with(keys: &[&str]) -> Database {
        let mut db = Database::new();
        for key in keys {
            db.insert(key, Value::String("v".into()));
        }
        db
    }

    #[test]
    fn test_pattern_matching() {
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("__tmp__*", "__tmp__:abc:0"));
        assert!(!pattern_matches("__tmp__*", "user:1"));
        assert!(pattern_matches("h?llo", "hello"));
        assert!(pattern_matches("h[ae]llo", "hallo"));
        assert!(!pattern_matches("h[^e]llo", "hello"));
        assert!(pattern_matches("h[a-c]llo", "hbllo"));
        assert!(pattern_matches("a\\*b", "a*b"));
    }

    #[test]
    fn test_rename() {
        let mut db = db_with(&["a", "b"]);
        assert_eq!(renamenx(&mut db, "a", "b").unwrap(), RespFrame::Integer(0));
        assert_eq!(rename(&mut db, "a", "b").unwrap(), RespFrame::ok());
        assert!(!db.contains("a"));
        assert_eq!(rename(&mut db, "a", "c"), Err(CommandError::NoSuchKey));
    }

    #[test]
    fn test_ttl_and_expire() {
        let mut db = db_with(&["k"]);
        assert_eq!(ttl(&mut db, "k").unwrap(), RespFrame::Integer(-1));
        assert_eq!(ttl(&mut db, "missing").unwrap(), RespFrame::Integer(-2));

        assert_eq!(expire(&mut db, "k", 100).unwrap(), RespFrame::Integer(1));
        assert_eq!(ttl(&mut db, "k").unwrap(), RespFrame::Integer(100));

        assert_eq!(expireat(&mut db, "k", unix_now() - 10).unwrap(), RespFrame::Integer(1));
        assert!(!db.contains("k"));
    }

    #[test]
    fn test_move_between_databases() {
        let mut databases = vec![db_with(&["k"]), Database::new()];
        assert_eq!(move_key(&mut databases, 0, "k", 1).unwrap(), RespFrame::Integer(1));
        assert!(databases[1].contains("k"));
        assert_eq!(move_key(&mut databases, 0, "k", 1).unwrap(), RespFrame::Integer(0));
        assert_eq!(move_key(&mut databases, 1, "k", 1), Err(CommandError::SameObject));
        assert_eq!(move_key(&mut databases, 1, "k", 7), Err(CommandError::InvalidDatabase));
    }

    #[test]
    fn test_keys_sorted() {
        let mut db = db_with(&["b", "a", "c"]);
        assert_eq!(keys(&mut db, "*").unwrap(), bulk_array(["a", "b", "c"]));
        assert_eq!(del(&mut db, &["a".into(), "z".into()]).unwrap(), RespFrame::Integer(1));
    }
}
