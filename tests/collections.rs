//! Handles, key lifecycle and concurrent use

use std::collections::HashSet;
use std::thread;

use ferrous_collections::{Client, Config, Counter, Dict, Error, Keyspace, List, Set, SetOperand, ZSet};

#[test]
fn test_handles_never_cache() {
    let client = Client::memory();
    let one: Set<i64> = client.set("shared").unwrap();
    let two: Set<i64> = client.set("shared").unwrap();

    one.add(&1).unwrap();
    assert!(two.contains(&1).unwrap());
    two.clear().unwrap();
    assert!(one.is_empty().unwrap());
}

#[test]
fn test_initial_contents_extend_existing_key() {
    let client = Client::memory();
    Set::with_members(&client, "s", [1i64]).unwrap();
    let again = Set::with_members(&client, "s", [2i64]).unwrap();
    assert_eq!(again.members().unwrap(), HashSet::from([1, 2]));
}

#[test]
fn test_rename_keeps_algebra_working() {
    let client = Client::memory();
    let mut a = Set::with_members(&client, "a", [1i64, 2]).unwrap();
    let b = Set::with_members(&client, "b", [2i64]).unwrap();

    a.rename("renamed").unwrap();
    assert_eq!(a.intersection([&b]).unwrap(), HashSet::from([2]));
    assert!(matches!(a.rename("__ferrous_tmp__:sneaky"), Err(Error::Type(_))));
}

#[test]
fn test_type_of_each_handle() {
    let client = Client::memory();
    let set = Set::with_members(&client, "set", [1i64]).unwrap();
    let zset = ZSet::with_entries(&client, "zset", [(1i64, 1.0)]).unwrap();
    let list = List::with_items(&client, "list", [1i64]).unwrap();
    let dict = Dict::with_entries(&client, "dict", [("f", 1i64)]).unwrap();
    let counter = Counter::with_value(&client, "counter", 1).unwrap();

    assert_eq!(set.redis_type().unwrap(), "set");
    assert_eq!(zset.redis_type().unwrap(), "zset");
    assert_eq!(list.redis_type().unwrap(), "list");
    assert_eq!(dict.redis_type().unwrap(), "hash");
    assert_eq!(counter.redis_type().unwrap(), "string");
}

#[test]
fn test_wrong_type_access_is_store_error() {
    let client = Client::memory();
    List::with_items(&client, "k", [1i64]).unwrap();
    let set: Set<i64> = client.set("k").unwrap();
    assert!(matches!(set.add(&1), Err(Error::Store(msg)) if msg.starts_with("WRONGTYPE")));
}

#[test]
fn test_stored_value_of_wrong_element_type() {
    let client = Client::memory();
    Set::with_members(&client, "s", ["not a number".to_string()]).unwrap();
    let typed: Set<i64> = client.set("s").unwrap();
    assert!(matches!(typed.members(), Err(Error::Type(_))));
}

#[test]
fn test_concurrent_algebra_on_one_collection() {
    let client = Client::memory();
    let base = Set::with_members(&client, "base", 0i64..50).unwrap();
    let other = Set::with_members(&client, "other", 25i64..75).unwrap();

    let workers: Vec<_> = (0..8i64)
        .map(|n| {
            let base = base.clone();
            let other = other.clone();
            thread::spawn(move || {
                let local: Vec<i64> = vec![n, 100 + n];
                for _ in 0..20 {
                    let result = base
                        .union(vec![SetOperand::from(&other), SetOperand::from(&local)])
                        .unwrap();
                    assert_eq!(result.len(), 76);
                    assert!(result.contains(&(100 + n)));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(client.temp_key_count().unwrap(), 0);
}

#[test]
fn test_config_from_url() {
    let config = Config::from_url("redis://:secret@example.com:6380/2").unwrap();
    assert_eq!(config.host, "example.com");
    assert_eq!(config.port, 6380);
    assert_eq!(config.db, 2);
    assert_eq!(config.password.as_deref(), Some("secret"));
}

#[test]
fn test_connect_failure_is_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = Config { port, ..Config::default() };
    assert!(matches!(Client::connect(config), Err(Error::Connection(_))));
}
