//! Set algebra against the in-process store
//!
//! Every test checks that no temporary key is left behind.

use std::collections::HashSet;
use std::sync::Arc;

use ferrous_collections::{Client, Error, Keyspace, MemoryStore, Set, SetOperand, Store};

fn set_of(values: &[i64]) -> HashSet<i64> {
    values.iter().copied().collect()
}

fn assert_clean(client: &Client) {
    assert_eq!(client.temp_key_count().unwrap(), 0, "temporary keys left behind");
}

#[test]
fn test_difference_scenario() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64, 2, 3]).unwrap();
    let b = Set::with_members(&client, "b", [1i64, 2]).unwrap();

    assert_eq!(a.difference([&b]).unwrap(), set_of(&[3]));
    assert_eq!(a.difference([vec![1i64, 2]]).unwrap(), set_of(&[3]));
    assert_clean(&client);
}

#[test]
fn test_symmetric_difference_scenario() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64, 2]).unwrap();
    let b = Set::with_members(&client, "b", [2i64, 3]).unwrap();

    assert_eq!(a.symmetric_difference([&b]).unwrap(), set_of(&[1, 3]));
    assert_eq!(a.symmetric_difference([vec![2i64, 3]]).unwrap(), set_of(&[1, 3]));
    assert_clean(&client);
}

#[test]
fn test_idempotence() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64, 5, 9]).unwrap();
    let same = a.clone();

    assert_eq!(a.union([&same]).unwrap(), set_of(&[1, 5, 9]));
    assert_eq!(a.intersection([&same]).unwrap(), set_of(&[1, 5, 9]));
    assert!(a.difference([&same]).unwrap().is_empty());
    assert!(a.symmetric_difference([&same]).unwrap().is_empty());
    assert_clean(&client);
}

#[test]
fn test_many_mixed_operands() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64, 2, 3, 4]).unwrap();
    let b = Set::with_members(&client, "b", [2i64, 3, 4, 5]).unwrap();
    let c = Set::with_members(&client, "c", [3i64, 4, 6]).unwrap();
    let first = vec![4i64, 3, 7];
    let second: HashSet<i64> = set_of(&[3, 4, 8]);

    let operands = || {
        vec![
            SetOperand::from(&b),
            SetOperand::from(&first),
            SetOperand::from(&c),
            SetOperand::from(&second),
        ]
    };

    assert_eq!(a.union(operands()).unwrap(), set_of(&[1, 2, 3, 4, 5, 6, 7, 8]));
    assert_eq!(a.intersection(operands()).unwrap(), set_of(&[3, 4]));
    assert_eq!(a.difference(operands()).unwrap(), set_of(&[1]));
    assert_eq!(
        a.symmetric_difference(operands()).unwrap(),
        set_of(&[1, 2, 5, 6, 7, 8])
    );
    assert_clean(&client);
}

#[test]
fn test_local_groups_are_not_merged_for_intersection() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64, 2]).unwrap();
    let b = Set::with_members(&client, "b", [1i64, 2]).unwrap();

    // Merging the two groups first would wrongly keep both elements
    let result = a
        .intersection(vec![SetOperand::from(&b), SetOperand::from(vec![1i64]), SetOperand::from(vec![2i64])])
        .unwrap();
    assert!(result.is_empty());
    assert_clean(&client);
}

#[test]
fn test_update_variants_match_read_variants() {
    let client = Client::memory();
    let b = Set::with_members(&client, "b", [2i64, 3, 4]).unwrap();
    let local = vec![4i64, 5];

    let cases: Vec<(&str, HashSet<i64>)> = vec![
        ("union", set_of(&[1, 2, 3, 4, 5])),
        ("intersection", HashSet::new()),
        ("difference", set_of(&[1])),
        ("symmetric_difference", set_of(&[1, 2, 3, 4, 5])),
    ];

    for (name, expected) in cases {
        let a = Set::with_members(&client, format!("a-{}", name), [1i64, 2, 3]).unwrap();
        let operands = || vec![SetOperand::from(&b), SetOperand::from(&local)];

        let computed = match name {
            "union" => a.union(operands()),
            "intersection" => a.intersection(operands()),
            "difference" => a.difference(operands()),
            _ => a.symmetric_difference(operands()),
        }
        .unwrap();
        assert_eq!(computed, expected, "{}", name);

        match name {
            "union" => a.update(operands()),
            "intersection" => a.intersection_update(operands()),
            "difference" => a.difference_update(operands()),
            _ => a.symmetric_difference_update(operands()),
        }
        .unwrap();
        assert_eq!(a.members().unwrap(), expected, "{}_update", name);
        assert_eq!(b.members().unwrap(), set_of(&[2, 3, 4]));
        assert_clean(&client);
    }
}

#[test]
fn test_update_with_only_local_values() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64, 2, 3]).unwrap();

    a.update([vec![9i64]]).unwrap();
    assert_eq!(a.members().unwrap(), set_of(&[1, 2, 3, 9]));

    a.difference_update([vec![1i64, 9]]).unwrap();
    assert_eq!(a.members().unwrap(), set_of(&[2, 3]));

    a.intersection_update([vec![3i64, 4]]).unwrap();
    assert_eq!(a.members().unwrap(), set_of(&[3]));

    a.symmetric_difference_update([vec![3i64, 4]]).unwrap();
    assert_eq!(a.members().unwrap(), set_of(&[4]));
    assert_clean(&client);
}

#[test]
fn test_empty_operands_are_noops() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64]).unwrap();

    a.update(Vec::<SetOperand<'_, i64>>::new()).unwrap();
    a.update([Vec::<i64>::new()]).unwrap();
    a.difference_update([Vec::<i64>::new()]).unwrap();
    a.intersection_update(Vec::<SetOperand<'_, i64>>::new()).unwrap();
    assert_eq!(a.members().unwrap(), set_of(&[1]));

    a.intersection_update([Vec::<i64>::new()]).unwrap();
    assert!(a.members().unwrap().is_empty());
    assert!(!a.exists().unwrap());
    assert_clean(&client);
}

#[test]
fn test_disjoint_subset_superset() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64, 2]).unwrap();
    let b = Set::with_members(&client, "b", [1i64, 2, 3]).unwrap();
    let c = Set::with_members(&client, "c", [7i64]).unwrap();

    assert!(a.is_disjoint([&c]).unwrap());
    assert!(!a.is_disjoint([&b]).unwrap());
    assert!(a.is_disjoint(vec![SetOperand::from(&c), SetOperand::from(vec![5i64])]).unwrap());
    assert!(!a.is_disjoint(vec![SetOperand::from(&c), SetOperand::from(vec![2i64])]).unwrap());
    assert!(a.is_disjoint(Vec::<SetOperand<'_, i64>>::new()).unwrap());

    assert!(a.is_subset(&b).unwrap());
    assert!(!b.is_subset(&a).unwrap());
    assert!(a.is_subset(vec![1i64, 2, 8]).unwrap());
    assert!(!a.is_subset(vec![1i64]).unwrap());

    assert!(b.is_superset(&a).unwrap());
    assert!(b.is_superset(vec![3i64, 1]).unwrap());
    assert!(!b.is_superset(vec![4i64]).unwrap());
    assert!(b.is_superset(Vec::<i64>::new()).unwrap());
    assert_clean(&client);
}

#[test]
fn test_foreign_operand_is_refused_before_sending() {
    let store = MemoryStore::new();
    let here = Client::new(store.clone());
    let there = Client::new(store.select(1).unwrap());

    let a = Set::with_members(&here, "a", [1i64]).unwrap();
    let b = Set::with_members(&there, "b", [1i64]).unwrap();

    assert!(matches!(a.union([&b]), Err(Error::Type(_))));
    assert!(matches!(a.update(vec![SetOperand::from(&b), SetOperand::from(vec![2i64])]), Err(Error::Type(_))));
    assert_eq!(a.members().unwrap(), set_of(&[1]));
    assert_clean(&here);
}

#[test]
fn test_same_engine_other_client_is_accepted() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let one = Client::with_prefix(Arc::clone(&store), "__ferrous_tmp__").unwrap();
    let two = Client::with_prefix(store, "__ferrous_tmp__").unwrap();

    let a = Set::with_members(&one, "a", [1i64, 2]).unwrap();
    let b = Set::with_members(&two, "b", [2i64]).unwrap();
    assert_eq!(a.intersection([&b]).unwrap(), set_of(&[2]));
}

#[test]
fn test_store_error_fails_whole_operation() {
    let client = Client::memory();
    let a = Set::with_members(&client, "a", [1i64]).unwrap();
    let counter = client.counter("not-a-set").unwrap();
    counter.set(5).unwrap();
    let wrong: Set<i64> = client.set("not-a-set").unwrap();

    let err = a
        .intersection(vec![SetOperand::from(&wrong), SetOperand::from(vec![1i64])])
        .unwrap_err();
    assert!(matches!(err, Error::Store(ref msg) if msg.starts_with("WRONGTYPE")));
    assert_clean(&client);
}

#[test]
fn test_text_and_boolean_elements() {
    let client = Client::memory();
    let words = Set::with_members(&client, "words", ["", "a b", "ü"].map(String::from)).unwrap();
    let result = words.intersection([vec!["".to_string(), "x".to_string()]]).unwrap();
    assert_eq!(result, HashSet::from([String::new()]));

    let flags = Set::with_members(&client, "flags", [true]).unwrap();
    let other = Set::with_members(&client, "other-flags", [false]).unwrap();
    assert_eq!(flags.union([&other]).unwrap(), HashSet::from([true, false]));
    assert_clean(&client);
}

#[test]
fn test_reserved_prefix_keys_are_refused() {
    let client = Client::memory();
    assert!(matches!(client.set::<i64>("__ferrous_tmp__:x"), Err(Error::Type(_))));
    assert!(matches!(client.set::<i64>(""), Err(Error::Type(_))));
}
