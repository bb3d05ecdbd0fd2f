//! Algebraic properties of the set operations
//!
//! Each case runs the same operation with the operand remote-backed and
//! local, and compares against `HashSet` arithmetic.

use std::collections::HashSet;

use proptest::collection::hash_set;
use proptest::prelude::*;

use ferrous_collections::{Client, Element, Set, SetOperand};

fn small_set() -> impl Strategy<Value = HashSet<i64>> {
    hash_set(-20i64..20, 0..12)
}

fn setup(a: &HashSet<i64>, b: &HashSet<i64>) -> (Client, Set<i64>, Set<i64>) {
    let client = Client::memory();
    let sa = Set::with_members(&client, "a", a.iter().copied()).unwrap();
    let sb = Set::with_members(&client, "b", b.iter().copied()).unwrap();
    (client, sa, sb)
}

proptest! {
    #[test]
    fn prop_read_operations_match_hashset(a in small_set(), b in small_set()) {
        let (client, sa, sb) = setup(&a, &b);

        let union: HashSet<i64> = a.union(&b).copied().collect();
        let inter: HashSet<i64> = a.intersection(&b).copied().collect();
        let diff: HashSet<i64> = a.difference(&b).copied().collect();
        let sym: HashSet<i64> = a.symmetric_difference(&b).copied().collect();

        prop_assert_eq!(sa.union([&sb]).unwrap(), union.clone());
        prop_assert_eq!(sa.union([&b]).unwrap(), union);
        prop_assert_eq!(sa.intersection([&sb]).unwrap(), inter.clone());
        prop_assert_eq!(sa.intersection([&b]).unwrap(), inter);
        prop_assert_eq!(sa.difference([&sb]).unwrap(), diff.clone());
        prop_assert_eq!(sa.difference([&b]).unwrap(), diff);
        prop_assert_eq!(sa.symmetric_difference([&sb]).unwrap(), sym.clone());
        prop_assert_eq!(sa.symmetric_difference([&b]).unwrap(), sym);

        prop_assert_eq!(sa.is_disjoint([&sb]).unwrap(), a.is_disjoint(&b));
        prop_assert_eq!(sa.is_subset(&sb).unwrap(), a.is_subset(&b));
        prop_assert_eq!(sa.is_superset(&b).unwrap(), a.is_superset(&b));
        prop_assert_eq!(client.temp_key_count().unwrap(), 0);
    }

    #[test]
    fn prop_mixed_operands_match_hashset(a in small_set(), b in small_set(), c in small_set()) {
        let (client, sa, sb) = setup(&a, &b);
        let operands = || vec![SetOperand::from(&sb), SetOperand::from(&c)];

        let union: HashSet<i64> = a.iter().chain(&b).chain(&c).copied().collect();
        let inter: HashSet<i64> = a.iter().filter(|v| b.contains(v) && c.contains(v)).copied().collect();
        let diff: HashSet<i64> = a.iter().filter(|v| !b.contains(v) && !c.contains(v)).copied().collect();
        let sym: HashSet<i64> = union.difference(&inter).copied().collect();

        prop_assert_eq!(sa.union(operands()).unwrap(), union);
        prop_assert_eq!(sa.intersection(operands()).unwrap(), inter);
        prop_assert_eq!(sa.difference(operands()).unwrap(), diff);
        prop_assert_eq!(sa.symmetric_difference(operands()).unwrap(), sym);
        prop_assert_eq!(client.temp_key_count().unwrap(), 0);
    }

    #[test]
    fn prop_updates_match_reads(a in small_set(), b in small_set(), remote in any::<bool>()) {
        let (client, _, sb) = setup(&a, &b);
        let operand = || {
            if remote {
                vec![SetOperand::from(&sb)]
            } else {
                vec![SetOperand::from(&b)]
            }
        };

        for (n, name) in ["union", "intersection", "difference", "symmetric_difference"].iter().enumerate() {
            let target = Set::with_members(&client, format!("target-{}", n), a.iter().copied()).unwrap();
            let expected = match *name {
                "union" => target.union(operand()),
                "intersection" => target.intersection(operand()),
                "difference" => target.difference(operand()),
                _ => target.symmetric_difference(operand()),
            }
            .unwrap();

            match *name {
                "union" => target.update(operand()),
                "intersection" => target.intersection_update(operand()),
                "difference" => target.difference_update(operand()),
                _ => target.symmetric_difference_update(operand()),
            }
            .unwrap();

            prop_assert_eq!(target.members().unwrap(), expected);
            prop_assert_eq!(client.temp_key_count().unwrap(), 0);
        }
    }

    #[test]
    fn prop_idempotence(a in small_set()) {
        let (client, sa, _) = setup(&a, &HashSet::new());
        let same = sa.clone();

        prop_assert_eq!(sa.union([&same]).unwrap(), a.clone());
        prop_assert_eq!(sa.intersection([&same]).unwrap(), a);
        prop_assert!(sa.difference([&same]).unwrap().is_empty());
        prop_assert_eq!(client.temp_key_count().unwrap(), 0);
    }

    #[test]
    fn prop_codec_round_trip(n in any::<i64>(), b in any::<bool>(), s in ".*") {
        prop_assert_eq!(i64::decode(&n.encode()).unwrap(), n);
        prop_assert_eq!(bool::decode(&b.encode()).unwrap(), b);
        prop_assert_eq!(String::decode(&s.encode()).unwrap(), s);
    }
}
