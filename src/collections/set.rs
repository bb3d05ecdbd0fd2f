//! Unordered set of unique elements stored under one key
//!
//! Multi-operand algebra runs on the server. Local operands are staged
//! into temporary keys first, and the staging, the combining command and
//! the cleanup travel in a single atomic batch.

use std::collections::HashSet;
use std::marker::PhantomData;

use super::keyspace::{Binding, Keyspace};
use crate::algebra::{self, materialize, stage_each, stage_merged, Batch, Classified, Operand};
use crate::client::Client;
use crate::codec::Element;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::extract_array;

/// Operand accepted by the [`Set`] algebra
pub type SetOperand<'a, T> = Operand<'a, Set<T>, T>;

/// Handle to a set in the store
#[derive(Debug, Clone)]
pub struct Set<T> {
    binding: Binding,
    _element: PhantomData<fn() -> T>,
}

impl<'a, T> From<&'a Set<T>> for Operand<'a, Set<T>, T> {
    fn from(set: &'a Set<T>) -> Self {
        Operand::Remote(set)
    }
}

impl<T> Keyspace for Set<T> {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }
}

impl<T: Element> Set<T> {
    /// Bind to `key` without touching the store
    pub fn open(client: &Client, key: impl Into<String>) -> Result<Self> {
        Ok(Set {
            binding: Binding::new(client, key)?,
            _element: PhantomData,
        })
    }

    /// Bind to `key` and add `members` in one batch
    pub fn with_members(client: &Client, key: impl Into<String>, members: impl IntoIterator<Item = T>) -> Result<Self> {
        let set = Self::open(client, key)?;
        set.add_all(members)?;
        Ok(set)
    }

    fn client(&self) -> &Client {
        self.binding.client()
    }

    fn own_key(&self) -> String {
        self.binding.key().to_string()
    }

    /// `self` followed by `others`
    fn keys_with(&self, others: &[String]) -> Vec<String> {
        let mut keys = Vec::with_capacity(others.len() + 1);
        keys.push(self.own_key());
        keys.extend(others.iter().cloned());
        keys
    }

    fn classify<'a, I, O>(&self, operands: I) -> Result<Classified<T>>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        algebra::classify::<Set<T>, T, I, O>(self.client(), operands)
    }

    pub fn len(&self) -> Result<usize> {
        materialize::count(&self.binding.execute(Command::SCard { key: self.own_key() })?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, value: &T) -> Result<bool> {
        let command = Command::SIsMember {
            key: self.own_key(),
            member: value.encode(),
        };
        materialize::flag(&self.binding.execute(command)?)
    }

    pub fn members(&self) -> Result<HashSet<T>> {
        materialize::members(self.binding.execute(Command::SMembers { key: self.own_key() })?)
    }

    /// Add one element; true if it was not a member yet
    pub fn add(&self, value: &T) -> Result<bool> {
        Ok(self.add_all([value.clone()])? == 1)
    }

    /// Add several elements with one command; returns how many were new
    pub fn add_all(&self, values: impl IntoIterator<Item = T>) -> Result<usize> {
        let members: Vec<String> = values.into_iter().map(|value| value.encode()).collect();
        if members.is_empty() {
            return Ok(0);
        }
        materialize::count(&self.binding.execute(Command::SAdd { key: self.own_key(), members })?)
    }

    /// Remove `value` if present; true if it was a member
    pub fn discard(&self, value: &T) -> Result<bool> {
        let command = Command::SRem {
            key: self.own_key(),
            members: vec![value.encode()],
        };
        materialize::flag(&self.binding.execute(command)?)
    }

    /// Remove `value`, failing with [`Error::Key`] if it is not a member
    pub fn remove(&self, value: &T) -> Result<()> {
        if !self.discard(value)? {
            return Err(Error::Key(format!("{:?} is not a member of '{}'", value, self.binding.key())));
        }
        Ok(())
    }

    /// Remove and return a random element
    pub fn pop(&self) -> Result<T> {
        let reply = self.binding.execute(Command::SPop { key: self.own_key() })?;
        materialize::optional(&reply)?
            .ok_or_else(|| Error::Key(format!("pop from empty set '{}'", self.binding.key())))
    }

    pub fn random_member(&self) -> Result<Option<T>> {
        materialize::optional(&self.binding.execute(Command::SRandMember { key: self.own_key() })?)
    }

    pub fn clear(&self) -> Result<()> {
        self.binding.execute(Command::Del { keys: vec![self.own_key()] })?;
        Ok(())
    }

    /// Copy the contents to `key`, replacing whatever was there
    pub fn copy(&self, key: impl Into<String>) -> Result<Set<T>> {
        let copy = Set::open(self.client(), key)?;
        self.binding.execute(Command::SUnionStore {
            destination: copy.own_key(),
            keys: vec![self.own_key()],
        })?;
        Ok(copy)
    }

    /// Elements in `self` or in any operand
    pub fn union<'a, I, O>(&self, operands: I) -> Result<HashSet<T>>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if !ops.has_remote() {
            let mut result = self.members()?;
            result.extend(ops.local_groups.into_iter().flatten());
            return Ok(result);
        }

        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_merged(&mut batch, &ops.local_groups));
        let slot = batch.push(Command::SUnion { keys });
        materialize::members(batch.execute()?.take(slot)?)
    }

    /// Elements in `self` and in every operand
    pub fn intersection<'a, I, O>(&self, operands: I) -> Result<HashSet<T>>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if !ops.has_remote() {
            let mut result = self.members()?;
            for group in ops.local_groups {
                let group: HashSet<T> = group.into_iter().collect();
                result.retain(|value| group.contains(value));
            }
            return Ok(result);
        }

        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_each(&mut batch, &ops.local_groups));
        let slot = batch.push(Command::SInter { keys });
        materialize::members(batch.execute()?.take(slot)?)
    }

    /// Elements of `self` found in no operand
    pub fn difference<'a, I, O>(&self, operands: I) -> Result<HashSet<T>>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if !ops.has_remote() {
            let subtract = ops.merged_locals();
            let mut result = self.members()?;
            result.retain(|value| !subtract.contains(value));
            return Ok(result);
        }

        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_merged(&mut batch, &ops.local_groups));
        let slot = batch.push(Command::SDiff { keys });
        materialize::members(batch.execute()?.take(slot)?)
    }

    /// Elements of the union of `self` and the operands that are not in
    /// all of them. With one operand this is the usual symmetric
    /// difference.
    pub fn symmetric_difference<'a, I, O>(&self, operands: I) -> Result<HashSet<T>>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if ops.is_empty() {
            return Err(no_operands("symmetric_difference"));
        }
        if !ops.has_remote() {
            let mut all = vec![self.members()?];
            all.extend(ops.local_groups.into_iter().map(|group| group.into_iter().collect()));
            return Ok(fold_symmetric(all));
        }

        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_each(&mut batch, &ops.local_groups));
        let both = batch.temp_key();
        let either = batch.temp_key();
        batch.push(Command::SInterStore { destination: both.clone(), keys: keys.clone() });
        batch.push(Command::SUnionStore { destination: either.clone(), keys });
        let slot = batch.push(Command::SDiff { keys: vec![either, both] });
        materialize::members(batch.execute()?.take(slot)?)
    }

    /// Add the elements of every operand to `self`
    pub fn update<'a, I, O>(&self, operands: I) -> Result<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_merged(&mut batch, &ops.local_groups));
        if keys.len() == 1 {
            return Ok(());
        }
        batch.push(Command::SUnionStore { destination: self.own_key(), keys });
        batch.execute().map(drop)
    }

    /// Keep only the elements found in every operand
    pub fn intersection_update<'a, I, O>(&self, operands: I) -> Result<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if ops.is_empty() {
            return Ok(());
        }
        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_each(&mut batch, &ops.local_groups));
        batch.push(Command::SInterStore { destination: self.own_key(), keys });
        batch.execute().map(drop)
    }

    /// Remove the elements found in any operand
    pub fn difference_update<'a, I, O>(&self, operands: I) -> Result<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_merged(&mut batch, &ops.local_groups));
        if keys.len() == 1 {
            return Ok(());
        }
        batch.push(Command::SDiffStore { destination: self.own_key(), keys });
        batch.execute().map(drop)
    }

    /// Replace `self` with [`Set::symmetric_difference`]
    pub fn symmetric_difference_update<'a, I, O>(&self, operands: I) -> Result<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if ops.is_empty() {
            return Err(no_operands("symmetric_difference_update"));
        }
        let mut batch = Batch::new(self.client());
        let mut keys = self.keys_with(&ops.remote_keys);
        keys.extend(stage_each(&mut batch, &ops.local_groups));
        let both = batch.temp_key();
        let either = batch.temp_key();
        batch.push(Command::SInterStore { destination: both.clone(), keys: keys.clone() });
        batch.push(Command::SUnionStore { destination: either.clone(), keys });
        batch.push(Command::SDiffStore {
            destination: self.own_key(),
            keys: vec![either, both],
        });
        batch.execute().map(drop)
    }

    /// True if `self` shares no element with any operand
    pub fn is_disjoint<'a, I, O>(&self, operands: I) -> Result<bool>
    where
        I: IntoIterator<Item = O>,
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        let locals = ops.merged_locals();

        let mut batch = Batch::new(self.client());
        let overlaps: Vec<usize> = ops
            .remote_keys
            .iter()
            .map(|other| batch.push(Command::SInter { keys: vec![self.own_key(), other.clone()] }))
            .collect();
        let own = (!locals.is_empty()).then(|| batch.push(Command::SMembers { key: self.own_key() }));
        if batch.is_empty() {
            return Ok(true);
        }

        let mut replies = batch.execute()?;
        for slot in overlaps {
            if !extract_array(replies.take(slot)?)?.is_empty() {
                return Ok(false);
            }
        }
        match own {
            Some(slot) => {
                let members: HashSet<T> = materialize::members(replies.take(slot)?)?;
                Ok(members.is_disjoint(&locals))
            }
            None => Ok(true),
        }
    }

    /// True if every element of `self` is in `other`
    pub fn is_subset<'a, O>(&self, other: O) -> Result<bool>
    where
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify([other])?;
        match ops.remote_keys.first() {
            Some(other) => {
                let keys = vec![self.own_key(), other.clone()];
                self.diff_is_empty(keys)
            }
            None => {
                let other = ops.merged_locals();
                Ok(self.members()?.is_subset(&other))
            }
        }
    }

    /// True if every element of `other` is in `self`
    pub fn is_superset<'a, O>(&self, other: O) -> Result<bool>
    where
        O: Into<SetOperand<'a, T>>,
    {
        let ops = self.classify([other])?;
        if let Some(other) = ops.remote_keys.first() {
            let keys = vec![other.clone(), self.own_key()];
            return self.diff_is_empty(keys);
        }

        let mut batch = Batch::new(self.client());
        let staged = match stage_merged(&mut batch, &ops.local_groups) {
            Some(staged) => staged,
            None => return Ok(true),
        };
        let slot = batch.push(Command::SDiff { keys: vec![staged, self.own_key()] });
        Ok(extract_array(batch.execute()?.take(slot)?)?.is_empty())
    }

    fn diff_is_empty(&self, keys: Vec<String>) -> Result<bool> {
        let reply = self.binding.execute(Command::SDiff { keys })?;
        Ok(extract_array(reply)?.is_empty())
    }
}

/// Union of `sets` minus their intersection
fn fold_symmetric<T: Element>(sets: Vec<HashSet<T>>) -> HashSet<T> {
    let union: HashSet<T> = sets.iter().flatten().cloned().collect();
    union
        .into_iter()
        .filter(|value| !sets.iter().all(|set| set.contains(value)))
        .collect()
}

fn no_operands(operation: &str) -> Error {
    Error::Value(format!("{} needs at least one operand", operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(values: &[i64]) -> HashSet<i64> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_basic_membership() {
        let client = Client::memory();
        let set = Set::with_members(&client, "s", [1i64, 2, 3]).unwrap();

        assert_eq!(set.len().unwrap(), 3);
        assert!(set.contains(&2).unwrap());
        assert!(!set.add(&2).unwrap());
        assert!(set.add(&4).unwrap());
        assert!(set.discard(&4).unwrap());
        assert!(!set.discard(&4).unwrap());
        assert_eq!(set.members().unwrap(), set_of(&[1, 2, 3]));
    }

    #[test]
    fn test_remove_absent_is_key_error() {
        let client = Client::memory();
        let set = Set::with_members(&client, "s", [1i64, 2]).unwrap();

        assert!(matches!(set.remove(&9), Err(Error::Key(_))));
        assert_eq!(set.members().unwrap(), set_of(&[1, 2]));
        set.remove(&1).unwrap();
        assert_eq!(set.members().unwrap(), set_of(&[2]));
    }

    #[test]
    fn test_pop_until_empty() {
        let client = Client::memory();
        let set = Set::with_members(&client, "s", [true, false]).unwrap();

        let mut popped = HashSet::new();
        popped.insert(set.pop().unwrap());
        popped.insert(set.pop().unwrap());
        assert_eq!(popped, HashSet::from([true, false]));
        assert!(matches!(set.pop(), Err(Error::Key(_))));
        assert_eq!(set.random_member().unwrap(), None);
    }

    #[test]
    fn test_copy_and_clear() {
        let client = Client::memory();
        let set = Set::with_members(&client, "s", ["a".to_string()]).unwrap();
        let copy = set.copy("t").unwrap();
        set.clear().unwrap();

        assert!(set.is_empty().unwrap());
        assert_eq!(copy.members().unwrap(), HashSet::from(["a".to_string()]));
    }

    #[test]
    fn test_local_only_algebra() {
        let client = Client::memory();
        let set = Set::with_members(&client, "s", [1i64, 2, 3]).unwrap();

        assert_eq!(set.union([vec![3i64, 4]]).unwrap(), set_of(&[1, 2, 3, 4]));
        assert_eq!(set.intersection([vec![2i64, 3, 9]]).unwrap(), set_of(&[2, 3]));
        assert_eq!(set.difference([vec![1i64, 2]]).unwrap(), set_of(&[3]));
        assert_eq!(set.symmetric_difference([vec![3i64, 4]]).unwrap(), set_of(&[1, 2, 4]));
        assert_eq!(client.temp_key_count().unwrap(), 0);
    }

    #[test]
    fn test_mixed_operands() {
        let client = Client::memory();
        let a = Set::with_members(&client, "a", [1i64, 2, 3]).unwrap();
        let b = Set::with_members(&client, "b", [2i64, 3, 4]).unwrap();
        let local = vec![3i64, 5];

        let union = a.union(vec![SetOperand::from(&b), SetOperand::from(&local)]).unwrap();
        assert_eq!(union, set_of(&[1, 2, 3, 4, 5]));

        let inter = a.intersection(vec![SetOperand::from(&b), SetOperand::from(&local)]).unwrap();
        assert_eq!(inter, set_of(&[3]));

        let diff = a.difference(vec![SetOperand::from(&b), SetOperand::from(&local)]).unwrap();
        assert_eq!(diff, set_of(&[1]));

        let sym = a.symmetric_difference([&b]).unwrap();
        assert_eq!(sym, set_of(&[1, 4]));
        assert_eq!(client.temp_key_count().unwrap(), 0);
    }

    #[test]
    fn test_empty_local_group_in_intersection() {
        let client = Client::memory();
        let a = Set::with_members(&client, "a", [1i64]).unwrap();
        let b = Set::with_members(&client, "b", [1i64]).unwrap();
        let empty: Vec<i64> = Vec::new();

        let inter = a.intersection(vec![SetOperand::from(&b), SetOperand::from(&empty)]).unwrap();
        assert!(inter.is_empty());
    }

    #[test]
    fn test_symmetric_difference_needs_operand() {
        let client = Client::memory();
        let a = Set::with_members(&client, "a", [1i64, 2]).unwrap();
        let none = || Vec::<SetOperand<'_, i64>>::new();
        assert!(matches!(a.symmetric_difference(none()), Err(Error::Value(_))));
        assert!(matches!(a.symmetric_difference_update(none()), Err(Error::Value(_))));
        assert_eq!(a.members().unwrap(), HashSet::from([1, 2]));
    }

    #[test]
    fn test_fold_symmetric_multi() {
        let sets = vec![set_of(&[1, 2, 3]), set_of(&[2, 3, 4]), set_of(&[3, 5])];
        assert_eq!(fold_symmetric(sets), set_of(&[1, 2, 4, 5]));
    }

    #[test]
    fn test_wrong_type_operand_fails() {
        let client = Client::memory();
        client.execute(Command::Set { key: "str".into(), value: "x".into() }).unwrap();
        let a = Set::with_members(&client, "a", [1i64]).unwrap();
        let s: Set<i64> = client.set("str").unwrap();

        let err = a
            .union(vec![SetOperand::from(&s), SetOperand::from(vec![2i64])])
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert_eq!(client.temp_key_count().unwrap(), 0);
        assert_eq!(s.redis_type().unwrap(), "string");
    }
}
