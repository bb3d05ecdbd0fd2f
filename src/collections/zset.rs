//! Sorted set: unique members, each with a score
//!
//! Algebra compares `(member, score)` pairs. Intersection and difference
//! are built from weighted ZINTERSTORE/ZUNIONSTORE steps whose
//! intermediate results are scored by how far apart a member's scores
//! are, so exact pair matches are the members scoring 0.

use std::marker::PhantomData;

use rand::Rng;
use tracing::warn;

use super::keyspace::{Binding, Keyspace};
use crate::algebra::{self, checked_score, materialize, stage_scored_each, Batch, Classified, Operand};
use crate::client::Client;
use crate::codec::Element;
use crate::command::{Aggregate, Command, ScoreBound, ZStore};
use crate::error::{Error, Result};
use crate::protocol::{extract_float, extract_optional_float, extract_optional_integer};

/// Operand accepted by the [`ZSet`] algebra
pub type ZSetOperand<'a, T> = Operand<'a, ZSet<T>, (T, f64)>;

/// Direction of rank and score reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Lowest score first
    #[default]
    Asc,
    /// Highest score first
    Desc,
}

/// Handle to a sorted set in the store
#[derive(Debug, Clone)]
pub struct ZSet<T> {
    binding: Binding,
    _element: PhantomData<fn() -> T>,
}

impl<'a, T> From<&'a ZSet<T>> for Operand<'a, ZSet<T>, (T, f64)> {
    fn from(zset: &'a ZSet<T>) -> Self {
        Operand::Remote(zset)
    }
}

impl<T> Keyspace for ZSet<T> {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }
}

impl<T: Element> ZSet<T> {
    pub fn open(client: &Client, key: impl Into<String>) -> Result<Self> {
        Ok(ZSet {
            binding: Binding::new(client, key)?,
            _element: PhantomData,
        })
    }

    /// Bind to `key` and add `entries` in one batch
    pub fn with_entries(
        client: &Client,
        key: impl Into<String>,
        entries: impl IntoIterator<Item = (T, f64)>,
    ) -> Result<Self> {
        let zset = Self::open(client, key)?;
        zset.add_all(entries)?;
        Ok(zset)
    }

    fn client(&self) -> &Client {
        self.binding.client()
    }

    fn own_key(&self) -> String {
        self.binding.key().to_string()
    }

    fn classify<'a, I, O>(&self, operands: I) -> Result<Classified<(T, f64)>>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        algebra::classify::<ZSet<T>, (T, f64), I, O>(self.client(), operands)
    }

    /// `self`, the remote operands, then one staged key per local group
    fn operand_keys(&self, batch: &mut Batch<'_>, ops: &Classified<(T, f64)>) -> Result<Vec<String>> {
        let mut keys = Vec::with_capacity(1 + ops.remote_keys.len() + ops.local_groups.len());
        keys.push(self.own_key());
        keys.extend(ops.remote_keys.iter().cloned());
        keys.extend(stage_scored_each(batch, &ops.local_groups)?);
        Ok(keys)
    }

    pub fn len(&self) -> Result<usize> {
        materialize::count(&self.binding.execute(Command::ZCard { key: self.own_key() })?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, member: &T) -> Result<bool> {
        Ok(self.score_of(member)?.is_some())
    }

    /// Add `member` or update its score; true if it was not a member yet
    pub fn add(&self, member: &T, score: f64) -> Result<bool> {
        Ok(self.add_all([(member.clone(), score)])? == 1)
    }

    /// Add several entries with one command; returns how many were new
    pub fn add_all(&self, entries: impl IntoIterator<Item = (T, f64)>) -> Result<usize> {
        let entries = entries
            .into_iter()
            .map(|(member, score)| checked_score(score).map(|score| (score, member.encode())))
            .collect::<Result<Vec<_>>>()?;
        if entries.is_empty() {
            return Ok(0);
        }
        materialize::count(&self.binding.execute(Command::ZAdd { key: self.own_key(), entries })?)
    }

    pub fn discard(&self, member: &T) -> Result<bool> {
        let command = Command::ZRem {
            key: self.own_key(),
            members: vec![member.encode()],
        };
        materialize::flag(&self.binding.execute(command)?)
    }

    /// Remove `member`, failing with [`Error::Key`] if it is not a member
    pub fn remove(&self, member: &T) -> Result<()> {
        if !self.discard(member)? {
            return Err(Error::Key(format!("{:?} is not a member of '{}'", member, self.binding.key())));
        }
        Ok(())
    }

    pub fn score_of(&self, member: &T) -> Result<Option<f64>> {
        let command = Command::ZScore {
            key: self.own_key(),
            member: member.encode(),
        };
        extract_optional_float(&self.binding.execute(command)?)
    }

    /// Zero-based position of `member` in `order`
    pub fn rank_of(&self, member: &T, order: Order) -> Result<Option<usize>> {
        let (key, member) = (self.own_key(), member.encode());
        let command = match order {
            Order::Asc => Command::ZRank { key, member },
            Order::Desc => Command::ZRevRank { key, member },
        };
        let rank = extract_optional_integer(&self.binding.execute(command)?)?;
        Ok(rank.and_then(|rank| usize::try_from(rank).ok()))
    }

    /// Add `by` to the score of `member`, creating it at `by`. Returns the
    /// new score.
    pub fn incr_score(&self, member: &T, by: f64) -> Result<f64> {
        let command = Command::ZIncrBy {
            key: self.own_key(),
            increment: checked_score(by)?,
            member: member.encode(),
        };
        extract_float(&self.binding.execute(command)?)
    }

    /// Member at ascending rank `index`; negative counts from the end
    pub fn get(&self, index: i64) -> Result<Option<T>> {
        Ok(self.range_by_rank(index, index, Order::Asc)?.into_iter().next())
    }

    fn rank_command(&self, start: i64, stop: i64, order: Order, with_scores: bool) -> Command {
        let key = self.own_key();
        match order {
            Order::Asc => Command::ZRange { key, start, stop, with_scores },
            Order::Desc => Command::ZRevRange { key, start, stop, with_scores },
        }
    }

    /// Members ranked `start..=stop` in `order`. Negative ranks count from
    /// the end.
    pub fn range_by_rank(&self, start: i64, stop: i64, order: Order) -> Result<Vec<T>> {
        materialize::sequence(self.binding.execute(self.rank_command(start, stop, order, false))?)
    }

    /// Like [`ZSet::range_by_rank`], with scores
    pub fn range_with_scores(&self, start: i64, stop: i64, order: Order) -> Result<Vec<(T, f64)>> {
        materialize::scored(self.binding.execute(self.rank_command(start, stop, order, true))?)
    }

    /// Members whose score lies between `min` and `max`, in `order`
    pub fn range_by_score(
        &self,
        min: impl Into<ScoreBound>,
        max: impl Into<ScoreBound>,
        order: Order,
    ) -> Result<Vec<T>> {
        let (key, min, max) = (self.own_key(), min.into(), max.into());
        let command = match order {
            Order::Asc => Command::ZRangeByScore { key, min, max, with_scores: false, limit: None },
            Order::Desc => Command::ZRevRangeByScore { key, max, min, with_scores: false, limit: None },
        };
        materialize::sequence(self.binding.execute(command)?)
    }

    /// At most `limit` entries, highest score first. With `before`, only
    /// scores strictly below it, so passing the last score seen pages
    /// backwards through the set.
    pub fn range_by_score_limit(&self, limit: usize, before: Option<f64>) -> Result<Vec<(T, f64)>> {
        let max = match before {
            Some(score) => ScoreBound::Exclusive(checked_score(score)?),
            None => ScoreBound::MAX,
        };
        let command = Command::ZRevRangeByScore {
            key: self.own_key(),
            max,
            min: ScoreBound::MIN,
            with_scores: true,
            limit: Some((0, limit)),
        };
        materialize::scored(self.binding.execute(command)?)
    }

    /// Every entry, lowest score first
    pub fn members(&self) -> Result<Vec<(T, f64)>> {
        self.range_with_scores(0, -1, Order::Asc)
    }

    /// Remove members ranked `start..=stop` (ascending); returns how many
    pub fn remove_range_by_rank(&self, start: i64, stop: i64) -> Result<usize> {
        let command = Command::ZRemRangeByRank {
            key: self.own_key(),
            start,
            stop,
        };
        materialize::count(&self.binding.execute(command)?)
    }

    pub fn remove_range_by_score(&self, min: impl Into<ScoreBound>, max: impl Into<ScoreBound>) -> Result<usize> {
        let command = Command::ZRemRangeByScore {
            key: self.own_key(),
            min: min.into(),
            max: max.into(),
        };
        materialize::count(&self.binding.execute(command)?)
    }

    /// Remove and return a random member.
    ///
    /// The size is read first and the member at a random rank is removed in
    /// a second round trip; a concurrent writer may change the set in
    /// between, so the pick is not atomic.
    pub fn pop(&self) -> Result<T> {
        let len = self.len()?;
        if len == 0 {
            return Err(Error::Key(format!("pop from empty sorted set '{}'", self.binding.key())));
        }
        let rank = rand::thread_rng().gen_range(0..len) as i64;

        let mut batch = Batch::new(self.client());
        let slot = batch.push(self.rank_command(rank, rank, Order::Asc, false));
        batch.push(Command::ZRemRangeByRank {
            key: self.own_key(),
            start: rank,
            stop: rank,
        });
        let picked: Vec<T> = materialize::sequence(batch.execute()?.take(slot)?)?;
        picked.into_iter().next().ok_or_else(|| {
            warn!(target: "ferrous::algebra", key = self.binding.key(), rank, "sorted set shrank during pop");
            Error::Key(format!("sorted set '{}' changed during pop", self.binding.key()))
        })
    }

    /// A random member, or `None` when empty. Two round trips, like
    /// [`ZSet::pop`].
    pub fn random_member(&self) -> Result<Option<T>> {
        let len = self.len()?;
        if len == 0 {
            return Ok(None);
        }
        let rank = rand::thread_rng().gen_range(0..len) as i64;
        self.get(rank)
    }

    pub fn clear(&self) -> Result<()> {
        self.binding.execute(Command::Del { keys: vec![self.own_key()] })?;
        Ok(())
    }

    /// Copy the entries to `key`, replacing whatever was there
    pub fn copy(&self, key: impl Into<String>) -> Result<ZSet<T>> {
        let copy = ZSet::open(self.client(), key)?;
        self.binding
            .execute(Command::ZUnionStore(ZStore::new(copy.own_key(), vec![self.own_key()])))?;
        Ok(copy)
    }

    /// Queue ZRANGE WITHSCORES on `key`; the slot of its reply
    fn read_scored(batch: &mut Batch<'_>, key: String) -> usize {
        batch.push(Command::ZRange {
            key,
            start: 0,
            stop: -1,
            with_scores: true,
        })
    }

    /// Members of `self` and every operand. Scores of a member present
    /// more than once are combined with `aggregate`.
    pub fn union<'a, I, O>(&self, aggregate: Aggregate, operands: I) -> Result<Vec<(T, f64)>>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        let result = batch.temp_key();
        batch.push(Command::ZUnionStore(ZStore::new(result.clone(), keys).aggregate(aggregate)));
        let slot = Self::read_scored(&mut batch, result);
        materialize::scored(batch.execute()?.take(slot)?)
    }

    /// Replace `self` with [`ZSet::union`]
    pub fn union_update<'a, I, O>(&self, aggregate: Aggregate, operands: I) -> Result<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if ops.is_empty() {
            return Ok(());
        }
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        batch.push(Command::ZUnionStore(ZStore::new(self.own_key(), keys).aggregate(aggregate)));
        batch.execute().map(drop)
    }

    /// Entries present with the same score in `self` and every operand
    pub fn intersection<'a, I, O>(&self, operands: I) -> Result<Vec<(T, f64)>>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        let result = batch.temp_key();
        push_pair_intersection(&mut batch, &result, keys);
        let slot = Self::read_scored(&mut batch, result);
        materialize::scored(batch.execute()?.take(slot)?)
    }

    /// Replace `self` with [`ZSet::intersection`]
    pub fn intersection_update<'a, I, O>(&self, operands: I) -> Result<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if ops.is_empty() {
            return Ok(());
        }
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        push_pair_intersection(&mut batch, &self.own_key(), keys);
        batch.execute().map(drop)
    }

    /// Entries of `self` that no operand holds with the same score
    pub fn difference<'a, I, O>(&self, operands: I) -> Result<Vec<(T, f64)>>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if ops.is_empty() {
            return self.members();
        }
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        let result = batch.temp_key();
        push_pair_difference(&mut batch, &result, keys);
        let slot = Self::read_scored(&mut batch, result);
        materialize::scored(batch.execute()?.take(slot)?)
    }

    /// Replace `self` with [`ZSet::difference`]
    pub fn difference_update<'a, I, O>(&self, operands: I) -> Result<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        let ops = self.classify(operands)?;
        if ops.is_empty() {
            return Ok(());
        }
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        push_pair_difference(&mut batch, &self.own_key(), keys);
        batch.execute().map(drop)
    }

    /// Store the member intersection of `self` and the operands into
    /// `destination`, scores combined with `aggregate`. Returns the size of
    /// the result.
    pub fn intersection_copy<'a, I, O>(&self, destination: &str, aggregate: Aggregate, operands: I) -> Result<usize>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        self.client().validate_key(destination)?;
        let ops = self.classify(operands)?;
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        let slot = batch.push(Command::ZInterStore(ZStore::new(destination, keys).aggregate(aggregate)));
        materialize::count(&batch.execute()?.take(slot)?)
    }

    /// Store the member union of `self` and the operands into
    /// `destination`. Returns the size of the result.
    pub fn union_copy<'a, I, O>(&self, destination: &str, aggregate: Aggregate, operands: I) -> Result<usize>
    where
        I: IntoIterator<Item = O>,
        O: Into<ZSetOperand<'a, T>>,
    {
        self.client().validate_key(destination)?;
        let ops = self.classify(operands)?;
        let mut batch = Batch::new(self.client());
        let keys = self.operand_keys(&mut batch, &ops)?;
        let slot = batch.push(Command::ZUnionStore(ZStore::new(destination, keys).aggregate(aggregate)));
        materialize::count(&batch.execute()?.take(slot)?)
    }
}

/// Store into `destination` the members of every key in `keys` whose
/// scores all agree, at that score
fn push_pair_intersection(batch: &mut Batch<'_>, destination: &str, keys: Vec<String>) {
    let low = batch.temp_key();
    let high = batch.temp_key();
    let spread = batch.temp_key();

    batch.push(Command::ZInterStore(ZStore::new(low.clone(), keys.clone()).aggregate(Aggregate::Min)));
    batch.push(Command::ZInterStore(ZStore::new(high.clone(), keys).aggregate(Aggregate::Max)));
    // max - min per member; 0 where the scores agree
    batch.push(Command::ZUnionStore(
        ZStore::new(spread.clone(), vec![high, low.clone()]).weights(vec![1.0, -1.0]),
    ));
    batch.push(Command::ZRemRangeByScore {
        key: spread.clone(),
        min: ScoreBound::Exclusive(0.0),
        max: ScoreBound::MAX,
    });
    batch.push(Command::ZInterStore(ZStore::new(destination, vec![low, spread]).weights(vec![1.0, 0.0])));
}

/// Store into `destination` the entries of `keys[0]` not matched by a
/// `(member, score)` pair in any other key
fn push_pair_difference(batch: &mut Batch<'_>, destination: &str, keys: Vec<String>) {
    let mut keys = keys.into_iter();
    let own = match keys.next() {
        Some(own) => own,
        None => return,
    };

    let mut matches = Vec::new();
    for other in keys {
        let matched = batch.temp_key();
        batch.push(Command::ZInterStore(
            ZStore::new(matched.clone(), vec![own.clone(), other]).weights(vec![1.0, -1.0]),
        ));
        batch.push(Command::ZRemRangeByScore {
            key: matched.clone(),
            min: ScoreBound::Exclusive(0.0),
            max: ScoreBound::MAX,
        });
        batch.push(Command::ZRemRangeByScore {
            key: matched.clone(),
            min: ScoreBound::MIN,
            max: ScoreBound::Exclusive(0.0),
        });
        matches.push(matched);
    }

    let dropped = batch.temp_key();
    batch.push(Command::ZUnionStore(ZStore::new(dropped.clone(), matches)));
    batch.push(Command::ZDiffStore {
        destination: destination.to_string(),
        keys: vec![own, dropped],
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(client: &Client) -> ZSet<i64> {
        ZSet::with_entries(client, "z", [(1i64, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]).unwrap()
    }

    #[test]
    fn test_rank_ranges() {
        let client = Client::memory();
        let z = sample(&client);

        assert_eq!(z.range_by_rank(0, -1, Order::Asc).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(z.range_by_rank(0, -1, Order::Desc).unwrap(), vec![4, 3, 2, 1]);
        assert_eq!(z.range_by_rank(1, 2, Order::Asc).unwrap(), vec![2, 3]);
        assert_eq!(z.get(-1).unwrap(), Some(4));
        assert_eq!(z.get(10).unwrap(), None);
    }

    #[test]
    fn test_range_by_score_limit_pages_backwards() {
        let client = Client::memory();
        let z = sample(&client);

        let first = z.range_by_score_limit(3, None).unwrap();
        assert_eq!(first, vec![(4, 4.0), (3, 3.0), (2, 2.0)]);

        let last_seen = first.last().map(|(_, score)| *score);
        assert_eq!(z.range_by_score_limit(3, last_seen).unwrap(), vec![(1, 1.0)]);
        assert_eq!(z.range_by_score_limit(2, Some(3.5)).unwrap(), vec![(3, 3.0), (2, 2.0)]);
        assert!(z.range_by_score_limit(3, Some(1.0)).unwrap().is_empty());
        assert!(z.range_by_score_limit(0, None).unwrap().is_empty());
        assert!(matches!(z.range_by_score_limit(1, Some(f64::NAN)), Err(Error::Value(_))));

        let empty: ZSet<i64> = client.zset("nothing").unwrap();
        assert!(empty.range_by_score_limit(5, None).unwrap().is_empty());
        assert!(empty.range_by_score_limit(5, Some(10.0)).unwrap().is_empty());
    }

    #[test]
    fn test_remove_range_by_rank() {
        let client = Client::memory();
        let z = sample(&client);
        assert_eq!(z.remove_range_by_rank(0, 0).unwrap(), 1);
        assert_eq!(z.range_by_rank(0, -1, Order::Asc).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_score_reads() {
        let client = Client::memory();
        let z = sample(&client);

        assert_eq!(z.range_by_score(2.0, 3.0, Order::Asc).unwrap(), vec![2, 3]);
        assert_eq!(z.range_by_score(ScoreBound::Exclusive(1.0), ScoreBound::MAX, Order::Desc).unwrap(), vec![4, 3, 2]);
        assert_eq!(z.score_of(&3).unwrap(), Some(3.0));
        assert_eq!(z.score_of(&9).unwrap(), None);
        assert_eq!(z.rank_of(&1, Order::Asc).unwrap(), Some(0));
        assert_eq!(z.rank_of(&1, Order::Desc).unwrap(), Some(3));
        assert_eq!(z.incr_score(&1, 10.0).unwrap(), 11.0);
        assert_eq!(z.rank_of(&1, Order::Asc).unwrap(), Some(3));
        assert_eq!(z.remove_range_by_score(ScoreBound::MIN, 2.0).unwrap(), 1);
        assert_eq!(z.len().unwrap(), 3);
    }

    #[test]
    fn test_membership() {
        let client = Client::memory();
        let z: ZSet<String> = client.zset("z").unwrap();

        assert!(z.add(&"a".to_string(), 1.0).unwrap());
        assert!(!z.add(&"a".to_string(), 2.0).unwrap());
        assert_eq!(z.score_of(&"a".to_string()).unwrap(), Some(2.0));
        assert!(matches!(z.add(&"b".to_string(), f64::NAN), Err(Error::Value(_))));
        assert!(matches!(z.remove(&"b".to_string()), Err(Error::Key(_))));
        z.remove(&"a".to_string()).unwrap();
        assert!(z.is_empty().unwrap());
    }

    #[test]
    fn test_pop_drains() {
        let client = Client::memory();
        let z = sample(&client);
        let mut popped: Vec<i64> = (0..4).map(|_| z.pop().unwrap()).collect();
        popped.sort();
        assert_eq!(popped, vec![1, 2, 3, 4]);
        assert!(matches!(z.pop(), Err(Error::Key(_))));
        assert_eq!(z.random_member().unwrap(), None);
    }

    #[test]
    fn test_pair_intersection() {
        let client = Client::memory();
        let z = sample(&client);
        let other = ZSet::with_entries(&client, "o", [(1i64, 1.0), (2, 5.0), (3, 3.0)]).unwrap();

        assert_eq!(z.intersection([&other]).unwrap(), vec![(1, 1.0), (3, 3.0)]);
        assert_eq!(z.intersection([vec![(4i64, 4.0), (3, 0.5)]]).unwrap(), vec![(4, 4.0)]);
        assert_eq!(client.temp_key_count().unwrap(), 0);
    }

    #[test]
    fn test_pair_difference() {
        let client = Client::memory();
        let z = sample(&client);
        let other = ZSet::with_entries(&client, "o", [(1i64, 1.0), (2, 5.0)]).unwrap();

        let diff = z
            .difference(vec![ZSetOperand::from(&other), ZSetOperand::from(vec![(4i64, 4.0)])])
            .unwrap();
        assert_eq!(diff, vec![(2, 2.0), (3, 3.0)]);

        z.difference_update([&other]).unwrap();
        assert_eq!(z.members().unwrap(), vec![(2, 2.0), (3, 3.0), (4, 4.0)]);
        assert_eq!(client.temp_key_count().unwrap(), 0);
    }

    #[test]
    fn test_union_aggregates() {
        let client = Client::memory();
        let z = ZSet::with_entries(&client, "z", [(1i64, 1.0), (2, 2.0)]).unwrap();
        let local = vec![(2i64, 5.0), (3, 0.5)];

        assert_eq!(z.union(Aggregate::Sum, [&local]).unwrap(), vec![(3, 0.5), (1, 1.0), (2, 7.0)]);
        assert_eq!(z.union(Aggregate::Max, [&local]).unwrap(), vec![(3, 0.5), (1, 1.0), (2, 5.0)]);

        z.union_update(Aggregate::Min, [&local]).unwrap();
        assert_eq!(z.members().unwrap(), vec![(3, 0.5), (1, 1.0), (2, 2.0)]);
    }

    #[test]
    fn test_copies() {
        let client = Client::memory();
        let z = sample(&client);
        let other = ZSet::with_entries(&client, "o", [(1i64, 10.0), (9, 1.0)]).unwrap();

        assert_eq!(z.intersection_copy("inter", Aggregate::Sum, [&other]).unwrap(), 1);
        assert_eq!(client.zset::<i64>("inter").unwrap().members().unwrap(), vec![(1, 11.0)]);
        assert_eq!(z.union_copy("all", Aggregate::Max, [&other]).unwrap(), 5);
        assert!(matches!(
            z.union_copy("", Aggregate::Max, [&other]),
            Err(Error::Type(_))
        ));

        let copy = z.copy("copy").unwrap();
        assert_eq!(copy.members().unwrap(), z.members().unwrap());
    }
}
