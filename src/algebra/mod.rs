//! Server-side collection algebra
//!
//! An algebra call goes through four phases: operands are classified into
//! remote keys and local groups, local groups are staged into temporary
//! keys, everything runs as one [`Batch`], and the replies are decoded
//! back into typed values.

pub mod batch;
pub mod materialize;

pub use batch::{Batch, Replies};

use std::collections::{HashMap, HashSet};

use crate::client::Client;
use crate::codec::Element;
use crate::collections::Keyspace;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::format_score;

/// One operand of an algebra call: a collection already in the store, or
/// values that only exist in memory
#[derive(Debug)]
pub enum Operand<'a, H, V> {
    Remote(&'a H),
    Local(Vec<V>),
}

impl<'a, H, V: Clone> From<&'a [V]> for Operand<'a, H, V> {
    fn from(values: &'a [V]) -> Self {
        Operand::Local(values.to_vec())
    }
}

impl<'a, H, V: Clone> From<&'a Vec<V>> for Operand<'a, H, V> {
    fn from(values: &'a Vec<V>) -> Self {
        Operand::Local(values.clone())
    }
}

impl<'a, H, V> From<Vec<V>> for Operand<'a, H, V> {
    fn from(values: Vec<V>) -> Self {
        Operand::Local(values)
    }
}

impl<'a, H, V: Clone, const N: usize> From<[V; N]> for Operand<'a, H, V> {
    fn from(values: [V; N]) -> Self {
        Operand::Local(values.to_vec())
    }
}

impl<'a, H, V: Clone> From<&'a HashSet<V>> for Operand<'a, H, V> {
    fn from(values: &'a HashSet<V>) -> Self {
        Operand::Local(values.iter().cloned().collect())
    }
}

impl<'a, H, V> From<HashSet<V>> for Operand<'a, H, V> {
    fn from(values: HashSet<V>) -> Self {
        Operand::Local(values.into_iter().collect())
    }
}

impl<'a, H, T: Clone> From<&'a HashMap<T, f64>> for Operand<'a, H, (T, f64)> {
    fn from(entries: &'a HashMap<T, f64>) -> Self {
        Operand::Local(entries.iter().map(|(member, score)| (member.clone(), *score)).collect())
    }
}

/// Operands split by where their contents live
#[derive(Debug)]
pub struct Classified<V> {
    /// Keys of remote operands, in input order
    pub remote_keys: Vec<String>,

    /// One group per local operand, in input order
    pub local_groups: Vec<Vec<V>>,
}

impl<V> Classified<V> {
    pub fn has_remote(&self) -> bool {
        !self.remote_keys.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.remote_keys.is_empty() && self.local_groups.is_empty()
    }
}

impl<T: Element> Classified<T> {
    /// All local values in one set
    pub fn merged_locals(&self) -> HashSet<T> {
        self.local_groups.iter().flatten().cloned().collect()
    }
}

/// Split `operands` into remote keys and local groups. A remote operand
/// bound to another store namespace is refused before anything is sent.
pub fn classify<'a, H, V, I, O>(owner: &Client, operands: I) -> Result<Classified<V>>
where
    H: Keyspace + 'a,
    I: IntoIterator<Item = O>,
    O: Into<Operand<'a, H, V>>,
{
    let namespace = owner.namespace();
    let mut classified = Classified {
        remote_keys: Vec::new(),
        local_groups: Vec::new(),
    };

    for operand in operands {
        match operand.into() {
            Operand::Remote(handle) => {
                let other = handle.binding().client().namespace();
                if other != namespace {
                    return Err(Error::Type(format!(
                        "operand '{}' belongs to {}, not {}",
                        handle.key(),
                        other,
                        namespace
                    )));
                }
                classified.remote_keys.push(handle.key().to_string());
            }
            Operand::Local(values) => classified.local_groups.push(values),
        }
    }
    Ok(classified)
}

/// Stage every local group into one temporary set. Nothing is staged when
/// there are no local values.
pub fn stage_merged<T: Element>(batch: &mut Batch<'_>, groups: &[Vec<T>]) -> Option<String> {
    let mut seen = HashSet::new();
    let members: Vec<String> = groups
        .iter()
        .flatten()
        .map(Element::encode)
        .filter(|encoded| seen.insert(encoded.clone()))
        .collect();
    if members.is_empty() {
        return None;
    }

    let key = batch.temp_key();
    batch.push(Command::SAdd { key: key.clone(), members });
    Some(key)
}

/// Stage each local group into its own temporary set. An empty group gets
/// a key that is never written, which reads as the empty set.
pub fn stage_each<T: Element>(batch: &mut Batch<'_>, groups: &[Vec<T>]) -> Vec<String> {
    groups
        .iter()
        .map(|group| {
            let key = batch.temp_key();
            if !group.is_empty() {
                let members = group.iter().map(Element::encode).collect();
                batch.push(Command::SAdd { key: key.clone(), members });
            }
            key
        })
        .collect()
}

/// Stage each local group of `(member, score)` pairs into its own temporary
/// sorted set. A repeated member keeps its last score.
pub fn stage_scored_each<T: Element>(batch: &mut Batch<'_>, groups: &[Vec<(T, f64)>]) -> Result<Vec<String>> {
    let mut keys = Vec::with_capacity(groups.len());
    for group in groups {
        let key = batch.temp_key();
        if !group.is_empty() {
            let entries = group
                .iter()
                .map(|(member, score)| checked_score(*score).map(|score| (score, member.encode())))
                .collect::<Result<Vec<_>>>()?;
            batch.push(Command::ZAdd { key: key.clone(), entries });
        }
        keys.push(key);
    }
    Ok(keys)
}

/// Scores must be numbers; NaN is refused before anything is sent
pub fn checked_score(score: f64) -> Result<f64> {
    if score.is_nan() {
        return Err(Error::Value(format!("invalid score {}", format_score(score))));
    }
    Ok(score)
}
