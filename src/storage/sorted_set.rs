//! Sorted set with a dual index
//!
//! Member lookups go through a hash map; rank and score ranges walk an
//! ordered set of `(score, member)` pairs. Equal scores order by member,
//! like the store does.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;

use crate::command::ScoreBound;

/// Total order over scores; NaN never reaches the index
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        // -0.0 and 0.0 must compare equal so ranks stay stable
        if self.0 == other.0 {
            Ordering::Equal
        } else {
            self.0.total_cmp(&other.0)
        }
    }
}

/// Sorted set of string members
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    scores: HashMap<String, f64>,
    index: BTreeSet<(Score, String)>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn contains(&self, member: &str) -> bool {
        self.scores.contains_key(member)
    }

    /// Insert or update a member; returns the previous score
    pub fn insert(&mut self, member: String, score: f64) -> Option<f64> {
        let previous = self.scores.insert(member.clone(), score);
        if let Some(old) = previous {
            self.index.remove(&(Score(old), member.clone()));
        }
        self.index.insert((Score(score), member));
        previous
    }

    /// Remove a member; returns its score
    pub fn remove(&mut self, member: &str) -> Option<f64> {
        let score = self.scores.remove(member)?;
        self.index.remove(&(Score(score), member.to_string()));
        Some(score)
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Zero-based ascending rank
    pub fn rank(&self, member: &str) -> Option<usize> {
        let score = self.score(member)?;
        Some(self.index.range(..(Score(score), member.to_string())).count())
    }

    /// Members with ranks `start..=stop`, ascending
    pub fn range_by_rank(&self, start: usize, stop: usize) -> Vec<(String, f64)> {
        if start > stop {
            return Vec::new();
        }
        self.index
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .map(|(score, member)| (member.clone(), score.0))
            .collect()
    }

    /// Members whose score lies within both bounds, ascending
    pub fn range_by_score(&self, min: &ScoreBound, max: &ScoreBound) -> Vec<(String, f64)> {
        let lower = match *min {
            ScoreBound::Inclusive(score) | ScoreBound::Exclusive(score) => {
                Bound::Included((Score(score), String::new()))
            }
        };
        self.index
            .range((lower, Bound::Unbounded))
            .take_while(|(score, _)| max.admits_from_above(score.0))
            .filter(|(score, _)| min.admits_from_below(score.0))
            .map(|(score, member)| (member.clone(), score.0))
            .collect()
    }

    /// Ascending iteration over `(member, score)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.index.iter().map(|(score, member)| (member.as_str(), score.0))
    }

    /// Remove members with ranks `start..=stop`; returns the count removed
    pub fn remove_range_by_rank(&mut self, start: usize, stop: usize) -> usize {
        let doomed = self.range_by_rank(start, stop);
        for (member, _) in &doomed {
            self.remove(member);
        }
        doomed.len()
    }

    /// Remove members within the score bounds; returns the count removed
    pub fn remove_range_by_score(&mut self, min: &ScoreBound, max: &ScoreBound) -> usize {
        let doomed = self.range_by_score(min, max);
        for (member, _) in &doomed {
            self.remove(member);
        }
        doomed.len()
    }
}

impl FromIterator<(String, f64)> for SortedSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut zset = SortedSet::new();
        for (member, score) in iter {
            zset.insert(member, score);
        }
        zset
    }
}
