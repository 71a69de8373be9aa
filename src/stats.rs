//! Adjacent pair frequency statistics.
//!
//! Counts are keyed by [`Pair`] and remember the order in which each pair was first
//! encountered. Selecting the most frequent pair breaks ties on that order, so training is
//! deterministic regardless of hash iteration order.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::model::{Pair, TokenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PairStat {
    count: usize,
    first_seen: usize,
}

/// Pair frequencies accumulated over one or more token sequences.
#[derive(Debug, Clone, Default)]
pub struct PairCounts {
    stats: FxHashMap<Pair, PairStat>,
    order: Vec<Pair>,
}

impl PairCounts {
    /// Creates an empty statistics table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the adjacent pairs of every sequence, never pairing across sequences.
    #[must_use]
    pub fn from_sequences<S>(sequences: &[S]) -> Self
    where
        S: AsRef<[TokenId]>,
    {
        let mut counts = Self::new();
        for sequence in sequences {
            counts.accumulate(sequence.as_ref());
        }
        counts
    }

    /// Adds the adjacent pairs of `sequence` to the table.
    pub fn accumulate(&mut self, sequence: &[TokenId]) {
        for window in sequence.windows(2) {
            let pair = (window[0], window[1]);
            match self.stats.entry(pair) {
                Entry::Occupied(mut occupied) => occupied.get_mut().count += 1,
                Entry::Vacant(vacant) => {
                    vacant.insert(PairStat {
                        count: 1,
                        first_seen: self.order.len(),
                    });
                    self.order.push(pair);
                }
            }
        }
    }

    /// Returns the count recorded for `pair`, or zero.
    #[must_use]
    pub fn get(&self, pair: Pair) -> usize {
        self.stats.get(&pair).map_or(0, |stat| stat.count)
    }

    /// Number of distinct pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when no pair has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the pair with the highest count, preferring the earliest discovered pair on ties.
    #[must_use]
    pub fn most_frequent(&self) -> Option<(Pair, usize)> {
        let mut best: Option<(Pair, usize)> = None;
        for &pair in &self.order {
            let count = self.get(pair);
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((pair, count));
            }
        }
        best
    }

    /// Iterates `(pair, count)` entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, usize)> + '_ {
        self.order.iter().map(move |&pair| (pair, self.get(pair)))
    }

    /// Iterates the distinct pairs in first-occurrence order.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.order.iter().copied()
    }
}
