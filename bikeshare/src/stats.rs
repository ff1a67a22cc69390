use std::collections::HashMap;
use std::hash::Hash;

use average::{self, concatenate, Estimate, Max, Mean, Min};

concatenate!(DurationAgg, [Mean, mean], [Min, min], [Max, max]);

/// Occurrence counts that remember the order in which keys were first seen.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Tally {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most frequent key. Ties go to the key seen first.
    pub fn mode(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (key, count) in &self.entries {
            if best.map_or(true, |(_, top)| *count > top) {
                best = Some((key, *count));
            }
        }
        best
    }

    /// All keys by descending count. Equal counts keep first-seen order.
    pub fn into_descending(self) -> Vec<(K, usize)> {
        let mut entries = self.entries;
        // stable
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl<K: Eq + Hash + Clone> Default for Tally<K> {
    fn default() -> Self {
        Tally::new()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

pub trait ModeReduction: Iterator
where
    Self: Sized,
    Self::Item: Eq + Hash + Clone,
{
    /// Most frequent item, ties broken by first occurrence. `None` when empty.
    fn mode(self) -> Option<Self::Item> {
        let tally: Tally<Self::Item> = self.collect();
        tally.mode().map(|(key, _)| key.clone())
    }

    /// Item counts by descending frequency, ties in first-occurrence order.
    fn value_counts(self) -> Vec<(Self::Item, usize)> {
        let tally: Tally<Self::Item> = self.collect();
        tally.into_descending()
    }
}

impl<T> ModeReduction for T
where
    T: Iterator,
    T::Item: Eq + Hash + Clone,
{
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationSummary {
    pub total: f64,
    pub mean: f64,
    pub shortest: f64,
    pub longest: f64,
    pub len: usize,
}

/// Sum, mean and range of trip durations. `None` for no durations.
pub fn summarize_durations(durations: impl Iterator<Item = f64> + Clone) -> Option<DurationSummary> {
    let total = durations.clone().sum::<f64>();
    let agg: DurationAgg = durations.collect();
    if agg.mean.is_empty() {
        return None;
    }
    Some(DurationSummary {
        total,
        mean: agg.mean(),
        shortest: agg.min(),
        longest: agg.max(),
        len: agg.mean.len() as usize,
    })
}
