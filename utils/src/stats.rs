//! Operation counters, kept as totals and per scope.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// A thread-safe counter collection.
///
/// Every count lands in the totals. Counts made with [`increment_in`]
/// are also kept under their scope `K` (an account, a peer, ...).
/// The set of names is fixed at construction; unknown names are ignored.
///
/// [`increment_in`]: StatsCounter::increment_in
pub struct StatsCounter<K> {
    totals: HashMap<&'static str, AtomicU64>,
    scoped: Mutex<BTreeMap<K, BTreeMap<&'static str, u64>>>,
}

impl<K: Ord + Clone> StatsCounter<K> {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            totals: names.iter().map(|&name| (name, AtomicU64::new(0))).collect(),
            scoped: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn increment(&self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&self, name: &str, value: u64) {
        if let Some(counter) = self.totals.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
        }
    }

    /// Count `name` once in the totals and once under `scope`.
    pub fn increment_in(&self, scope: &K, name: &str) {
        let Some((&name, counter)) = self.totals.get_key_value(name) else {
            return;
        };
        counter.fetch_add(1, Ordering::Relaxed);
        let mut scoped = self.scoped.lock().unwrap_or_else(PoisonError::into_inner);
        *scoped
            .entry(scope.clone())
            .or_default()
            .entry(name)
            .or_insert(0) += 1;
    }

    pub fn get(&self, name: &str) -> u64 {
        self.totals
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn get_in(&self, scope: &K, name: &str) -> u64 {
        self.scoped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scope)
            .and_then(|counts| counts.get(name))
            .copied()
            .unwrap_or(0)
    }

    /// Totals by name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.totals
            .iter()
            .map(|(&k, v)| (k, v.load(Ordering::Relaxed)))
            .collect()
    }

    /// Counts under `scope` for every known name, zero where nothing was counted.
    pub fn scope_snapshot(&self, scope: &K) -> BTreeMap<&'static str, u64> {
        let scoped = self.scoped.lock().unwrap_or_else(PoisonError::into_inner);
        let counts = scoped.get(scope);
        self.totals
            .keys()
            .map(|&name| (name, counts.and_then(|c| c.get(name)).copied().unwrap_or(0)))
            .collect()
    }
}
