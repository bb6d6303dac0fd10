//! Day-level aggregation
//!
//! [`CountTable`] folds activity events into date -> category -> count.
//! Only positive counts are stored; an absent cell means zero. Folding is
//! order-independent, so partial tables built separately can be merged.

use crate::types::{ActivityEvent, Category};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Sparse date x category count matrix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountTable {
    days: BTreeMap<NaiveDate, BTreeMap<Category, u64>>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event
    pub fn record(&mut self, event: ActivityEvent) {
        *self
            .days
            .entry(event.date)
            .or_default()
            .entry(event.category)
            .or_insert(0) += 1;
    }

    /// Add every count of `other` into this table
    pub fn merge(&mut self, other: CountTable) {
        for (date, categories) in other.days {
            let day = self.days.entry(date).or_default();
            for (category, count) in categories {
                *day.entry(category).or_insert(0) += count;
            }
        }
    }

    pub fn get(&self, date: NaiveDate, category: Category) -> Option<u64> {
        self.days.get(&date)?.get(&category).copied()
    }

    /// Days in ascending order with their non-zero counts
    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &BTreeMap<Category, u64>)> {
        self.days.iter()
    }

    pub fn dates(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Categories with at least one occurrence anywhere
    pub fn categories(&self) -> BTreeSet<Category> {
        self.days
            .values()
            .flat_map(|day| day.keys().copied())
            .collect()
    }

    /// Total occurrences of a category across all days
    pub fn total(&self, category: Category) -> u64 {
        self.days
            .values()
            .filter_map(|day| day.get(&category))
            .sum()
    }

    /// Totals for every category present
    pub fn totals(&self) -> BTreeMap<Category, u64> {
        let mut totals = BTreeMap::new();
        for day in self.days.values() {
            for (category, count) in day {
                *totals.entry(*category).or_insert(0) += count;
            }
        }
        totals
    }

    /// Total occurrences of every category on one day
    pub fn day_total(&self, date: NaiveDate) -> u64 {
        self.days
            .get(&date)
            .map(|day| day.values().sum())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl Extend<ActivityEvent> for CountTable {
    fn extend<I: IntoIterator<Item = ActivityEvent>>(&mut self, events: I) {
        for event in events {
            self.record(event);
        }
    }
}

impl FromIterator<ActivityEvent> for CountTable {
    fn from_iter<I: IntoIterator<Item = ActivityEvent>>(events: I) -> Self {
        let mut table = CountTable::new();
        table.extend(events);
        table
    }
}
