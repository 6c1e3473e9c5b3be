//! Tables of annual hydrogen demand keyed by entity (facility, region, zone or grid cell).
use crate::units::Hydrogen;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::Display;
use std::hash::Hash;

/// A trait alias for the keys of an [`AnnualDemandTable`]
pub trait DemandKey: Clone + Eq + Hash + Ord + Display {}
impl<T> DemandKey for T where T: Clone + Eq + Hash + Ord + Display {}

/// Check that a demand quantity is valid
fn check_quantity<K: Display>(key: &K, quantity: Hydrogen) -> Result<()> {
    ensure!(
        quantity.value().is_finite() && quantity.value() >= 0.0,
        "Invalid demand for {key}: {} (must be finite and >= 0)",
        quantity.value()
    );

    Ok(())
}

/// Annual demand for a set of entities in a single year.
///
/// Tables are immutable once built and ordered by key.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualDemandTable<K: DemandKey> {
    year: u32,
    values: IndexMap<K, Hydrogen>,
}

impl<K: DemandKey> AnnualDemandTable<K> {
    /// Create a table with no entries
    pub fn empty(year: u32) -> Self {
        Self {
            year,
            values: IndexMap::new(),
        }
    }

    /// Create a table from rows with unique keys.
    ///
    /// Duplicate keys and negative or non-finite quantities are integrity failures.
    pub fn from_rows<I>(year: u32, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Hydrogen)>,
    {
        let mut values = IndexMap::new();
        for (key, quantity) in rows {
            check_quantity(&key, quantity)?;
            ensure!(
                !values.contains_key(&key),
                "Duplicate key {key} in demand table for {year}"
            );
            values.insert(key, quantity);
        }
        values.sort_keys();

        Ok(Self { year, values })
    }

    /// Create a table by summing all records which share a key
    pub fn from_records<I>(year: u32, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Hydrogen)>,
    {
        let records: Vec<_> = records.into_iter().collect();
        for (key, quantity) in &records {
            check_quantity(key, *quantity)?;
        }

        let values = records
            .into_iter()
            .into_grouping_map()
            .sum()
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .collect();

        Ok(Self { year, values })
    }

    /// The year this table describes
    pub fn year(&self) -> u32 {
        self.year
    }

    /// Get the demand for an entity
    pub fn get(&self, key: &K) -> Option<Hydrogen> {
        self.values.get(key).copied()
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, Hydrogen)> {
        self.values.iter().map(|(key, quantity)| (key, *quantity))
    }

    /// Iterate over keys in order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.values.keys()
    }

    /// The number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Total demand over all entries
    pub fn total(&self) -> Hydrogen {
        self.values.values().copied().sum()
    }

    /// Split the table into entries whose key passes `predicate` and those which don't
    pub fn partition<F>(self, mut predicate: F) -> (Self, Self)
    where
        F: FnMut(&K) -> bool,
    {
        let (kept, rejected): (IndexMap<_, _>, IndexMap<_, _>) = self
            .values
            .into_iter()
            .partition(|(key, _)| predicate(key));

        (
            Self {
                year: self.year,
                values: kept,
            },
            Self {
                year: self.year,
                values: rejected,
            },
        )
    }
}
