use std::collections::hash_map::{Entry, HashMap};

use super::Listing;

/// The full set of known listings, keyed by listing id.
///
/// The persisted form is an ordered table; conversion happens only at the
/// store boundary via [`Dataset::from_records`] and [`Dataset::into_records`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: HashMap<String, Listing>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persisted table. The first row wins when an id repeats.
    pub fn from_records(records: Vec<Listing>) -> Self {
        let mut map = HashMap::with_capacity(records.len());
        for listing in records {
            if let Entry::Vacant(slot) = map.entry(listing.id.clone()) {
                slot.insert(listing);
            }
        }
        Self { records: map }
    }

    /// Unordered records; run them through the ranker before persisting.
    pub fn into_records(self) -> Vec<Listing> {
        self.records.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.records.values()
    }

    pub fn active_count(&self) -> usize {
        self.records.values().filter(|l| l.is_active).count()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Listing> {
        self.records.values_mut()
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Listing> {
        self.records.remove(id)
    }

    pub(crate) fn insert(&mut self, listing: Listing) {
        self.records.insert(listing.id.clone(), listing);
    }
}
