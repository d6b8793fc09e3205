//! Tier and search-hint annotation plus the persisted order.

use std::cmp::Ordering;

use crate::categorize::CategoryRules;
use crate::config::AppConfig;
use crate::models::{Dataset, Listing};
use crate::search::{search_hints, SearchConfig};
use crate::temporal::{is_unknown, sort_key};

pub struct Ranker<'a> {
    rules: &'a CategoryRules,
    search: &'a SearchConfig,
}

/// Active records, newest first, then inactive records, oldest first.
/// Records without a resolvable moment trail both groups.
fn compare(a: &Listing, b: &Listing) -> Ordering {
    let (key_a, key_b) = (sort_key(a), sort_key(b));

    b.is_active
        .cmp(&a.is_active)
        .then_with(|| {
            if a.is_active {
                key_b.cmp(&key_a)
            } else {
                (is_unknown(&key_a), key_a).cmp(&(is_unknown(&key_b), key_b))
            }
        })
        .then_with(|| b.captured_at.cmp(&a.captured_at))
        .then_with(|| b.last_seen.cmp(&a.last_seen))
        .then_with(|| a.id.cmp(&b.id))
}

impl<'a> Ranker<'a> {
    pub fn new(rules: &'a CategoryRules, search: &'a SearchConfig) -> Self {
        Self { rules, search }
    }

    pub fn from_config(config: &'a AppConfig) -> Self {
        Self::new(&config.categories, &config.search)
    }

    pub fn annotate(&self, listing: &mut Listing) {
        listing.tier = Some(self.rules.categorize(listing.year, listing.price));
        listing.search_hints = Some(search_hints(listing, self.search));
    }

    pub fn rank(&self, dataset: Dataset) -> Vec<Listing> {
        self.rank_records(dataset.into_records())
    }

    pub fn rank_records(&self, mut records: Vec<Listing>) -> Vec<Listing> {
        for listing in records.iter_mut() {
            self.annotate(listing);
        }
        records.sort_by(compare);
        records
    }
}
