//! Counts over a dataset for the end-of-run summary.

use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use crate::categorize::Tier;
use crate::models::Listing;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub by_vehicle: BTreeMap<String, usize>,
    pub by_tier: BTreeMap<Tier, usize>,
}

impl DatasetSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Listing>,
    {
        let mut summary = Self::default();
        for listing in records {
            summary.total += 1;
            if listing.is_active {
                summary.active += 1;
            } else {
                summary.inactive += 1;
            }
            *summary
                .by_vehicle
                .entry(listing.tracked_vehicle.clone())
                .or_default() += 1;
            if let Some(tier) = listing.tier {
                *summary.by_tier.entry(tier).or_default() += 1;
            }
        }
        summary
    }

    pub fn log(&self) {
        info!(
            "📊 {} listings ({} active, {} inactive)",
            self.total, self.active, self.inactive
        );
        for (vehicle, count) in &self.by_vehicle {
            info!("   {}: {}", vehicle, count);
        }
        for (tier, count) in &self.by_tier {
            info!("   {}: {}", tier, count);
        }
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total: {} ({} active, {} inactive)",
            self.total, self.active, self.inactive
        )?;
        for (vehicle, count) in &self.by_vehicle {
            writeln!(f, "  {}: {}", vehicle, count)?;
        }
        let tiers: Vec<String> = self
            .by_tier
            .iter()
            .map(|(tier, count)| format!("{tier}={count}"))
            .collect();
        write!(f, "Tiers: {}", tiers.join(", "))
    }
}
