//! Merge a new batch of listings into the prior dataset.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::models::{BodyStyle, Dataset, FuelType, Listing, Transmission};

/// What one reconciliation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
    pub deactivated: usize,
    pub dropped: usize,
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Overlay a fresh observation on the stored record. Anything the new
/// observation could not read keeps its stored value.
fn merge(prior: Listing, mut fresh: Listing) -> Listing {
    if is_blank(&fresh.title) {
        fresh.title = prior.title;
    }
    if is_blank(&fresh.tracked_vehicle) {
        fresh.tracked_vehicle = prior.tracked_vehicle;
    }
    if is_blank(&fresh.brand) {
        fresh.brand = prior.brand;
    }
    fresh.year = fresh.year.or(prior.year);
    fresh.mileage = fresh.mileage.or(prior.mileage);
    fresh.price = fresh.price.or(prior.price);
    if fresh.location.as_deref().map_or(true, is_blank) {
        fresh.location = prior.location;
    }
    if fresh.transmission == Transmission::Unknown {
        fresh.transmission = prior.transmission;
    }
    if fresh.fuel_type == FuelType::Unknown {
        fresh.fuel_type = prior.fuel_type;
    }
    if fresh.body_style == BodyStyle::Unknown {
        fresh.body_style = prior.body_style;
    }

    // phrases travel with the date resolved from them
    if fresh.listing_relative_time.is_none() {
        fresh.listing_relative_time = prior.listing_relative_time;
        fresh.listing_date = prior.listing_date;
    }
    if fresh.auction_end_relative.is_none() {
        fresh.auction_end_relative = prior.auction_end_relative;
        fresh.auction_end_date = prior.auction_end_date;
    }

    fresh.first_seen = prior.first_seen;
    fresh
}

/// Fold `batch` into `prior`. Every record the batch does not mention ends up
/// inactive; every batch record ends up active with `last_seen = now`.
pub fn reconcile(
    mut prior: Dataset,
    batch: Vec<Listing>,
    now: DateTime<Utc>,
) -> (Dataset, ReconcileReport) {
    let mut report = ReconcileReport::default();

    let previously_active: HashSet<String> = prior
        .iter()
        .filter(|l| l.is_active)
        .map(|l| l.id.clone())
        .collect();
    let known: HashSet<String> = prior.iter().map(|l| l.id.clone()).collect();

    for listing in prior.iter_mut() {
        listing.is_active = false;
    }

    let mut seen: HashSet<String> = HashSet::new();
    for mut listing in batch {
        if is_blank(&listing.id) {
            warn!("Dropping listing without id: {:?}", listing.title);
            report.dropped += 1;
            continue;
        }

        listing.is_active = true;
        listing.last_seen = Some(now);

        let mut merged = match prior.remove(&listing.id) {
            Some(stored) => {
                debug!("Merging {} into stored record", listing.id);
                merge(stored, listing)
            }
            None => listing,
        };
        if merged.first_seen.is_none() {
            merged.first_seen = Some(now);
        }

        if seen.insert(merged.id.clone()) {
            if known.contains(&merged.id) {
                report.updated += 1;
            } else {
                report.inserted += 1;
            }
        }
        prior.insert(merged);
    }

    report.deactivated = previously_active.difference(&seen).count();

    info!(
        "Reconciled: {} new, {} updated, {} deactivated, {} dropped",
        report.inserted, report.updated, report.deactivated, report.dropped
    );
    (prior, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mileage;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 20, 9, 0, 0).unwrap()
    }

    fn listing(id: &str, price: Option<u32>) -> Listing {
        let json = serde_json::json!({
            "id": id,
            "title": format!("2015 Toyota 86 {id}"),
            "year": 2015,
            "tracked_vehicle": "Toyota 86",
            "brand": "Toyota",
            "price": price,
            "location": "Auckland",
            "captured_at": t0(),
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_empty_prior_takes_batch() {
        let (dataset, report) = reconcile(
            Dataset::new(),
            vec![listing("A", Some(20_000)), listing("B", None)],
            t0(),
        );
        assert_eq!(dataset.len(), 2);
        assert_eq!(report.inserted, 2);
        for record in dataset.iter() {
            assert!(record.is_active);
            assert_eq!(record.first_seen, Some(t0()));
            assert_eq!(record.last_seen, Some(t0()));
        }
    }

    #[test]
    fn test_same_batch_twice_stays_active() {
        let batch = vec![listing("A", Some(20_000)), listing("B", Some(21_000))];
        let (first, _) = reconcile(Dataset::new(), batch.clone(), t0());
        let later = t0() + Duration::hours(1);
        let (second, report) = reconcile(first, batch, later);

        assert_eq!(second.len(), 2);
        assert_eq!(second.active_count(), 2);
        assert_eq!(report.updated, 2);
        assert_eq!(report.deactivated, 0);
        let a = second.get("A").unwrap();
        assert_eq!(a.first_seen, Some(t0()));
        assert_eq!(a.last_seen, Some(later));
    }

    #[test]
    fn test_missing_field_keeps_stored_value() {
        let mut stored = listing("A", Some(20_000));
        stored.mileage = Some(Mileage::Km(60_000));
        stored.transmission = Transmission::Manual;
        stored.listing_relative_time = Some("Yesterday".to_string());
        stored.listing_date = Some(t0() - Duration::days(1));
        let (prior, _) = reconcile(Dataset::new(), vec![stored], t0());

        let mut fresh = listing("A", None);
        fresh.location = Some("  ".to_string());
        let (next, _) = reconcile(prior, vec![fresh], t0() + Duration::hours(2));

        let merged = next.get("A").unwrap();
        assert_eq!(merged.price, Some(20_000));
        assert_eq!(merged.mileage, Some(Mileage::Km(60_000)));
        assert_eq!(merged.location.as_deref(), Some("Auckland"));
        assert_eq!(merged.transmission, Transmission::Manual);
        assert_eq!(merged.listing_relative_time.as_deref(), Some("Yesterday"));
        assert_eq!(merged.listing_date, Some(t0() - Duration::days(1)));
    }

    #[test]
    fn test_fresh_value_replaces_stored_value() {
        let (prior, _) = reconcile(Dataset::new(), vec![listing("A", Some(20_000))], t0());
        let (next, _) = reconcile(prior, vec![listing("A", Some(18_500))], t0());
        assert_eq!(next.get("A").unwrap().price, Some(18_500));
    }

    #[test]
    fn test_duplicate_ids_collapse_to_latest() {
        let mut later = listing("A", Some(19_000));
        later.mileage = Some(Mileage::Km(70_000));
        let (dataset, report) = reconcile(
            Dataset::new(),
            vec![listing("A", Some(20_000)), later],
            t0(),
        );
        assert_eq!(dataset.len(), 1);
        assert_eq!(report.inserted, 1);
        let record = dataset.get("A").unwrap();
        assert_eq!(record.price, Some(19_000));
        assert_eq!(record.mileage, Some(Mileage::Km(70_000)));
    }

    #[test]
    fn test_unseen_records_deactivate() {
        let (prior, _) = reconcile(
            Dataset::new(),
            vec![listing("A", None), listing("B", None)],
            t0(),
        );
        let (next, report) = reconcile(prior, vec![listing("B", None), listing("C", None)], t0());

        assert_eq!(next.len(), 3);
        assert!(!next.get("A").unwrap().is_active);
        assert_eq!(next.get("A").unwrap().last_seen, Some(t0()));
        assert!(next.get("B").unwrap().is_active);
        assert!(next.get("C").unwrap().is_active);
        assert_eq!(
            report,
            ReconcileReport {
                inserted: 1,
                updated: 1,
                deactivated: 1,
                dropped: 0,
            }
        );
    }

    #[test]
    fn test_blank_id_dropped() {
        let (dataset, report) = reconcile(
            Dataset::new(),
            vec![listing(" ", Some(20_000)), listing("A", None)],
            t0(),
        );
        assert_eq!(dataset.len(), 1);
        assert_eq!(report.dropped, 1);
    }
}
