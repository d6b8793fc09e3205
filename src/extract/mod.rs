//! Raw listing text -> structured [`Listing`].

pub mod patterns;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{brand_of, AppConfig};
use crate::identity::assign_id;
use crate::models::{Listing, Mileage, SellerType};
use crate::sources::RawListing;

pub use patterns::{PatternLibrary, PatternRule, PatternSet};

/// Listings extracted from one capture run
#[derive(Debug, Default)]
pub struct BatchExtraction {
    pub listings: Vec<Listing>,
    pub rejected: usize,
}

/// Turns raw text blocks into listings. Holds only immutable configuration
/// and the capture instant, so it can be shared freely across blocks.
pub struct Extractor<'a> {
    config: &'a AppConfig,
    patterns: &'a PatternLibrary,
    captured_at: DateTime<Utc>,
}

/// Pattern result, else the vehicle default, else Unknown
fn with_default<T: Default + PartialEq + Copy>(found: Option<T>, fallback: Option<T>) -> T {
    match found {
        Some(value) if value != T::default() => value,
        _ => fallback.unwrap_or_default(),
    }
}

impl<'a> Extractor<'a> {
    pub fn new(
        config: &'a AppConfig,
        patterns: &'a PatternLibrary,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            patterns,
            captured_at,
        }
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Extract one listing, or `None` when the block is too short to be an ad.
    /// Fields that cannot be read are left absent or Unknown.
    pub fn extract(&self, raw_text: &str, tracked_vehicle: &str) -> Option<Listing> {
        let text = raw_text.trim();
        if text.chars().count() < self.config.min_text_len {
            debug!("Rejected text block ({} chars): {:?}", text.chars().count(), text);
            return None;
        }

        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let title = lines.first()?.to_string();
        let lower = text.to_lowercase();
        let patterns = self.patterns;

        // only the first year-like token counts
        let year = patterns
            .year
            .find(&title)
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .filter(|y| (1900..=2030).contains(y));

        let mileage = patterns
            .mileage
            .first_in_lines(&lines)
            .map(Mileage::Km)
            .or_else(|| {
                lines
                    .iter()
                    .any(|line| patterns.low_mileage.is_match(line))
                    .then_some(Mileage::Low)
            });

        // The first amount is the asking price; below the threshold it is a
        // placeholder, so the listing has no price at all.
        let price = patterns
            .price
            .first_in_lines(&lines)
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p >= self.config.min_price);

        let location = self.find_location(&lines);

        let profile = self.config.vehicle(tracked_vehicle);
        let cued = profile.filter(|p| p.has_identity_cue(&lower));

        let transmission = with_default(
            patterns.transmission.first_match(text),
            cued.and_then(|p| p.transmission),
        );
        let fuel_type = with_default(
            patterns.fuel.first_match(text),
            cued.and_then(|p| p.fuel_type),
        );
        let body_style = with_default(
            patterns.body.first_match(text),
            cued.and_then(|p| p.body_style),
        );

        let is_auction = patterns.auction_keywords.iter().any(|k| lower.contains(k));
        let seller_type = if patterns.dealer_keywords.iter().any(|k| lower.contains(k)) {
            SellerType::Dealer
        } else {
            SellerType::Private
        };

        let listed = patterns.listed.first_in_lines(&lines);
        let auction_end = patterns.auction_end.first_in_lines(&lines).map(|phrase| {
            match patterns.end_time.first_in_lines(&lines) {
                Some(time) => phrase.with_time(time),
                None => phrase,
            }
        });

        let (tracked_vehicle, brand) = match profile {
            Some(p) => (p.name.clone(), p.brand()),
            None => (tracked_vehicle.trim().to_string(), brand_of(tracked_vehicle)),
        };

        Some(Listing {
            id: assign_id(&title, location.as_deref(), year),
            title,
            year,
            tracked_vehicle,
            brand,
            mileage,
            price,
            location,
            transmission,
            fuel_type,
            body_style,
            is_auction,
            seller_type,
            listing_relative_time: listed.as_ref().map(|p| p.to_string()),
            listing_date: listed.as_ref().and_then(|p| p.resolve(self.captured_at)),
            auction_end_relative: auction_end.as_ref().map(|p| p.to_string()),
            auction_end_date: auction_end.as_ref().and_then(|p| p.resolve(self.captured_at)),
            captured_at: self.captured_at,
            is_active: false,
            first_seen: None,
            last_seen: None,
            tier: None,
            search_hints: None,
        })
    }

    /// Extract every block of a run; rejected blocks are only counted.
    pub fn extract_all<'r, I>(&self, raws: I) -> BatchExtraction
    where
        I: IntoIterator<Item = &'r RawListing>,
    {
        let mut batch = BatchExtraction::default();
        for raw in raws {
            match self.extract(&raw.raw_text, &raw.tracked_vehicle) {
                Some(listing) => batch.listings.push(listing),
                None => batch.rejected += 1,
            }
        }
        batch
    }

    fn find_location(&self, lines: &[&str]) -> Option<String> {
        let places: Vec<String> = self
            .config
            .locations
            .iter()
            .map(|p| p.to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        lines
            .iter()
            .find(|line| {
                let line = line.to_lowercase();
                places.iter().any(|place| line.contains(place.as_str()))
            })
            .map(|line| line.to_string())
    }
}
