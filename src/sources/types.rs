use serde::{Deserialize, Serialize};

/// One unparsed listing card as it was captured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Configured vehicle the search was run for
    pub tracked_vehicle: String,
    /// Visible card text, one line per text node
    pub raw_text: String,
}

impl RawListing {
    pub fn new(tracked_vehicle: &str, raw_text: &str) -> Self {
        Self {
            tracked_vehicle: tracked_vehicle.to_string(),
            raw_text: raw_text.to_string(),
        }
    }
}

/// How listing cards are found in a saved results page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotParams {
    /// CSS selector matching one listing card
    pub card_selector: String,
    /// Cards beyond this many are ignored
    pub max_cards: usize,
}

impl Default for SnapshotParams {
    fn default() -> Self {
        Self {
            card_selector: ".tm-motors-tier-one-search-card__listing-details-container".to_string(),
            max_cards: 20,
        }
    }
}
