//! Search terms and URLs for finding a listing again by hand.

use serde::{Deserialize, Serialize};

use crate::models::Listing;

const MAX_TERMS: usize = 5;
const SEARCH_URL_TERMS: usize = 3;
const IMAGE_URL_TERMS: usize = 2;

/// Base URLs the hints are built on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Listing site search, the encoded term is appended
    pub listing_search_url: String,
    /// Web search, the encoded term is appended
    pub google_search_url: String,
    /// Restricts web results to the listing site
    pub site_filter: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            listing_search_url: "https://www.trademe.co.nz/a/motors/cars/search?search_string="
                .to_string(),
            google_search_url: "https://www.google.com/search?q=".to_string(),
            site_filter: "site:trademe.co.nz".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHints {
    pub primary_term: String,
    pub terms: Vec<String>,
    pub listing_urls: Vec<String>,
    pub google_urls: Vec<String>,
    pub google_image_urls: Vec<String>,
}

fn encode(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join("+")
}

/// Up to five distinct terms, most specific combinations of vehicle and year first
pub fn search_terms(listing: &Listing) -> Vec<String> {
    let vehicle = if listing.tracked_vehicle.trim().is_empty() {
        listing.brand.trim()
    } else {
        listing.tracked_vehicle.trim()
    };
    let location = listing
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());
    let title = listing.title.trim();

    let mut candidates = Vec::new();
    if let Some(year) = listing.year {
        candidates.push(format!("{vehicle} {year}"));
        candidates.push(format!("{year} {vehicle}"));
    }
    if let Some(location) = location {
        candidates.push(format!("{vehicle} {location}"));
        if let Some(year) = listing.year {
            candidates.push(format!("{vehicle} {year} {location}"));
        }
    }
    // short titles are rarely specific enough to search on
    if title.chars().count() > 10 {
        candidates.push(title.to_string());
        if let Some(location) = location {
            candidates.push(format!("{title} {location}"));
        }
    }

    let mut terms: Vec<String> = Vec::new();
    for term in candidates {
        let term = term.trim().to_string();
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms.truncate(MAX_TERMS);
    terms
}

pub fn search_hints(listing: &Listing, config: &SearchConfig) -> SearchHints {
    let terms = search_terms(listing);
    let primary_term = terms.first().cloned().unwrap_or_else(|| {
        if listing.tracked_vehicle.trim().is_empty() {
            listing.brand.trim().to_string()
        } else {
            listing.tracked_vehicle.trim().to_string()
        }
    });

    let web_query = |term: &str| {
        format!(
            "{}{}+{}",
            config.google_search_url,
            encode(term),
            config.site_filter
        )
    };

    SearchHints {
        listing_urls: terms
            .iter()
            .take(SEARCH_URL_TERMS)
            .map(|t| format!("{}{}", config.listing_search_url, encode(t)))
            .collect(),
        google_urls: terms.iter().take(SEARCH_URL_TERMS).map(|t| web_query(t)).collect(),
        google_image_urls: terms
            .iter()
            .take(IMAGE_URL_TERMS)
            .map(|t| format!("{}&tbm=isch", web_query(t)))
            .collect(),
        primary_term,
        terms,
    }
}
