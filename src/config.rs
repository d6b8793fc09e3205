//! Run configuration: tracked vehicles, place names and business rules.
//!
//! Everything here is immutable once loaded and is passed explicitly into the
//! extractor, categorizer and ranker.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::categorize::CategoryRules;
use crate::models::{BodyStyle, FuelType, Transmission};
use crate::search::SearchConfig;

/// A tracked vehicle search and the defaults used when its ads stay silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// Search key, e.g. "Subaru BRZ"
    pub name: String,
    /// Brand override; defaults to the first word of `name`
    #[serde(default)]
    pub brand: Option<String>,
    /// Lowercase tokens that identify this model in ad text
    #[serde(default)]
    pub identity_cues: Vec<String>,
    #[serde(default)]
    pub body_style: Option<BodyStyle>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default)]
    pub transmission: Option<Transmission>,
}

impl VehicleProfile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            brand: None,
            identity_cues: Vec::new(),
            body_style: None,
            fuel_type: None,
            transmission: None,
        }
    }

    pub fn brand(&self) -> String {
        self.brand
            .clone()
            .unwrap_or_else(|| brand_of(&self.name))
    }

    /// Whether the (lowercased) ad text carries one of this model's cues
    pub fn has_identity_cue(&self, text_lower: &str) -> bool {
        self.identity_cues
            .iter()
            .any(|cue| !cue.is_empty() && text_lower.contains(&cue.to_lowercase()))
    }
}

/// First word of a tracked vehicle key: "Toyota 86" -> "Toyota"
pub fn brand_of(tracked_vehicle: &str) -> String {
    tracked_vehicle
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vehicles: Vec<VehicleProfile>,
    /// Place-name tokens used to spot the location line
    pub locations: Vec<String>,
    /// Shorter text blocks are decorative page fragments, not listings
    pub min_text_len: usize,
    /// Prices below this are placeholders ("$1 reserve"), not asking prices
    pub min_price: u32,
    pub categories: CategoryRules,
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let coupe_profile = |name: &str| VehicleProfile {
            identity_cues: vec!["86".to_string(), "brz".to_string()],
            body_style: Some(BodyStyle::Coupe),
            fuel_type: Some(FuelType::Petrol),
            ..VehicleProfile::new(name)
        };

        Self {
            vehicles: vec![coupe_profile("Toyota 86"), coupe_profile("Subaru BRZ")],
            locations: [
                "auckland",
                "wellington",
                "christchurch",
                "hamilton",
                "tauranga",
                "dunedin",
                "palmerston north",
                "napier",
                "hastings",
                "nelson",
                "rotorua",
                "new plymouth",
                "whangarei",
                "invercargill",
                "upper hutt",
                "lower hutt",
                "porirua",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_text_len: 20,
            min_price: 1000,
            categories: CategoryRules::default(),
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file, or fall back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                let config: AppConfig = serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?;
                info!("Loaded config from {}", path.display());
                config
            }
            None => AppConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_text_len == 0 {
            bail!("min_text_len must be at least 1");
        }
        self.categories.validate()?;
        for vehicle in &self.vehicles {
            if vehicle.name.trim().is_empty() {
                bail!("Tracked vehicle with empty name");
            }
        }
        Ok(())
    }

    /// Profile for a tracked vehicle key, matched case-insensitively
    pub fn vehicle(&self, name: &str) -> Option<&VehicleProfile> {
        let name = name.trim();
        self.vehicles
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }
}
