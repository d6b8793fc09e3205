use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::categorize::Tier;
use crate::search::SearchHints;

mod dataset;

pub use dataset::Dataset;

/// Gearbox as advertised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    Manual,
    Automatic,
    #[serde(rename = "CVT")]
    Cvt,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    Electric,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyStyle {
    Coupe,
    Sedan,
    Hatchback,
    Wagon,
    #[serde(rename = "SUV")]
    Suv,
    Convertible,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellerType {
    Dealer,
    #[default]
    Private,
}

/// Odometer reading. `Low` is used when the ad only says "low km".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mileage {
    Km(u32),
    Low,
}

/// One observed vehicle advertisement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    /// Search the listing was captured from, e.g. "Toyota 86"
    pub tracked_vehicle: String,
    pub brand: String,
    pub mileage: Option<Mileage>,
    pub price: Option<u32>,
    pub location: Option<String>,
    #[serde(default)]
    pub transmission: Transmission,
    #[serde(default)]
    pub fuel_type: FuelType,
    #[serde(default)]
    pub body_style: BodyStyle,
    #[serde(default)]
    pub is_auction: bool,
    #[serde(default)]
    pub seller_type: SellerType,
    pub listing_relative_time: Option<String>,
    pub listing_date: Option<DateTime<Utc>>,
    pub auction_end_relative: Option<String>,
    pub auction_end_date: Option<DateTime<Utc>>,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub tier: Option<Tier>,
    pub search_hints: Option<SearchHints>,
}

impl Listing {
    pub fn price_type(&self) -> &'static str {
        if self.is_auction {
            "Auction"
        } else {
            "Buy Now"
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
            Transmission::Cvt => "CVT",
            Transmission::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Hybrid => "Hybrid",
            FuelType::Electric => "Electric",
            FuelType::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl fmt::Display for BodyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BodyStyle::Coupe => "Coupe",
            BodyStyle::Sedan => "Sedan",
            BodyStyle::Hatchback => "Hatchback",
            BodyStyle::Wagon => "Wagon",
            BodyStyle::Suv => "SUV",
            BodyStyle::Convertible => "Convertible",
            BodyStyle::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl fmt::Display for SellerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SellerType::Dealer => f.write_str("Dealer"),
            SellerType::Private => f.write_str("Private"),
        }
    }
}

impl fmt::Display for Mileage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mileage::Km(km) => write!(f, "{} km", group_thousands(u64::from(*km))),
            Mileage::Low => f.write_str("Low km"),
        }
    }
}

/// Format a number with comma thousands separators: 18500 -> "18,500"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
