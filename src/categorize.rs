//! Desirability tiers from model year and asking price.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Steal,
    Optimal,
    Budget,
    Avoid,
    Other,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Steal => "steal",
            Tier::Optimal => "optimal",
            Tier::Budget => "budget",
            Tier::Avoid => "avoid",
            Tier::Other => "other",
        };
        f.write_str(label)
    }
}

/// Inclusive year range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn new(from: i32, to: i32) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.from..=self.to).contains(&year)
    }
}

/// Inclusive price band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: u32,
    pub max: u32,
}

impl PriceBand {
    pub fn contains(&self, price: u32) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

/// Year/price buying rules. Year rules dominate: an avoid-year is always
/// `avoid`, whatever the price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRules {
    pub avoid_years: YearRange,
    pub sweet_spot_years: YearRange,
    pub acceptable_years: YearRange,
    pub budget: PriceBand,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            // valve spring recall
            avoid_years: YearRange::new(2012, 2013),
            sweet_spot_years: YearRange::new(2015, 2016),
            acceptable_years: YearRange::new(2014, 2014),
            budget: PriceBand {
                min: 18_000,
                max: 23_000,
            },
        }
    }
}

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern"));

impl CategoryRules {
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("avoid_years", self.avoid_years),
            ("sweet_spot_years", self.sweet_spot_years),
            ("acceptable_years", self.acceptable_years),
        ] {
            if range.from > range.to {
                bail!("{name}: {} is after {}", range.from, range.to);
            }
        }
        if self.budget.min > self.budget.max {
            bail!("budget: {} is above {}", self.budget.min, self.budget.max);
        }
        Ok(())
    }

    pub fn categorize(&self, year: Option<i32>, price: Option<u32>) -> Tier {
        let Some(year) = year else {
            return Tier::Other;
        };
        let in_budget = price.is_some_and(|p| self.budget.contains(p));

        if self.avoid_years.contains(year) {
            Tier::Avoid
        } else if self.sweet_spot_years.contains(year) {
            if in_budget {
                Tier::Steal
            } else {
                Tier::Optimal
            }
        } else if self.acceptable_years.contains(year) {
            if in_budget {
                Tier::Budget
            } else {
                Tier::Optimal
            }
        } else {
            Tier::Other
        }
    }

    /// Same rules over loosely formatted cells like "2015" and "$18,500".
    /// Anything unparseable is treated as missing.
    pub fn categorize_text(&self, year: &str, price: &str) -> Tier {
        self.categorize(parse_year(year), parse_price(price))
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    NUMBER_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Year cell to integer, only when it is a plausible model year
pub fn parse_year(text: &str) -> Option<i32> {
    let value = parse_number(text)?;
    (1900.0..=2030.0)
        .contains(&value)
        .then_some(value as i32)
}

pub fn parse_price(text: &str) -> Option<u32> {
    let value = parse_number(text)?;
    (value >= 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_rule_dominates_price() {
        let rules = CategoryRules::default();
        assert_eq!(rules.categorize(Some(2012), Some(20_000)), Tier::Avoid);
        assert_eq!(rules.categorize(Some(2013), None), Tier::Avoid);
    }

    #[test]
    fn test_sweet_spot_and_acceptable_years() {
        let rules = CategoryRules::default();
        assert_eq!(rules.categorize(Some(2015), Some(18_000)), Tier::Steal);
        assert_eq!(rules.categorize(Some(2016), Some(23_000)), Tier::Steal);
        assert_eq!(rules.categorize(Some(2016), Some(23_001)), Tier::Optimal);
        assert_eq!(rules.categorize(Some(2015), None), Tier::Optimal);
        assert_eq!(rules.categorize(Some(2014), Some(19_500)), Tier::Budget);
        assert_eq!(rules.categorize(Some(2014), Some(30_000)), Tier::Optimal);
    }

    #[test]
    fn test_other_years_and_missing_year() {
        let rules = CategoryRules::default();
        assert_eq!(rules.categorize(Some(2019), Some(20_000)), Tier::Other);
        assert_eq!(rules.categorize(None, Some(20_000)), Tier::Other);
    }

    #[test]
    fn test_categorize_text_is_defensive() {
        let rules = CategoryRules::default();
        assert_eq!(rules.categorize_text("2015", "$18,500"), Tier::Steal);
        assert_eq!(rules.categorize_text("2015.0", "19000"), Tier::Steal);
        assert_eq!(rules.categorize_text("N/A", "$18,500"), Tier::Other);
        assert_eq!(rules.categorize_text("2016", "call for price"), Tier::Optimal);
        assert_eq!(rules.categorize_text("", ""), Tier::Other);
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let mut rules = CategoryRules::default();
        assert!(rules.validate().is_ok());
        rules.sweet_spot_years = YearRange::new(2016, 2015);
        assert!(rules.validate().is_err());
    }
}
