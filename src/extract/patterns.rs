//! Recognition rules for every extracted attribute.
//!
//! Each attribute has a [`PatternSet`]: an ordered table of
//! (pattern, handler) rules. Rules are tried in order and the first one whose
//! pattern matches and whose handler accepts the captures wins.

use chrono::NaiveTime;
use regex::{Captures, Regex};

use crate::models::{BodyStyle, FuelType, Transmission};
use crate::temporal::{parse_absolute_date, parse_clock, EndPhrase, ListedPhrase};

pub type Handler<T> = fn(&Captures<'_>) -> Option<T>;

pub struct PatternRule<T> {
    pub name: &'static str,
    pattern: Regex,
    handler: Handler<T>,
}

impl<T> PatternRule<T> {
    /// Built-in patterns are literals, so a compile failure is a programming error.
    pub fn new(name: &'static str, pattern: &str, handler: Handler<T>) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("built-in pattern '{name}' does not compile: {e}"));
        Self {
            name,
            pattern,
            handler,
        }
    }

    pub fn apply(&self, text: &str) -> Option<T> {
        self.pattern
            .captures(text)
            .and_then(|caps| (self.handler)(&caps))
    }
}

pub struct PatternSet<T> {
    rules: Vec<PatternRule<T>>,
}

impl<T> PatternSet<T> {
    pub fn new(rules: Vec<PatternRule<T>>) -> Self {
        Self { rules }
    }

    pub fn first_match(&self, text: &str) -> Option<T> {
        self.rules.iter().find_map(|rule| rule.apply(text))
    }

    /// Result from the first line that any rule recognizes
    pub fn first_in_lines(&self, lines: &[&str]) -> Option<T> {
        lines.iter().find_map(|line| self.first_match(line))
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }
}

/// The complete rule table used by the field extractor
pub struct PatternLibrary {
    pub year: Regex,
    pub mileage: PatternSet<u32>,
    pub low_mileage: Regex,
    /// Whole currency units, before the plausibility threshold is applied
    pub price: PatternSet<u64>,
    pub transmission: PatternSet<Transmission>,
    pub fuel: PatternSet<FuelType>,
    pub body: PatternSet<BodyStyle>,
    pub listed: PatternSet<ListedPhrase>,
    pub auction_end: PatternSet<EndPhrase>,
    pub end_time: PatternSet<NaiveTime>,
    pub auction_keywords: Vec<&'static str>,
    pub dealer_keywords: Vec<&'static str>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

/// "18,500" or "18500"
pub fn parse_grouped_number(text: &str) -> Option<u64> {
    text.replace(',', "").parse().ok()
}

const DATE: &str = r"(?:(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*,?\s+)?(?:\d{1,2}(?:st|nd|rd|th)?\s+[a-z]{3,9}(?:\s+\d{4})?|\d{1,2}[/-]\d{1,2}[/-]\d{4}|\d{4}-\d{2}-\d{2}|[a-z]{3,9}\s+\d{1,2}(?:,?\s+\d{4})?)";
const END: &str = r"(?:ending|ends?|closing|closes)";

fn dated(caps: &Captures<'_>) -> Option<String> {
    let text = caps.get(1)?.as_str().trim();
    parse_absolute_date(text, 2000).map(|_| text.to_string())
}

fn amount(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn is_unit(caps: &Captures<'_>, group: usize, prefix: &str) -> bool {
    caps.get(group)
        .is_some_and(|m| m.as_str().to_lowercase().starts_with(prefix))
}

impl PatternLibrary {
    pub fn standard() -> Self {
        Self {
            year: Regex::new(r"\b(?:19|20)\d{2}\b").expect("year pattern"),

            mileage: PatternSet::new(vec![
                PatternRule::new("km", r"(?i)\b(\d{1,3}(?:,\d{3})+|\d+)\s*kms?\b", |c| {
                    parse_grouped_number(&c[1]).and_then(|km| u32::try_from(km).ok())
                }),
                PatternRule::new("thousands km", r"(?i)\b(\d+(?:\.\d+)?)k\s*kms?\b", |c| {
                    let thousands: f64 = c[1].parse().ok()?;
                    Some((thousands * 1000.0).round() as u32)
                }),
            ]),
            low_mileage: Regex::new(r"(?i)\b(?:super\s+|very\s+)?low\s*kms?\b")
                .expect("low km pattern"),

            price: PatternSet::new(vec![PatternRule::new(
                "dollars",
                r"\$\s?(\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?",
                |c| parse_grouped_number(&c[1]),
            )]),

            transmission: PatternSet::new(vec![
                PatternRule::new(
                    "keyword",
                    r"(?i)\b(manual|automatic|auto|tiptronic|cvt)\b",
                    |c| match c[1].to_lowercase().as_str() {
                        "manual" => Some(Transmission::Manual),
                        "cvt" => Some(Transmission::Cvt),
                        _ => Some(Transmission::Automatic),
                    },
                ),
                // gearbox codes such as "6M" / "6A"
                PatternRule::new("gear code", r"(?i)\b\d([am])\b", |c| {
                    if c[1].eq_ignore_ascii_case("m") {
                        Some(Transmission::Manual)
                    } else {
                        Some(Transmission::Automatic)
                    }
                }),
            ]),

            fuel: PatternSet::new(vec![
                PatternRule::new(
                    "keyword",
                    r"(?i)\b(petrol|gasoline|unleaded|diesel|hybrid|electric)\b",
                    |c| match c[1].to_lowercase().as_str() {
                        "diesel" => Some(FuelType::Diesel),
                        "hybrid" => Some(FuelType::Hybrid),
                        "electric" => Some(FuelType::Electric),
                        _ => Some(FuelType::Petrol),
                    },
                ),
                PatternRule::new("displacement", r"(?i)\b\d\.\d\s*([pd])\b", |c| {
                    if c[1].eq_ignore_ascii_case("p") {
                        Some(FuelType::Petrol)
                    } else {
                        Some(FuelType::Diesel)
                    }
                }),
            ]),

            body: PatternSet::new(vec![
                PatternRule::new(
                    "keyword",
                    r"(?i)\b(coupe|coupé|sedan|saloon|hatchback|hatch|wagon|estate|suv|convertible|cabriolet|roadster)\b",
                    |c| match c[1].to_lowercase().as_str() {
                        "coupe" | "coupé" => Some(BodyStyle::Coupe),
                        "sedan" | "saloon" => Some(BodyStyle::Sedan),
                        "hatchback" | "hatch" => Some(BodyStyle::Hatchback),
                        "wagon" | "estate" => Some(BodyStyle::Wagon),
                        "suv" => Some(BodyStyle::Suv),
                        _ => Some(BodyStyle::Convertible),
                    },
                ),
                PatternRule::new("doors", r"(?i)\b([2-5])\s*-?\s*(?:dr|doors?)\b", |c| {
                    match &c[1] {
                        "2" => Some(BodyStyle::Coupe),
                        "4" => Some(BodyStyle::Sedan),
                        _ => Some(BodyStyle::Hatchback),
                    }
                }),
            ]),

            listed: PatternSet::new(vec![
                PatternRule::new(
                    "within a week",
                    r"(?i)\b(?:listed\s+)?within\s+the\s+last\s+7\s+days\b",
                    |_| Some(ListedPhrase::WithinWeek),
                ),
                PatternRule::new("yesterday", r"(?i)\blisted\s+yesterday\b", |_| {
                    Some(ListedPhrase::Yesterday)
                }),
                PatternRule::new("today", r"(?i)\blisted\s+today\b", |_| {
                    Some(ListedPhrase::Today)
                }),
                PatternRule::new(
                    "ago",
                    r"(?i)\blisted\s+(\d+)\s+(minute|min|hour|hr)s?\s+ago\b",
                    |c| {
                        let n = amount(c, 1)?;
                        if is_unit(c, 2, "m") {
                            Some(ListedPhrase::MinutesAgo(n))
                        } else {
                            Some(ListedPhrase::HoursAgo(n))
                        }
                    },
                ),
                PatternRule::new(
                    "dated",
                    &format!(r"(?i)\blisted(?:\s+on)?:?\s+({DATE})"),
                    |c| dated(c).map(ListedPhrase::Dated),
                ),
            ]),

            auction_end: PatternSet::new(vec![
                PatternRule::new("today", &format!(r"(?i)\b{END}\s+today\b"), |_| {
                    Some(EndPhrase::Today(None))
                }),
                PatternRule::new("tomorrow", &format!(r"(?i)\b{END}\s+tomorrow\b"), |_| {
                    Some(EndPhrase::Tomorrow(None))
                }),
                PatternRule::new(
                    "in",
                    &format!(r"(?i)\b{END}\s+in\s+(\d+)\s+(day|hour|hr)s?\b"),
                    |c| {
                        let n = amount(c, 1)?;
                        if is_unit(c, 2, "d") {
                            Some(EndPhrase::InDays(n))
                        } else {
                            Some(EndPhrase::InHours(n))
                        }
                    },
                ),
                PatternRule::new(
                    "dated",
                    &format!(r"(?i)\b{END}(?:\s+on)?:?\s+({DATE})"),
                    |c| dated(c).map(|d| EndPhrase::Dated(d, None)),
                ),
            ]),

            end_time: PatternSet::new(vec![PatternRule::new(
                "at",
                &format!(r"(?i)\b{END}\b.*?\bat\s+(\d{{1,2}}:\d{{2}}\s*(?:am|pm)?)"),
                |c| parse_clock(&c[1]),
            )]),

            auction_keywords: vec!["auction", "bid", "reserve", "ending"],
            dealer_keywords: vec!["dealer", "motors", "cars", "auto", "ltd", "limited"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib() -> PatternLibrary {
        PatternLibrary::standard()
    }

    #[test]
    fn test_mileage_rules() {
        let lib = lib();
        assert_eq!(lib.mileage.first_match("85,000 km"), Some(85_000));
        assert_eq!(lib.mileage.first_match("85000km"), Some(85_000));
        assert_eq!(lib.mileage.first_match("Odometer 120,500 kms"), Some(120_500));
        assert_eq!(lib.mileage.first_match("62k km"), Some(62_000));
        assert_eq!(lib.mileage.first_match("Auckland"), None);
        assert!(lib.low_mileage.is_match("Super low kms!"));
        assert!(lib.low_mileage.is_match("low km"));
    }

    #[test]
    fn test_price_rule_reads_grouped_and_plain_amounts() {
        let lib = lib();
        assert_eq!(lib.price.first_match("Asking $18,500"), Some(18_500));
        assert_eq!(lib.price.first_match("$18500"), Some(18_500));
        assert_eq!(lib.price.first_match("$500.00"), Some(500));
        assert_eq!(lib.price.first_match("NZ$ 21,990"), Some(21_990));
        assert_eq!(lib.price.first_match("no price"), None);
    }

    #[test]
    fn test_transmission_rules() {
        let lib = lib();
        assert_eq!(lib.transmission.first_match("6 speed manual"), Some(Transmission::Manual));
        assert_eq!(lib.transmission.first_match("Automatic"), Some(Transmission::Automatic));
        assert_eq!(lib.transmission.first_match("CVT gearbox"), Some(Transmission::Cvt));
        assert_eq!(lib.transmission.first_match("2.0P 6A"), Some(Transmission::Automatic));
        assert_eq!(lib.transmission.first_match("GT 6M"), Some(Transmission::Manual));
        assert_eq!(lib.transmission.first_match("GT86 coupe"), None);
    }

    #[test]
    fn test_fuel_rules() {
        let lib = lib();
        assert_eq!(lib.fuel.first_match("unleaded"), Some(FuelType::Petrol));
        assert_eq!(lib.fuel.first_match("Hybrid"), Some(FuelType::Hybrid));
        assert_eq!(lib.fuel.first_match("2.0D 6M"), Some(FuelType::Diesel));
        assert_eq!(lib.fuel.first_match("2.0P"), Some(FuelType::Petrol));
        assert_eq!(lib.fuel.first_match("2.0i"), None);
    }

    #[test]
    fn test_body_rules() {
        let lib = lib();
        assert_eq!(lib.body.first_match("GT Coupe"), Some(BodyStyle::Coupe));
        assert_eq!(lib.body.first_match("Station wagon"), Some(BodyStyle::Wagon));
        assert_eq!(lib.body.first_match("2 door"), Some(BodyStyle::Coupe));
        assert_eq!(lib.body.first_match("4dr"), Some(BodyStyle::Sedan));
        assert_eq!(lib.body.first_match("5 doors"), Some(BodyStyle::Hatchback));
        assert_eq!(lib.body.first_match("Roadster"), Some(BodyStyle::Convertible));
    }

    #[test]
    fn test_listed_rules() {
        let lib = lib();
        assert_eq!(
            lib.listed.first_match("Listed within the last 7 days"),
            Some(ListedPhrase::WithinWeek)
        );
        assert_eq!(lib.listed.first_match("Listed yesterday"), Some(ListedPhrase::Yesterday));
        assert_eq!(lib.listed.first_match("listed today"), Some(ListedPhrase::Today));
        assert_eq!(
            lib.listed.first_match("Listed 3 hours ago"),
            Some(ListedPhrase::HoursAgo(3))
        );
        assert_eq!(
            lib.listed.first_match("Listed 12 mins ago"),
            Some(ListedPhrase::MinutesAgo(12))
        );
        assert_eq!(
            lib.listed.first_match("Listed: Mon 23 Sep"),
            Some(ListedPhrase::Dated("Mon 23 Sep".to_string()))
        );
        assert_eq!(lib.listed.first_match("Listed recently"), None);
    }

    #[test]
    fn test_auction_end_rules() {
        let lib = lib();
        assert_eq!(lib.auction_end.first_match("Ending today"), Some(EndPhrase::Today(None)));
        assert_eq!(
            lib.auction_end.first_match("Closes tomorrow"),
            Some(EndPhrase::Tomorrow(None))
        );
        assert_eq!(lib.auction_end.first_match("Ends in 2 days"), Some(EndPhrase::InDays(2)));
        assert_eq!(lib.auction_end.first_match("Ending in 5 hours"), Some(EndPhrase::InHours(5)));
        assert_eq!(
            lib.auction_end.first_match("Ends 25 Sep 2024"),
            Some(EndPhrase::Dated("25 Sep 2024".to_string(), None))
        );
        assert_eq!(
            lib.auction_end.first_match("Ending 25/09/2024"),
            Some(EndPhrase::Dated("25/09/2024".to_string(), None))
        );
        assert_eq!(
            lib.end_time.first_match("Ends Sep 25 at 7:30 pm"),
            NaiveTime::from_hms_opt(19, 30, 0)
        );
    }

    #[test]
    fn test_first_in_lines_prefers_earlier_line() {
        let lib = lib();
        let lines = ["2016 Toyota 86", "$19,000", "$25,000"];
        assert_eq!(lib.price.first_in_lines(&lines), Some(19_000));
    }

    #[test]
    fn test_rule_order_is_declared_order() {
        assert_eq!(lib().transmission.rule_names(), vec!["keyword", "gear code"]);
    }
}
