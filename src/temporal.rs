//! Relative time phrases and written dates resolved into comparable moments.
//!
//! Ads say "Listed 3 hours ago", "Ending tomorrow" or "Ends 25 Sep". Each is
//! resolved against the capture instant of the run that saw it. A listing with
//! no usable signal gets [`UNKNOWN_MOMENT`], which always sorts last.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::models::Listing;

/// Placeholder moment for listings without any resolvable time signal
pub const UNKNOWN_MOMENT: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

pub fn is_unknown(moment: &DateTime<Utc>) -> bool {
    *moment == UNKNOWN_MOMENT
}

/// When the ad says it was posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListedPhrase {
    MinutesAgo(u32),
    HoursAgo(u32),
    Today,
    Yesterday,
    /// "Listed within the last 7 days"
    WithinWeek,
    /// A written date, kept as it appeared
    Dated(String),
}

/// When the ad says bidding closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndPhrase {
    Today(Option<NaiveTime>),
    Tomorrow(Option<NaiveTime>),
    InDays(u32),
    InHours(u32),
    Dated(String, Option<NaiveTime>),
}

static AGO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s+(minute|hour)s?\s+ago$").expect("ago pattern")
});
static IN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^in\s+(\d+)\s+(day|hour)s?$").expect("in pattern"));
static TRAILING_CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.*?)\s+(\d{1,2}:\d{2}\s*(?:am|pm)?)$").expect("trailing clock pattern")
});
static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(am|pm)?$").expect("clock pattern"));
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("weekday pattern")
});
static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").expect("ordinal pattern"));

const DATED_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%b %d %Y",
    "%b %d, %Y",
];

/// Year-less forms; the reference year is appended before parsing
const YEARLESS_FORMATS: &[&str] = &["%b %d %Y", "%d %b %Y"];

/// Parse a written date, trying each known format in order.
/// Dates written without a year are placed in `reference_year`.
pub fn parse_absolute_date(text: &str, reference_year: i32) -> Option<NaiveDate> {
    let text = text.trim();
    let text = WEEKDAY_RE.replace(text, "");
    let text = ORDINAL_RE.replace_all(&text, "$1");
    let text = text.trim().trim_end_matches(',');

    DATED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            let with_year = format!("{} {}", text, reference_year);
            YEARLESS_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&with_year, fmt).ok())
        })
}

/// "2:30 pm", "2:30PM" or "14:30"
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let caps = CLOCK_RE.captures(text.trim())?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;

    if let Some(meridiem) = caps.get(3) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn day_end(day: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    day.and_time(end).and_utc()
}

fn at_or_end(day: NaiveDate, time: Option<NaiveTime>) -> DateTime<Utc> {
    match time {
        Some(t) => NaiveDateTime::new(day, t).and_utc(),
        None => day_end(day),
    }
}

impl ListedPhrase {
    /// Read a phrase back from its display form
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let lower = text.to_lowercase();
        match lower.as_str() {
            "today" => return Some(ListedPhrase::Today),
            "yesterday" => return Some(ListedPhrase::Yesterday),
            _ => {}
        }
        if lower.contains("within") && lower.contains("7 days") {
            return Some(ListedPhrase::WithinWeek);
        }
        if let Some(caps) = AGO_RE.captures(text) {
            let amount: u32 = caps[1].parse().ok()?;
            return Some(if caps[2].eq_ignore_ascii_case("minute") {
                ListedPhrase::MinutesAgo(amount)
            } else {
                ListedPhrase::HoursAgo(amount)
            });
        }
        // leap year, so "29 Feb" validates
        parse_absolute_date(text, 2000).map(|_| ListedPhrase::Dated(text.to_string()))
    }

    pub fn resolve(&self, captured_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = captured_at.date_naive();
        match self {
            ListedPhrase::MinutesAgo(m) => {
                captured_at.checked_sub_signed(Duration::try_minutes(i64::from(*m))?)
            }
            ListedPhrase::HoursAgo(h) => {
                captured_at.checked_sub_signed(Duration::try_hours(i64::from(*h))?)
            }
            ListedPhrase::Today => Some(day_start(today)),
            ListedPhrase::Yesterday => today.pred_opt().map(day_start),
            ListedPhrase::WithinWeek => {
                let noon = NaiveTime::from_hms_opt(12, 0, 0)?;
                let day = today - Duration::days(7);
                Some(NaiveDateTime::new(day, noon).and_utc())
            }
            ListedPhrase::Dated(text) => {
                parse_absolute_date(text, captured_at.year()).map(day_start)
            }
        }
    }
}

impl EndPhrase {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(caps) = IN_RE.captures(text) {
            let amount: u32 = caps[1].parse().ok()?;
            return Some(if caps[2].eq_ignore_ascii_case("day") {
                EndPhrase::InDays(amount)
            } else {
                EndPhrase::InHours(amount)
            });
        }

        let (head, time) = match TRAILING_CLOCK_RE.captures(text) {
            Some(caps) => match parse_clock(&caps[2]) {
                Some(t) => (caps.get(1).map_or("", |m| m.as_str()), Some(t)),
                None => (text, None),
            },
            None => (text, None),
        };

        match head.to_lowercase().as_str() {
            "today" => Some(EndPhrase::Today(time)),
            "tomorrow" => Some(EndPhrase::Tomorrow(time)),
            _ => parse_absolute_date(head, 2000).map(|_| EndPhrase::Dated(head.to_string(), time)),
        }
    }

    /// Attach a closing time seen elsewhere in the ad
    pub fn with_time(self, time: NaiveTime) -> Self {
        match self {
            EndPhrase::Today(None) => EndPhrase::Today(Some(time)),
            EndPhrase::Tomorrow(None) => EndPhrase::Tomorrow(Some(time)),
            EndPhrase::Dated(date, None) => EndPhrase::Dated(date, Some(time)),
            other => other,
        }
    }

    pub fn resolve(&self, captured_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = captured_at.date_naive();
        match self {
            EndPhrase::Today(time) => Some(at_or_end(today, *time)),
            EndPhrase::Tomorrow(time) => today.succ_opt().map(|day| at_or_end(day, *time)),
            // out-of-range amounts resolve to nothing rather than overflowing
            EndPhrase::InDays(d) => {
                captured_at.checked_add_signed(Duration::try_days(i64::from(*d))?)
            }
            EndPhrase::InHours(h) => {
                captured_at.checked_add_signed(Duration::try_hours(i64::from(*h))?)
            }
            EndPhrase::Dated(text, time) => {
                parse_absolute_date(text, captured_at.year()).map(|day| at_or_end(day, *time))
            }
        }
    }
}

fn plural(amount: u32, unit: &str) -> String {
    if amount == 1 {
        format!("{} {}", amount, unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}

impl fmt::Display for ListedPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListedPhrase::MinutesAgo(m) => write!(f, "{} ago", plural(*m, "minute")),
            ListedPhrase::HoursAgo(h) => write!(f, "{} ago", plural(*h, "hour")),
            ListedPhrase::Today => f.write_str("Today"),
            ListedPhrase::Yesterday => f.write_str("Yesterday"),
            ListedPhrase::WithinWeek => f.write_str("Within 7 days"),
            ListedPhrase::Dated(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for EndPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, time) = match self {
            EndPhrase::InDays(d) => return write!(f, "In {}", plural(*d, "day")),
            EndPhrase::InHours(h) => return write!(f, "In {}", plural(*h, "hour")),
            EndPhrase::Today(time) => ("Today", time),
            EndPhrase::Tomorrow(time) => ("Tomorrow", time),
            EndPhrase::Dated(text, time) => (text.as_str(), time),
        };
        match time {
            Some(t) => write!(f, "{} {}", head, t.format("%H:%M")),
            None => f.write_str(head),
        }
    }
}

/// The moment a listing sorts by: auction end first, then posting time, else
/// [`UNKNOWN_MOMENT`]. A moment resolved at capture time is preferred over
/// re-reading its phrase.
pub fn sort_key(listing: &Listing) -> DateTime<Utc> {
    let captured_at = listing.captured_at;

    let auction_end = listing.auction_end_date.or_else(|| {
        listing
            .auction_end_relative
            .as_deref()
            .and_then(EndPhrase::parse)
            .and_then(|p| p.resolve(captured_at))
    });

    let listed = || {
        listing.listing_date.or_else(|| {
            listing
                .listing_relative_time
                .as_deref()
                .and_then(ListedPhrase::parse)
                .and_then(|p| p.resolve(captured_at))
        })
    };

    auction_end.or_else(listed).unwrap_or(UNKNOWN_MOMENT)
}
