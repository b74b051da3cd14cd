use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::EntityBag;

pub const PERSON_LABEL: &str = "PER";

pub const SERVICE_NAMES: &[&str] = &[
    "Yoga Beginner",
    "Strength Training",
    "Zumba Advanced",
    "HIIT Express",
    "Pilates Intermediate",
    "Meditation Basics",
];

pub const STATUS_NAMES: &[&str] = &["Upcoming", "Scheduled", "Completed", "Ongoing", "Canceled"];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_ALIASES: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("sept", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{10}\b").expect("valid phone regex"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("valid year regex"));
static CLASS_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)class[_\s]?(\d+)").expect("valid class id regex"));

/// Resolves a month name or abbreviation (any case) to its number.
pub fn month_number(token: &str) -> Option<u32> {
    let lower = token.trim().to_lowercase();
    MONTH_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, number)| *number)
}

pub fn month_name(number: u32) -> Option<&'static str> {
    MONTH_NAMES.get(number.checked_sub(1)? as usize).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Email,
    Phone,
    Month,
    Year,
    Status,
    Misc,
    ClassId,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
            Self::Status => "STATUS",
            Self::Misc => "MISC",
            Self::ClassId => "CLASS_ID",
        }
    }

    /// Runs this extractor. Absence is `None`, never an error.
    pub fn extract(self, text: &str) -> Option<String> {
        match self {
            Self::Email => EMAIL_RE.find(text).map(|m| m.as_str().to_string()),
            Self::Phone => PHONE_RE.find(text).map(|m| m.as_str().to_string()),
            // Abbreviations expand to the full name ("mar" -> "March"), not a
            // capitalized copy of the token, so the revenue tool sees one form.
            Self::Month => text
                .split_whitespace()
                .map(|word| word.trim_matches(|ch: char| !ch.is_alphanumeric()))
                .find_map(month_number)
                .and_then(month_name)
                .map(str::to_string),
            Self::Year => YEAR_RE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            Self::Status => first_listed_in(text, STATUS_NAMES),
            Self::Misc => first_listed_in(text, SERVICE_NAMES),
            Self::ClassId => CLASS_ID_RE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|digits| format!("class_{}", digits.as_str())),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn first_listed_in(text: &str, catalog: &[&str]) -> Option<String> {
    let lower = text.to_lowercase();
    catalog
        .iter()
        .find(|entry| lower.contains(&entry.to_lowercase()))
        .map(|entry| entry.to_string())
}

/// Fixed battery of lookup/regex extractors whose hits override tagger values.
#[derive(Debug, Clone, Copy)]
pub struct DomainExtractor {
    kinds: &'static [EntityKind],
}

impl DomainExtractor {
    pub fn new(kinds: &'static [EntityKind]) -> Self {
        Self { kinds }
    }

    pub fn kinds(&self) -> &'static [EntityKind] {
        self.kinds
    }

    pub fn extract(&self, text: &str) -> Vec<(EntityKind, String)> {
        self.kinds
            .iter()
            .filter_map(|kind| kind.extract(text).map(|value| (*kind, value)))
            .collect()
    }

    /// Writes every extractor hit into `bag`, replacing merged values. Returns the hit count.
    pub fn overlay(&self, text: &str, bag: &mut EntityBag) -> usize {
        let hits = self.extract(text);
        let count = hits.len();
        for (kind, value) in hits {
            bag.insert(kind.label(), Value::String(value));
        }
        count
    }
}
