//! Row types shared by every stage of the keyword and forecast pipelines.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A venue identifier under which papers are grouped.
///
/// The built-in set drives blacklist selection and forecast model dispatch.
/// Identifiers outside that set are carried as [`Conference::Other`] so the
/// keyword branch can still process them; the forecaster rejects them.
///
/// Ordering, equality and hashing all go through [`as_str`](Self::as_str), so
/// conferences sort alphabetically (`CVPR < ICLR < ICML < KDD`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Conference {
    Cvpr,
    Icml,
    Iclr,
    Kdd,
    /// Upper-cased identifier outside the built-in set.
    Other(String),
}

impl Conference {
    /// Every built-in conference, in display order.
    pub const KNOWN: [Conference; 4] = [
        Conference::Cvpr,
        Conference::Iclr,
        Conference::Icml,
        Conference::Kdd,
    ];

    /// Parse an identifier case-insensitively. Never fails: unknown names
    /// become [`Conference::Other`].
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CVPR" => Self::Cvpr,
            "ICML" => Self::Icml,
            "ICLR" => Self::Iclr,
            "KDD" => Self::Kdd,
            _ => Self::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Cvpr => "CVPR",
            Self::Icml => "ICML",
            Self::Iclr => "ICLR",
            Self::Kdd => "KDD",
            Self::Other(name) => name,
        }
    }

    /// Whether this conference belongs to the built-in set.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Conference {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Conference {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Conference> for String {
    fn from(c: Conference) -> Self {
        c.as_str().to_string()
    }
}

impl PartialEq for Conference {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Conference {}

impl Hash for Conference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialOrd for Conference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Conference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// One scraped paper listing entry, before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPaper {
    pub title: String,
    pub authors: Option<String>,
    pub year: i64,
    pub conference: Conference,
    pub doi_link: Option<String>,
    pub dblp_link: Option<String>,
}

/// A cleaned paper title tagged with its venue and year.
///
/// The title is lowercase, punctuation-stripped and whitespace-collapsed
/// (see [`clean_title`](crate::clean_title)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub year: i64,
    pub conference: Conference,
}

/// Occurrences of one canonical phrase in one (conference, year) group.
///
/// Rows of the intermediate keyword counts table. The column is named
/// `filtered_phrases` on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub conference: Conference,
    pub year: i64,
    pub phrase: String,
    pub count: i64,
}

/// A ranked keyword for one conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotKeyword {
    pub conference: Conference,
    pub keyword: String,
    pub hot_index: f64,
}

/// Number of papers a conference published (or is forecast to publish) in a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceYearCount {
    pub conference: Conference,
    pub year: i64,
    pub count: i64,
}
