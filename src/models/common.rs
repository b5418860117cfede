//! Common types shared across all models.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One page of a Spotify paging object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paging<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    /// Total number of items across all pages.
    #[serde(default)]
    pub total: u32,

    /// Page size requested.
    #[serde(default)]
    pub limit: u32,

    /// Index of the first item on this page.
    #[serde(default)]
    pub offset: u32,

    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Default for Paging<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit: 0,
            offset: 0,
            next: None,
        }
    }
}

impl<T> Paging<T> {
    /// Whether Spotify reports more items after this page.
    pub fn has_more(&self) -> bool {
        self.next.is_some() || (self.offset as usize + self.items.len()) < self.total as usize
    }
}

/// Follower count wrapper.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Followers {
    /// Total number of followers.
    #[serde(default)]
    pub total: u64,
}

/// Release date structure.
///
/// Spotify reports dates with day, month or year precision; the missing parts
/// stay `None`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseDate {
    /// Year of release.
    pub year: i32,

    /// Month of release (1-12), if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    /// Day of release (1-31), if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl ReleaseDate {
    /// Parse a date string in "YYYY", "YYYY-MM" or "YYYY-MM-DD" format.
    pub fn parse(date_str: &str) -> Self {
        if date_str.is_empty() {
            return Self::default();
        }

        let parts: Vec<&str> = date_str.trim().split('-').collect();

        Self {
            year: parts.first().and_then(|s| s.parse().ok()).unwrap_or(0),
            month: parts.get(1).and_then(|s| s.parse().ok()),
            day: parts.get(2).and_then(|s| s.parse().ok()),
        }
    }

    /// First calendar day covered by this date.
    ///
    /// Returns `None` for unknown years or out-of-range components.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        if self.year == 0 {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.month, self.day) {
            (Some(m), Some(d)) => write!(f, "{:04}-{:02}-{:02}", self.year, m, d),
            (Some(m), None) => write!(f, "{:04}-{:02}", self.year, m),
            _ => write!(f, "{:04}", self.year),
        }
    }
}
