//! Event and photo records.
//!
//! These are the JSON documents persisted in the key-value store, one event
//! per key. Field names follow the stored layout (`maxDuration`,
//! `uploadLink`, `createdAt`, ...).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{SnapError, SnapResult};
use crate::expiry::{self, Remaining};

/// A photo-collection session with a retention window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    /// Real-world date of the gathering, distinct from `created_at`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    pub max_duration: RetentionDays,
    #[serde(default)]
    pub upload_link: String,
    #[serde(default)]
    pub gallery_link: String,
    pub created_at: DateTime<Utc>,
    /// Upload order. Only ever appended to by ingestion.
    #[serde(default)]
    pub photos: Vec<Photo>,

    /// Fields this version doesn't know about, kept so a read-modify-write
    /// doesn't drop them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    pub fn expires_at(&self) -> DateTime<Utc> {
        expiry::expires_at(self.created_at, self.max_duration)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Remaining {
        expiry::remaining(self.created_at, self.max_duration, now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_expired()
    }

    /// Sum of the sizes recorded on the photos (unknown sizes count as zero).
    pub fn total_photo_bytes(&self) -> u64 {
        self.photos.iter().filter_map(|p| p.size).sum()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Metadata for one uploaded image.
///
/// `url` points into the process-local blob registry. The bytes behind it
/// are never persisted, so after a restart the reference dangles while the
/// record itself survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    /// Original file name, not sanitized or deduplicated.
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mime_type: Option<String>,
}

/// Retention window in days. Only these five values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RetentionDays {
    One,
    Three,
    #[default]
    Seven,
    Fourteen,
    Thirty,
}

impl RetentionDays {
    pub const ALL: [RetentionDays; 5] = [
        RetentionDays::One,
        RetentionDays::Three,
        RetentionDays::Seven,
        RetentionDays::Fourteen,
        RetentionDays::Thirty,
    ];

    pub fn days(self) -> u32 {
        match self {
            RetentionDays::One => 1,
            RetentionDays::Three => 3,
            RetentionDays::Seven => 7,
            RetentionDays::Fourteen => 14,
            RetentionDays::Thirty => 30,
        }
    }
}

impl TryFrom<u32> for RetentionDays {
    type Error = SnapError;

    fn try_from(days: u32) -> SnapResult<Self> {
        RetentionDays::ALL
            .into_iter()
            .find(|r| r.days() == days)
            .ok_or_else(|| {
                SnapError::InvalidInput(format!(
                    "retention must be one of 1, 3, 7, 14 or 30 days (got {days})"
                ))
            })
    }
}

impl From<RetentionDays> for u32 {
    fn from(r: RetentionDays) -> u32 {
        r.days()
    }
}

impl FromStr for RetentionDays {
    type Err = SnapError;

    fn from_str(s: &str) -> SnapResult<Self> {
        let days: u32 = s
            .trim()
            .parse()
            .map_err(|_| SnapError::InvalidInput(format!("'{s}' is not a number of days")))?;
        RetentionDays::try_from(days)
    }
}

impl fmt::Display for RetentionDays {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.days() {
            1 => write!(f, "1 day"),
            n => write!(f, "{n} days"),
        }
    }
}

/// Fields a caller supplies when creating an event.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub max_duration: RetentionDays,
}

impl NewEvent {
    pub fn new(name: impl Into<String>) -> Self {
        NewEvent {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_duration(mut self, max_duration: RetentionDays) -> Self {
        self.max_duration = max_duration;
        self
    }
}

/// Shallow update of an event. `None` leaves a field untouched; `photos`
/// replaces the whole sequence.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<Option<NaiveDate>>,
    pub description: Option<Option<String>>,
    pub max_duration: Option<RetentionDays>,
    pub photos: Option<Vec<Photo>>,
}

impl EventPatch {
    pub fn apply(self, event: &mut Event) {
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(description) = self.description {
            event.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(max_duration) = self.max_duration {
            event.max_duration = max_duration;
        }
        if let Some(photos) = self.photos {
            event.photos = photos;
        }
    }
}

pub(crate) fn validate_name(name: &str) -> SnapResult<()> {
    if name.trim().is_empty() {
        return Err(SnapError::InvalidInput("event name must not be empty".into()));
    }
    Ok(())
}

/// Older records store unset optional fields as `""`.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
