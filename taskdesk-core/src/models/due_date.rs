//! Serde helpers for due dates.
//!
//! Due dates are stored as `YYYY-MM-DD`, with the empty string meaning
//! "no due date". Use with `#[serde(default, with = "due_date")]`.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%Y-%m-%d";

pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
        None => serializer.serialize_str(""),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, FORMAT)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid due date {s:?}: {e}"))),
    }
}

/// Parse a due date leniently: blank or malformed input yields `None`.
pub fn parse_lenient(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, FORMAT).ok()
}
