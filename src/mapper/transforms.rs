//! Field-level transformations shared by the backend converters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::constants::TICKS_PER_SECOND;

/// Jellyfin/Emby run time ticks (100ns) to whole seconds.
pub fn ticks_to_seconds(ticks: Option<i64>) -> Option<u64> {
    ticks
        .filter(|t| *t > 0)
        .map(|t| (t / TICKS_PER_SECOND) as u64)
}

pub fn millis_to_seconds(millis: Option<i64>) -> Option<u64> {
    millis.filter(|ms| *ms > 0).map(|ms| (ms / 1000) as u64)
}

pub fn unix_to_datetime(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.filter(|s| *s > 0)
        .and_then(|s| DateTime::from_timestamp(s, 0))
}

/// RFC 3339 timestamp. Jellyfin sends seven fractional digits, which chrono accepts.
pub fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Calendar date from either `YYYY-MM-DD` or a full timestamp.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// `None` for missing or blank strings, trimmed otherwise.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Ids that arrive as strings on one endpoint and numbers on another.
pub fn deserialize_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(serde::de::Error::custom("expected string or number")),
    }
}

/// Resolve a server-relative path (e.g. Plex `thumb`) against the server base URL.
/// Absolute URLs are returned unchanged.
pub fn absolute_url(base: &Url, path: Option<&str>) -> Option<String> {
    let path = path?.trim();
    if path.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(path) {
        return Some(url.to_string());
    }
    base.join(path).ok().map(|url| url.to_string())
}

/// Build `base/segments...?query`.
pub fn build_url(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> Option<String> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().ok()?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter());
    }
    Some(url.to_string())
}
