use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::identity::ExternalIds;

/// A rating published by one source (critics, audience, a metadata service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub source: String,
    pub value: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<u32>,
}

impl Rating {
    pub fn new(source: impl Into<String>, value: f32) -> Self {
        Self {
            source: source.into(),
            value,
            votes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub poster: Option<String>,
    pub background: Option<String>,
    pub banner: Option<String>,
    pub thumbnail: Option<String>,
    pub logo: Option<String>,
}

impl Artwork {
    pub fn is_empty(&self) -> bool {
        self.poster.is_none()
            && self.background.is_none()
            && self.banner.is_none()
            && self.thumbnail.is_none()
            && self.logo.is_none()
    }
}

/// Metadata shared by every kind of media.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaDetails {
    pub title: String,
    pub sort_title: Option<String>,
    pub original_title: Option<String>,
    pub description: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub added_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub studios: Vec<String>,
    pub content_rating: Option<String>,
    pub language: Option<String>,
    pub external_ids: ExternalIds,
    pub ratings: Vec<Rating>,
    pub user_rating: Option<f32>,
    pub artwork: Artwork,
    /// Runtime in seconds.
    pub duration: Option<u64>,
    pub is_favorite: bool,
}

impl MediaDetails {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Release year, falling back to the year of the release date.
    pub fn year(&self) -> Option<i32> {
        self.release_year
            .filter(|y| *y > 0)
            .or_else(|| self.release_date.map(|d| d.year()))
    }

    pub fn rating_from(&self, source: &str) -> Option<f32> {
        self.ratings
            .iter()
            .find(|r| r.source.eq_ignore_ascii_case(source))
            .map(|r| r.value)
    }
}
