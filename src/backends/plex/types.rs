use serde::Deserialize;

use crate::mapper::transforms::deserialize_opt_string_or_number;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlexMetadataResponse {
    pub media_container: PlexMetadataContainer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexMetadataContainer {
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub total_size: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMetadata>,
}

impl PlexMetadataResponse {
    /// Decode a `/library/...` response body.
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlexTag {
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlexGuid {
    pub id: String,
}

/// The `Metadata` element shared by every Plex library endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexMetadata {
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub rating_key: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_sort: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub originally_available_at: Option<String>,
    #[serde(default)]
    pub added_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    /// Milliseconds.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub studio: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub rating_image: Option<String>,
    #[serde(default)]
    pub audience_rating: Option<f32>,
    #[serde(default)]
    pub audience_rating_image: Option<String>,
    #[serde(default)]
    pub user_rating: Option<f32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub art: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub parent_rating_key: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub grandparent_rating_key: Option<String>,
    #[serde(default)]
    pub parent_title: Option<String>,
    #[serde(default)]
    pub grandparent_title: Option<String>,
    #[serde(default)]
    pub parent_thumb: Option<String>,
    #[serde(default)]
    pub grandparent_thumb: Option<String>,
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(default)]
    pub parent_index: Option<i32>,
    #[serde(default)]
    pub leaf_count: Option<u32>,
    #[serde(default)]
    pub child_count: Option<u32>,
    #[serde(default)]
    pub playlist_type: Option<String>,
    #[serde(default)]
    pub smart: Option<bool>,
    #[serde(rename = "Genre", default)]
    pub genres: Vec<PlexTag>,
    #[serde(rename = "Label", default)]
    pub labels: Vec<PlexTag>,
    #[serde(rename = "Guid", default)]
    pub guids: Vec<PlexGuid>,
}
