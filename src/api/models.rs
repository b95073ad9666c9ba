//! API data models

use serde::{Deserialize, Serialize};

use crate::models::PodcastRecord;

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Filtered list plus the facet values the list view offers
#[derive(Debug, Serialize, Deserialize)]
pub struct PodcastListResponse {
    pub podcasts: Vec<PodcastRecord>,
    pub total: usize,
    pub podcast_names: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}
