//! Podcast article data model
//!
//! `PodcastRecord` is what the store persists; `GeneratedDraft` is the
//! transient result of one generation call, and `NewPodcast` is the
//! (possibly user-edited) draft submitted for saving.

pub mod draft;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use draft::{AiDraft, NewPodcast};

/// Default rating given to a freshly generated draft
pub const DEFAULT_RATING: u8 = 5;

/// One headed section of the article body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub heading: String,
    pub content: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.heading.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// Narrative content of an article
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PodcastSummary {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub quotes: Vec<String>,
}

/// A persisted article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PodcastRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub podcast_name: String,
    pub creator: String,
    pub source_link: String,
    pub thumbnail_url: String,
    pub duration_minutes: u32,
    pub rating: u8,
    pub tags: Vec<String>,
    pub summary: PodcastSummary,
    pub key_takeaways: Vec<String>,
    pub actionable_advice: Vec<String>,
    pub resources: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// AI-generated article candidate, not yet persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedDraft {
    pub title: String,
    pub podcast_name: String,
    pub creator: String,
    pub duration_minutes: u32,
    pub rating: u8,
    pub tags: Vec<String>,
    pub summary: PodcastSummary,
    pub key_takeaways: Vec<String>,
    pub actionable_advice: Vec<String>,
    pub resources: Vec<String>,
}

impl Default for GeneratedDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            podcast_name: String::new(),
            creator: String::new(),
            duration_minutes: 0,
            rating: DEFAULT_RATING,
            tags: Vec::new(),
            summary: PodcastSummary::default(),
            key_takeaways: Vec::new(),
            actionable_advice: Vec::new(),
            resources: Vec::new(),
        }
    }
}
