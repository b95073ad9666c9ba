//! Validating decode of AI output and write-time cleanup of saved drafts

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{GeneratedDraft, PodcastRecord, PodcastSummary, Section, DEFAULT_RATING};
use crate::error::{DigestError, Result};
use crate::link;
use crate::metadata::VideoMetadata;

/// Loosely-typed completion output decoded into a fixed shape
///
/// Every field is optional. Unknown fields are ignored, nulls and
/// wrongly-typed values fall back to defaults, numeric strings are coerced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiDraft {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub podcast_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub creator: String,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration_minutes: u32,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_summary")]
    pub summary: PodcastSummary,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub key_takeaways: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub actionable_advice: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub resources: Vec<String>,
}

impl AiDraft {
    /// Decode a JSON object extracted from a completion response
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Reconcile with prefetched metadata; oEmbed title/author win when present
    pub fn normalize(self, metadata: &VideoMetadata) -> GeneratedDraft {
        let title = prefer_metadata(metadata.title.trim(), self.title);
        let creator = prefer_metadata(metadata.author.trim(), self.creator);

        GeneratedDraft {
            title,
            podcast_name: self.podcast_name.trim().to_string(),
            creator,
            duration_minutes: self.duration_minutes,
            rating: DEFAULT_RATING,
            tags: self.tags,
            summary: self.summary,
            key_takeaways: self.key_takeaways,
            actionable_advice: self.actionable_advice,
            resources: self.resources,
        }
    }
}

fn prefer_metadata(authoritative: &str, guessed: String) -> String {
    if authoritative.is_empty() {
        guessed.trim().to_string()
    } else {
        authoritative.to_string()
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(value).unwrap_or_default())
}

fn lenient_minutes<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let minutes = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("minutes").trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(minutes
        .filter(|m| m.is_finite() && *m > 0.0)
        .map(|m| m.round().min(u32::MAX as f64) as u32)
        .unwrap_or(0))
}

fn string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    }
}

fn lenient_string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_list(Value::deserialize(deserializer)?))
}

fn section_from_value(value: Value) -> Option<Section> {
    match value {
        Value::Object(mut fields) => {
            let heading = fields
                .remove("heading")
                .or_else(|| fields.remove("title"))
                .and_then(value_to_string)
                .unwrap_or_default();
            let content = fields
                .remove("content")
                .or_else(|| fields.remove("body"))
                .and_then(value_to_string)
                .unwrap_or_default();
            Some(Section { heading, content })
        }
        _ => None,
    }
}

fn lenient_summary<'de, D>(deserializer: D) -> std::result::Result<PodcastSummary, D::Error>
where
    D: Deserializer<'de>,
{
    let summary = match Value::deserialize(deserializer)? {
        Value::Object(mut fields) => PodcastSummary {
            overview: fields
                .remove("overview")
                .and_then(value_to_string)
                .unwrap_or_default(),
            sections: match fields.remove("sections") {
                Some(Value::Array(items)) => items.into_iter().filter_map(section_from_value).collect(),
                _ => Vec::new(),
            },
            quotes: fields.remove("quotes").map(string_list).unwrap_or_default(),
        },
        Value::String(overview) => PodcastSummary {
            overview,
            ..PodcastSummary::default()
        },
        _ => PodcastSummary::default(),
    };

    Ok(summary)
}

/// A draft submitted for saving, after any user edits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPodcast {
    pub source_link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub podcast_name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: PodcastSummary,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default)]
    pub actionable_advice: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl NewPodcast {
    /// Save request for an unedited draft
    pub fn from_draft(draft: GeneratedDraft, source_link: impl Into<String>) -> Self {
        Self {
            source_link: source_link.into(),
            title: draft.title,
            podcast_name: draft.podcast_name,
            creator: draft.creator,
            duration_minutes: draft.duration_minutes,
            rating: Some(draft.rating),
            tags: draft.tags,
            summary: draft.summary,
            key_takeaways: draft.key_takeaways,
            actionable_advice: draft.actionable_advice,
            resources: draft.resources,
        }
    }

    /// Clean up and stamp identity, ownership and creation time
    pub fn into_record(self, user_id: &str, slug: String) -> Result<PodcastRecord> {
        let source_link = self.source_link.trim().to_string();
        if source_link.is_empty() {
            return Err(DigestError::Validation("source_link is required".to_string()));
        }

        let rating = self.rating.unwrap_or(DEFAULT_RATING);
        if !(1..=5).contains(&rating) {
            return Err(DigestError::Validation(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }

        let thumbnail_url = link::thumbnail_url(&source_link).unwrap_or_default();
        if thumbnail_url.is_empty() {
            debug!("No video id in {}, saving without thumbnail", source_link);
        }

        let sections = self
            .summary
            .sections
            .into_iter()
            .filter(|s| !s.is_blank())
            .map(|s| Section::new(s.heading.trim(), s.content.trim()))
            .collect();

        Ok(PodcastRecord {
            id: Uuid::new_v4().to_string(),
            slug,
            title: self.title.trim().to_string(),
            podcast_name: self.podcast_name.trim().to_string(),
            creator: self.creator.trim().to_string(),
            source_link,
            thumbnail_url,
            duration_minutes: self.duration_minutes,
            rating,
            tags: clean_list(self.tags),
            summary: PodcastSummary {
                overview: self.summary.overview.trim().to_string(),
                sections,
                quotes: clean_list(self.summary.quotes),
            },
            key_takeaways: clean_list(self.key_takeaways),
            actionable_advice: clean_list(self.actionable_advice),
            resources: clean_list(self.resources),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Trim entries and drop the blank ones
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
