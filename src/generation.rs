//! Draft generation pipeline and the save/delete flow around the store

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::auth::User;
use crate::error::{DigestError, Result};
use crate::link;
use crate::llm::{extract, prompt, LLM};
use crate::metadata::{MetadataSource, VideoMetadata};
use crate::models::{GeneratedDraft, NewPodcast, PodcastRecord};
use crate::store::PodcastStore;

/// Body of a generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// `null` and a missing field both count as a missing link
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub video_author: Option<String>,
}

impl GenerateRequest {
    pub fn new(youtube_url: impl Into<String>) -> Self {
        Self {
            youtube_url: Some(youtube_url.into()),
            ..Self::default()
        }
    }

    /// Trimmed link, empty when absent
    pub fn video_url(&self) -> &str {
        self.youtube_url.as_deref().unwrap_or_default().trim()
    }

    /// Metadata the caller already fetched, if any
    fn supplied_metadata(&self) -> Option<VideoMetadata> {
        let metadata = VideoMetadata {
            title: self.video_title.clone().unwrap_or_default(),
            author: self.video_author.clone().unwrap_or_default(),
        };
        (!metadata.is_empty()).then_some(metadata)
    }
}

/// Turns a video link into a `GeneratedDraft`
pub struct DraftGenerator {
    llm: Arc<dyn LLM>,
    metadata: Arc<dyn MetadataSource>,
    system_prompt: String,
}

impl DraftGenerator {
    pub fn new(llm: Arc<dyn LLM>, metadata: Arc<dyn MetadataSource>) -> Self {
        Self {
            llm,
            metadata,
            system_prompt: prompt::default_system_prompt(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Prefetch metadata, call the completion service, decode and normalize
    ///
    /// A blank link is rejected before any network call. Every failure is
    /// terminal for the attempt.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedDraft> {
        let video_url = request.video_url();
        if video_url.is_empty() {
            return Err(DigestError::MissingInput("YouTube URL is required".to_string()));
        }

        if link::extract_video_id(video_url).is_none() {
            warn!("No video id found in {}, generating anyway", video_url);
        }

        let metadata = match request.supplied_metadata() {
            Some(metadata) => metadata,
            None => self.metadata.fetch(video_url).await,
        };

        let started = Instant::now();
        info!(
            "🎙️ Generating draft for {} via {:?} (title: {:?})",
            video_url,
            self.llm.provider_type(),
            metadata.title
        );

        let messages = prompt::build_messages(&self.system_prompt, video_url, &metadata);
        let response = self.llm.chat(messages).await?;

        let draft = match extract::parse_draft(&response.content) {
            Ok(ai_draft) => ai_draft.normalize(&metadata),
            Err(e) => {
                warn!("Completion for {} could not be parsed", video_url);
                return Err(e);
            }
        };

        info!(
            "✅ Draft ready in {:.1}s: \"{}\" ({} sections, tokens={:?})",
            started.elapsed().as_secs_f64(),
            draft.title,
            draft.summary.sections.len(),
            response.tokens_used
        );
        Ok(draft)
    }
}

/// Save and delete flows on top of a `PodcastStore`
pub struct PodcastService {
    store: Arc<dyn PodcastStore>,
    slug_attempts: u32,
}

impl PodcastService {
    pub fn new(store: Arc<dyn PodcastStore>, slug_attempts: u32) -> Self {
        Self {
            store,
            slug_attempts: slug_attempts.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn PodcastStore> {
        &self.store
    }

    /// Persist a draft for `user`, drawing a new slug suffix on collision
    pub async fn save(&self, user: &User, new: NewPodcast) -> Result<PodcastRecord> {
        let mut record = new.into_record(&user.id, String::new())?;

        for attempt in 1..=self.slug_attempts {
            record.slug = link::create_slug(&record.title);
            match self.store.insert(record.clone()).await {
                Ok(saved) => {
                    info!("💾 Saved \"{}\" as {}", saved.title, saved.slug);
                    return Ok(saved);
                }
                Err(DigestError::Conflict(reason)) if attempt < self.slug_attempts => {
                    warn!("Slug collision on attempt {}: {}", attempt, reason);
                }
                Err(e) => return Err(e),
            }
        }

        Err(DigestError::Conflict("could not allocate a unique slug".to_string()))
    }

    /// Delete a record owned by `user`
    pub async fn delete(&self, user: &User, id: &str) -> Result<PodcastRecord> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| DigestError::NotFound(format!("record {}", id)))?;

        if record.user_id != user.id {
            return Err(DigestError::Forbidden("only the owner can delete this podcast".to_string()));
        }

        self.store.delete(id).await
    }
}
