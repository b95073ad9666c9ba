//! Best-effort video metadata lookup through the public oEmbed endpoint
//!
//! The title and author fetched here seed the generation prompt and later
//! override whatever the model guessed. Any failure degrades to empty
//! metadata; it never aborts a generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::MetadataConfig;
use crate::error::{DigestError, Result};

/// Public title/author of a video; both may be empty
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
}

impl VideoMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.author.trim().is_empty()
    }
}

/// Source of video metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata for a link; never fails, returns empty metadata instead
    async fn fetch(&self, video_url: &str) -> VideoMetadata;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
}

/// oEmbed metadata client
pub struct OEmbedClient {
    endpoint: String,
    client: reqwest::Client,
}

impl OEmbedClient {
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        Url::parse(&config.oembed_endpoint).map_err(|e| {
            DigestError::Configuration(format!(
                "invalid oEmbed endpoint {}: {}",
                config.oembed_endpoint, e
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            endpoint: config.oembed_endpoint.clone(),
            client,
        })
    }

    /// Lookup URL for a video link
    fn lookup_url(&self, video_url: &str) -> Result<Url> {
        Url::parse_with_params(&self.endpoint, &[("url", video_url), ("format", "json")])
            .map_err(|e| DigestError::Configuration(e.to_string()))
    }

    async fn try_fetch(&self, video_url: &str) -> Result<VideoMetadata> {
        let url = self.lookup_url(video_url)?;
        debug!("Fetching oEmbed metadata: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DigestError::Upstream(format!(
                "oEmbed returned {}",
                response.status()
            )));
        }

        let oembed: OEmbedResponse = response.json().await?;
        Ok(VideoMetadata {
            title: oembed.title.unwrap_or_default(),
            author: oembed.author_name.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl MetadataSource for OEmbedClient {
    async fn fetch(&self, video_url: &str) -> VideoMetadata {
        match self.try_fetch(video_url).await {
            Ok(metadata) => {
                debug!("oEmbed metadata: {:?}", metadata);
                metadata
            }
            Err(e) => {
                warn!("Metadata lookup failed for {}, continuing without it: {}", video_url, e);
                VideoMetadata::default()
            }
        }
    }
}
