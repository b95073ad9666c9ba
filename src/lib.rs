//! Podcast Digest
//!
//! Turns a YouTube podcast link into a structured blog article through an
//! AI completion service, stores it and serves it over a small JSON API.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generation;
pub mod link;
pub mod llm;
pub mod metadata;
pub mod models;
pub mod store;

// Re-export main types for easy access
pub use crate::api::{build_router, ApiServer, AppState};
pub use crate::auth::{Authenticator, TokenAuthenticator, User};
pub use crate::catalog::{ListQuery, SortOrder};
pub use crate::config::Config;
pub use crate::error::{DigestError, Result};
pub use crate::generation::{DraftGenerator, GenerateRequest, PodcastService};
pub use crate::llm::{LLMConfig, LLMProvider, LLM};
pub use crate::metadata::{MetadataSource, OEmbedClient, VideoMetadata};
pub use crate::models::{GeneratedDraft, NewPodcast, PodcastRecord, PodcastSummary, Section};
pub use crate::store::{JsonFileStore, PodcastStore};
