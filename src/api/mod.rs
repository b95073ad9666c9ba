//! JSON HTTP API: draft generation, saving, listing, detail and delete

use std::sync::Arc;
use tracing::info;

use crate::auth::{Authenticator, TokenAuthenticator};
use crate::config::Config;
use crate::error::Result;
use crate::generation::{DraftGenerator, PodcastService};
use crate::llm::{create_llm, prompt, LLM};
use crate::metadata::OEmbedClient;
use crate::store::{JsonFileStore, PodcastStore};

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, AppState};

/// API server wiring the configured collaborators together
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a server from already constructed state
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Construct every collaborator from configuration
    pub async fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let llm: Arc<dyn LLM> = Arc::from(create_llm(&config.llm)?);
        let metadata = Arc::new(OEmbedClient::new(&config.metadata)?);
        let mut generator = DraftGenerator::new(llm, metadata);
        if let Some(path) = &config.llm.prompt_file {
            generator = generator.with_system_prompt(prompt::load_system_prompt(path).await?);
        }

        let store: Arc<dyn PodcastStore> =
            Arc::new(JsonFileStore::open(&config.storage.records_dir).await?);
        let podcasts = PodcastService::new(store, config.storage.slug_attempts);

        let authenticator = TokenAuthenticator::from_config(&config.auth);
        if authenticator.is_empty() {
            info!("No auth tokens configured; write endpoints will reject every request");
        }
        let auth: Arc<dyn Authenticator> = Arc::new(authenticator);

        Ok(Self::new(AppState {
            generator: Arc::new(generator),
            podcasts: Arc::new(podcasts),
            auth,
            config: Arc::new(config),
        }))
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.state.config.server.port);
        server::start_http_server(self.state).await
    }
}
