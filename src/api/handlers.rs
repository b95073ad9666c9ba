//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use super::models::{DeleteResponse, HealthResponse, PodcastListResponse};
use super::server::{ApiJson, ApiQuery, AppState, AuthUser};
use crate::catalog::{self, ListQuery};
use crate::error::{DigestError, Result};
use crate::generation::GenerateRequest;
use crate::models::{GeneratedDraft, NewPodcast, PodcastRecord};

/// Handle health check requests
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Generate a draft from a video link
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<Json<GeneratedDraft>> {
    debug!("User {} requested a draft for {}", user.id, request.video_url());
    let draft = state.generator.generate(&request).await?;
    Ok(Json(draft))
}

/// List records with optional filters and ordering
pub async fn list_podcasts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<PodcastListResponse>> {
    let records = state.podcasts.store().list().await?;
    let podcasts = query.apply(&records);

    Ok(Json(PodcastListResponse {
        total: podcasts.len(),
        podcast_names: catalog::podcast_names(&records),
        tags: catalog::all_tags(&records),
        podcasts,
    }))
}

/// Save a (possibly edited) draft for the current user
pub async fn create_podcast(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(new): ApiJson<NewPodcast>,
) -> Result<(StatusCode, Json<PodcastRecord>)> {
    let record = state.podcasts.save(&user, new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Detail view lookup by slug
pub async fn get_podcast(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PodcastRecord>> {
    state
        .podcasts
        .store()
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| DigestError::NotFound(format!("podcast {}", slug)))
}

/// Delete one of the current user's records by id
pub async fn delete_podcast(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.podcasts.delete(&user, &id).await?;
    Ok(Json(DeleteResponse { deleted: removed.id }))
}
