//! HTTP server implementation for the API

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use super::{handlers, models::ErrorBody};
use crate::auth::{bearer_token, Authenticator, User};
use crate::config::{Config, ServerConfig};
use crate::error::{DigestError, Result};
use crate::generation::{DraftGenerator, PodcastService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<DraftGenerator>,
    pub podcasts: Arc<PodcastService>,
    pub auth: Arc<dyn Authenticator>,
    pub config: Arc<Config>,
}

/// The user behind the request's bearer token; rejects with 401 otherwise
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = DigestError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(DigestError::Unauthorized)?;

        let user = state
            .auth
            .current_user(token)
            .await
            .ok_or(DigestError::Unauthorized)?;
        Ok(AuthUser(user))
    }
}

/// JSON body extractor whose rejections use the `{error}` body
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = DigestError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Query string extractor whose rejections use the `{error}` body
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = DigestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

impl From<JsonRejection> for DigestError {
    fn from(rejection: JsonRejection) -> Self {
        DigestError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for DigestError {
    fn from(rejection: QueryRejection) -> Self {
        DigestError::Validation(rejection.body_text())
    }
}

impl DigestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DigestError::MissingInput(_) | DigestError::Validation(_) => StatusCode::BAD_REQUEST,
            DigestError::Unauthorized => StatusCode::UNAUTHORIZED,
            DigestError::Forbidden(_) => StatusCode::FORBIDDEN,
            DigestError::NotFound(_) => StatusCode::NOT_FOUND,
            DigestError::Conflict(_) => StatusCode::CONFLICT,
            DigestError::Upstream(_) | DigestError::Http(_) => StatusCode::BAD_GATEWAY,
            DigestError::UnparseableResponse { .. }
            | DigestError::Storage(_)
            | DigestError::Configuration(_)
            | DigestError::Io(_)
            | DigestError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DigestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            raw: self.raw_response().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/health", get(handlers::health))
        .route("/api/generate", post(handlers::generate))
        .route(
            "/api/podcasts",
            get(handlers::list_podcasts).post(handlers::create_podcast),
        )
        // GET looks up by slug, DELETE by id
        .route(
            "/api/podcasts/:key",
            get(handlers::get_podcast).delete(handlers::delete_podcast),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let address = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 API server listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}
