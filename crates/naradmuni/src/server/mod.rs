//! HTTP surface for the relay.
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use naradmuni_core::completion::RelayError;
use naradmuni_core::config::{RelayConfig, ServerConfig};
use naradmuni_core::model::ModelConfig;
use naradmuni_core::relay::ChatRelay;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

pub mod dto;

use dto::{ChatApiRequest, ChatApiResponse, ErrorBody, HealthResponse};

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    relay: Arc<ChatRelay>,
    model_name: String,
    provider_configured: bool,
}

impl AppState {
    pub fn new(relay: ChatRelay, relay_config: &RelayConfig) -> Self {
        Self {
            relay: Arc::new(relay),
            model_name: relay_config.model.name.clone(),
            provider_configured: credential_configured(&relay_config.model),
        }
    }
}

/// Whether the model's API credential resolves to a non-empty value.
fn credential_configured(model: &ModelConfig) -> bool {
    match model.get_setting::<String>("api_key") {
        Some(key) => match key.strip_prefix("env:") {
            Some(var) => std::env::var(var.trim()).is_ok(),
            None => !key.is_empty(),
        },
        None => false,
    }
}

pub fn build_router(state: AppState, server_config: &ServerConfig) -> Router {
    // CORS with explicit origins: the frontend is served from a fixed host
    let origins: Vec<HeaderValue> = server_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE]);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatApiRequest>,
) -> Result<Json<ChatApiResponse>, ApiError> {
    let response = state.relay.respond(&request.into_chat_request()).await?;
    Ok(Json(ChatApiResponse::from(response)))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.model_name.clone(),
        provider_configured: state.provider_configured,
    })
}

/// Wire wrapper mapping [`RelayError`] onto HTTP statuses.
pub struct ApiError(RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self.0 {
            RelayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg),
            RelayError::ProviderUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "provider_unavailable", msg)
            }
            RelayError::ProviderError(msg) => (StatusCode::BAD_GATEWAY, "provider_error", msg),
        };

        if status.is_server_error() {
            error!(kind, "Relay error: {message}");
        }

        (status, Json(ErrorBody::new(kind, message))).into_response()
    }
}
