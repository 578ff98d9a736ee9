//! HTTP server exposing the translation endpoint

use crate::config::{Config, ServerConfig};
use crate::error::ApiError;
use crate::services::translator::TranslatorService;
use anyhow::{Context, Result};
use axum::{
    extract::{Json, State},
    http::HeaderValue,
    response::Html,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub translator: TranslatorService,
    pub static_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TranslationResponse {
    pub translations: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Build the application router
pub fn router(state: AppState, server: &ServerConfig) -> Result<Router> {
    let static_files = ServeDir::new(&state.static_dir);

    Ok(Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/translate", post(translate))
        .nest_service("/static", static_files)
        .layer(cors_layer(&server.cors_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state)))
}

/// CORS for the configured origins, with credentials allowed
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Run the server until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState {
        translator: TranslatorService::new(&config.completion)?,
        static_dir: PathBuf::from(&config.server.static_dir),
    };
    let app = router(state, &config.server)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Serve index.html from the static directory
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(Html(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::NotFound),
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// Translate Chinese text to multiple natural English options
async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<TranslationResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::TextRequired);
    }

    debug!(
        "Translate request: {} chars, context: {}",
        request.text.chars().count(),
        request.context.is_some()
    );

    let translations = state
        .translator
        .translate(&request.text, request.context.as_deref())
        .await
        .map_err(|e| {
            error!("Translation failed: {:#}", e);
            ApiError::TranslationFailed
        })?;

    Ok(Json(TranslationResponse { translations }))
}
