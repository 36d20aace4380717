//! The generation proxy.
//!
//! Each request walks validate → prompt → call → normalize and either
//! answers with the normalized body or collapses into a JSON error at the
//! handler boundary. Nothing is shared between requests except the provider.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::MindSparkError;
use crate::normalize;
use crate::prompt;
use crate::provider::DynProvider;
use crate::wire::{ErrorBody, GenerationRequest, GenerationResult, HealthBody, Mode, HEALTH_OK, TEXT_REQUIRED};

#[derive(Clone)]
pub struct AppState {
    pub provider: DynProvider,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(Mode::Summary.endpoint(), post(summarize))
        .route(Mode::Eli5.endpoint(), post(eli5))
        .route(Mode::Flashcards.endpoint(), post(flashcards))
        .route(Mode::Quiz.endpoint(), post(quiz))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type Payload = std::result::Result<Json<GenerationRequest>, JsonRejection>;
type Generated = std::result::Result<Json<GenerationResult>, ApiError>;

async fn summarize(State(state): State<AppState>, payload: Payload) -> Generated {
    generate(&state, Mode::Summary, payload).await
}

async fn eli5(State(state): State<AppState>, payload: Payload) -> Generated {
    generate(&state, Mode::Eli5, payload).await
}

async fn flashcards(State(state): State<AppState>, payload: Payload) -> Generated {
    generate(&state, Mode::Flashcards, payload).await
}

async fn quiz(State(state): State<AppState>, payload: Payload) -> Generated {
    generate(&state, Mode::Quiz, payload).await
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: HEALTH_OK.to_string() })
}

/// Non-empty (after trimming) request text, untouched otherwise.
fn validated_text(payload: Payload) -> Option<String> {
    match payload {
        Ok(Json(req)) if !req.text.trim().is_empty() => Some(req.text),
        Ok(_) => None,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable request body");
            None
        }
    }
}

async fn generate(state: &AppState, mode: Mode, payload: Payload) -> Generated {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate", %mode, %request_id);

    async move {
        let Some(text) = validated_text(payload) else {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, TEXT_REQUIRED));
        };

        let prompt = prompt::build(mode, &text);
        let outcome = match state.provider.complete(&prompt).await {
            Ok(completion) => normalize::normalize(mode, &completion),
            Err(e) => Err(MindSparkError::Upstream(format!("{:#}", e))),
        };

        match outcome {
            Ok(result) => {
                tracing::info!(provider = state.provider.name(), "generation succeeded");
                Ok(Json(result))
            }
            Err(e) => {
                tracing::error!(error = %e, "generation failed");
                Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.public_message(mode)))
            }
        }
    }
    .instrument(span)
    .await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("proxy server stopped unexpectedly")
}

pub async fn serve(cfg: &Config, provider: DynProvider) -> Result<()> {
    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        "MindSpark proxy running on http://{} (provider: {}, model: {})",
        listener.local_addr()?,
        provider.name(),
        cfg.model
    );
    for mode in Mode::ALL {
        tracing::info!("  POST {}", mode.endpoint());
    }
    tracing::info!("  GET  /health");

    run(listener, AppState { provider }, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
