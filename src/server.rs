//! HTTP surface.
//!
//! One streaming chat route plus health and metadata endpoints. The chat
//! handler spawns the emitter task and hands its frame channel to the
//! response body; headers disable intermediate buffering so frames reach
//! the client as they are produced.

use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::config::Settings;
use crate::planner::LlmPlanner;
use crate::stream::{StreamSink, patterns};

pub const APP_NAME: &str = "StreamForge API";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state: configuration plus the planner (which owns the
/// only cross-request resource, the plan cache).
pub struct AppState {
    pub settings: Settings,
    pub planner: LlmPlanner,
}

pub type SharedState = Arc<AppState>;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Build the application router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/chat", post(chat_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": APP_NAME,
        "version": APP_VERSION,
        "status": "running",
        "endpoints": {
            "chat": "/chat",
            "health": "/health",
        },
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": APP_NAME,
        "version": APP_VERSION,
    }))
}

/// `POST /chat` — stream the response for one message.
///
/// A malformed body is rejected with a JSON 400 before any streaming
/// begins. Once the 200 starts, the emitter task owns the request: client
/// disconnects cancel it at its next send and are logged at DEBUG only.
async fn chat_stream(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": rejection.body_text()})),
            )
                .into_response();
        }
    };

    let (sink, rx) = StreamSink::channel(state.settings.clone());
    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        if patterns::dispatch(&request.message, &sink, &task_state.planner)
            .await
            .is_err()
        {
            debug!("client disconnected mid-stream");
        }
    });

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));
    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .header(header::CONTENT_ENCODING, "identity")
        .header("x-accel-buffering", "no")
        .body(body)
    {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Start the server and run until ctrl-c.
pub async fn start_server(settings: Settings) -> Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let planner = LlmPlanner::new(&settings);
    let state = Arc::new(AppState { settings, planner });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    println!("StreamForge running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    println!("\nShutting down...");
}
