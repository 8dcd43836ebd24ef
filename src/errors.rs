//! Typed error hierarchy for the streaming service.
//!
//! Three top-level enums cover the three subsystems:
//! - `StreamError` — the response stream and its sink
//! - `RegistryError` — per-request component registry violations
//! - `PlannerError` — LLM planner failures (never surfaced to clients)

use thiserror::Error;

/// Errors from the response stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The client went away; the receiving end of the frame channel was
    /// dropped. Emitters stop at the next send.
    #[error("client disconnected mid-stream")]
    Disconnected,
}

/// Errors from the per-request component registry.
///
/// Both variants are server-side programming errors. Per the error policy
/// they are logged at WARN and the offending frame is dropped; the stream
/// itself continues.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("component {id} introduced twice")]
    DuplicateId { id: String },

    #[error("update for unknown component {id}")]
    UnknownId { id: String },
}

/// Errors from the LLM planner subsystem.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planner request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("planner returned an empty completion")]
    EmptyResponse,

    #[error("planner response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("no components survived validation")]
    NoValidComponents,
}
