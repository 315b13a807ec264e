// src/lib.rs
// Public library surface for integration tests and the binary entrypoint.

pub mod annotate;
pub mod api;
pub mod auth;
pub mod chat_log;
pub mod compose;
pub mod config;
pub mod dialog;
pub mod error;
pub mod interpret;
pub mod matcher;
pub mod metrics;
pub mod news;
pub mod pipeline;
pub mod session;
pub mod similarity;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::{EnrichError, Result};
pub use crate::pipeline::{run_turn, TurnServices};

use axum::Router;
use tracing::info;

/// Build the full HTTP app from the process environment.
/// The caller owns tracing and the metrics recorder; see `main.rs`.
pub fn app() -> anyhow::Result<Router> {
    let cfg = config::AppConfig::from_env()?;
    if cfg.workspace_id.is_none() && cfg.service_mode == config::ServiceMode::Live {
        tracing::warn!("WORKSPACE_ID not set, /api/message will only explain how to configure it");
    }
    let state = AppState::from_config(&cfg)?;
    info!(
        retrieve_articles = cfg.retrieve_articles,
        min_keyword_relevance = cfg.matcher.min_keyword_relevance,
        min_person_similarity = cfg.matcher.min_person_similarity,
        min_keyword_similarity = cfg.matcher.min_keyword_similarity,
        "app configured"
    );
    Ok(router(state))
}
