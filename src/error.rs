// src/error.rs
//! Error taxonomy of the turn pipeline.
//!
//! Only `UpstreamOracle` is allowed to reach the HTTP boundary; the other
//! variants are recovered inside the pipeline and turned into degraded output.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// The annotation service failed, timed out, or answered with a non-OK status.
    #[error("annotation failed: {0}")]
    Extraction(String),

    /// The news corpus could not be fetched or parsed.
    #[error("news corpus unavailable: {0}")]
    CorpusUnavailable(String),

    /// The dialogue service answered with an error; `body` is forwarded verbatim.
    #[error("dialogue service error (status {status})")]
    UpstreamOracle { status: u16, body: Value },
}

impl EnrichError {
    /// Short, single-line description used in user-facing error notes.
    pub fn note(&self) -> String {
        match self {
            EnrichError::UpstreamOracle { body, .. } => body.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;
