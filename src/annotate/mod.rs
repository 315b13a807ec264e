// src/annotate/mod.rs
//! Annotation extraction: entity/keyword/date types, the `Annotator` seam, and
//! a timeout-bounded call helper used by the turn pipeline.

pub mod http;
pub mod lexicon;
pub mod types;

use std::time::Duration;

use metrics::counter;

pub use crate::annotate::http::HttpAnnotator;
pub use crate::annotate::lexicon::LexiconAnnotator;
pub use crate::annotate::types::{
    AnnotationRequest, Annotator, DateMention, Entity, Extraction, Keyword, PERSON_TYPE,
};

use crate::error::{EnrichError, Result};

pub const DEFAULT_ANNOTATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one extraction, bounded by `timeout`. No retries.
///
/// The single place where `annotation_errors_total` is counted; annotators only return errors.
pub async fn extract_with_timeout(
    annotator: &dyn Annotator,
    request: &AnnotationRequest,
    timeout: Duration,
) -> Result<Extraction> {
    let out = match tokio::time::timeout(timeout, annotator.extract(request)).await {
        Ok(res) => res,
        Err(_) => Err(EnrichError::Extraction(format!(
            "timed out after {}ms",
            timeout.as_millis()
        ))),
    };
    if let Err(e) = &out {
        counter!("annotation_errors_total").increment(1);
        tracing::warn!(target: "annotate", annotator = annotator.name(), error = %e, "extraction failed");
    }
    out
}
