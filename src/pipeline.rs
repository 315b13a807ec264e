// src/pipeline.rs
//! One conversational turn, strictly in order:
//! 1) dialogue oracle (errors here are the only ones surfaced to the caller)
//! 2) annotation, bounded by a timeout, no retries
//! 3) interpretation against the session context, written back to the session store
//! 4) corpus fetch + relation matching, only when the turn is ready and retrieval is on
//! 5) response composition and chat-log append

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;
use serde_json::{json, Value};

use crate::annotate::{extract_with_timeout, AnnotationRequest, Annotator};
use crate::chat_log::{LogRecord, LogSink};
use crate::compose::{compose, Enrichment};
use crate::config::MatcherConfig;
use crate::dialog::{DialogOracle, DialogRequest, DialogResponse};
use crate::error::Result;
use crate::interpret::{interpret, TurnStatus};
use crate::matcher::{match_relations, MatchResult};
use crate::news::{fetch_or_empty, CorpusSource, RelationQuery};
use crate::session::{ConversationContext, SessionStore};
use crate::telemetry::anon_hash;

/// Key under which the enrichment context is returned inside the dialogue context.
pub const CONTEXT_KEY: &str = "newsContext";

/// Everything a turn needs; cheap to clone, shared across sessions.
#[derive(Clone)]
pub struct TurnServices {
    pub oracle: Arc<dyn DialogOracle>,
    pub annotator: Arc<dyn Annotator>,
    pub corpus: Arc<dyn CorpusSource>,
    pub sessions: Arc<dyn SessionStore>,
    pub chat_log: Option<Arc<dyn LogSink>>,
    pub matcher: MatcherConfig,
    pub retrieve_articles: bool,
    pub annotation_timeout: Duration,
}

/// Machine-readable summary of the enrichment, returned next to the dialogue payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    /// `None` when annotation failed or found nothing.
    pub status: Option<TurnStatus>,
    pub articles: Vec<MatchResult>,
    #[serde(rename = "annotationError", skip_serializing_if = "Option::is_none")]
    pub annotation_error: Option<String>,
}

/// Session key: the client's `conversation_id`, else the oracle's, else a fresh id.
fn session_id_for(request: &DialogRequest, response: &DialogResponse) -> String {
    request
        .conversation_id()
        .map(str::to_string)
        .or_else(|| {
            response
                .context
                .get("conversation_id")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Run one turn and return the composed response payload.
pub async fn run_turn(
    services: &TurnServices,
    request: &DialogRequest,
    today: NaiveDate,
) -> Result<Value> {
    counter!("turns_total").increment(1);

    let dialog = services.oracle.message(request).await?;
    let session_id = session_id_for(request, &dialog);

    let text = match dialog.input_text() {
        "" => request.input_text(),
        t => t,
    }
    .to_string();
    let text_id = anon_hash(&text);

    let prior = services.sessions.get(&session_id);
    let mut context: ConversationContext = prior.clone();
    let mut report = TurnReport {
        status: None,
        articles: Vec::new(),
        annotation_error: None,
    };

    let extraction = if text.trim().is_empty() {
        Ok(Default::default())
    } else {
        let req = AnnotationRequest::new(&text, today);
        extract_with_timeout(services.annotator.as_ref(), &req, services.annotation_timeout).await
    };

    let composed = match extraction {
        Err(e) => {
            let note = e.note();
            report.annotation_error = Some(note.clone());
            compose(
                &dialog.output.joined(),
                Enrichment::Unavailable { note: &note },
                dialog.primary_intent(),
            )
        }
        Ok(ex) if !ex.has_annotations() => compose(
            &dialog.output.joined(),
            Enrichment::NothingFound,
            dialog.primary_intent(),
        ),
        Ok(ex) => {
            let interp = interpret(&prior, &ex, today, services.matcher.min_keyword_relevance);
            services.sessions.put(&session_id, interp.context.clone());
            context = interp.context.clone();
            report.status = Some(interp.status);

            let articles = if interp.status.is_ready() && services.retrieve_articles {
                match RelationQuery::from_context(&interp.context, services.matcher.result_limit) {
                    Some(query) => {
                        let corpus = fetch_or_empty(services.corpus.as_ref(), &query).await;
                        let found = match_relations(&query, &corpus, &services.matcher);
                        counter!("articles_matched_total").increment(found.len() as u64);
                        Some(found)
                    }
                    // nothing searchable: report an empty result rather than skip silently
                    None => Some(Vec::new()),
                }
            } else {
                None
            };

            tracing::info!(
                target: "pipeline",
                session = %anon_hash(&session_id),
                text = %text_id,
                status = ?interp.status,
                articles = articles.as_ref().map(Vec::len).unwrap_or(0),
                "turn interpreted"
            );

            let out = compose(
                &dialog.output.joined(),
                Enrichment::Interpreted {
                    interpretation: &interp,
                    articles: articles.as_deref(),
                },
                dialog.primary_intent(),
            );
            report.articles = articles.unwrap_or_default();
            out
        }
    };

    let response = assemble_response(&dialog, &session_id, &context, &report, composed);

    if let Some(sink) = &services.chat_log {
        let request_json = serde_json::to_value(request).unwrap_or(Value::Null);
        sink.append(LogRecord::new(request_json, response.clone()));
    }
    Ok(response)
}

/// Dialogue payload with `output.text` replaced by the composed text, the context carrying
/// the session id and enrichment context, and an `enrichment` report.
fn assemble_response(
    dialog: &DialogResponse,
    session_id: &str,
    context: &ConversationContext,
    report: &TurnReport,
    composed: String,
) -> Value {
    let mut ctx = match &dialog.context {
        Value::Object(m) => m.clone(),
        _ => serde_json::Map::new(),
    };
    ctx.insert("conversation_id".to_string(), json!(session_id));
    ctx.insert(
        CONTEXT_KEY.to_string(),
        serde_json::to_value(context).unwrap_or(Value::Null),
    );

    json!({
        "input": dialog.input,
        "output": { "text": composed },
        "intents": dialog.intents,
        "entities": dialog.entities,
        "context": Value::Object(ctx),
        "enrichment": report,
    })
}
