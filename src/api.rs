// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::annotate::{Annotator, HttpAnnotator, LexiconAnnotator};
use crate::auth::basic_auth_middleware;
use crate::chat_log::{export_csv, InMemoryLogStore, LogSink};
use crate::config::{AppConfig, Credentials, LogAuth, ServiceMode};
use crate::dialog::{ConversationClient, DialogOracle, DialogRequest, EchoOracle};
use crate::error::EnrichError;
use crate::news::providers::{DataNewsProvider, FixtureCorpus};
use crate::news::CorpusSource;
use crate::pipeline::{run_turn, TurnServices};
use crate::session::InMemorySessionStore;

const STATIC_DIR: &str = "public";

const UNCONFIGURED_MESSAGE: &str = "The app has not been configured with a <b>WORKSPACE_ID</b> \
environment variable. Please set it to the id of the dialogue workspace to use.";

#[derive(Clone)]
pub struct AppState {
    pub services: TurnServices,
    pub workspace_configured: bool,
    /// Present only when chat logging is enabled.
    pub log_auth: Option<Arc<LogAuth>>,
}

impl AppState {
    /// Wire collaborators according to `cfg.service_mode`.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let (oracle, annotator, corpus): (
            Arc<dyn DialogOracle>,
            Arc<dyn Annotator>,
            Arc<dyn CorpusSource>,
        ) = match cfg.service_mode {
            ServiceMode::Mock => {
                let corpus = match &cfg.news_fixture_path {
                    Some(p) => FixtureCorpus::from_path(p)?,
                    None => FixtureCorpus::embedded(),
                };
                (
                    Arc::new(EchoOracle::default()),
                    Arc::new(LexiconAnnotator::default()),
                    Arc::new(corpus),
                )
            }
            ServiceMode::Live => {
                let creds = Credentials::load_from_file(&cfg.credentials_path)?;
                let oracle = ConversationClient::new(
                    &cfg.conversation_url,
                    cfg.workspace_id.as_deref().unwrap_or_default(),
                    &cfg.conversation_username,
                    &cfg.conversation_password,
                )?;
                let annotator = HttpAnnotator::new(creds.apikey.clone(), cfg.annotation_timeout)?;
                let corpus: Arc<dyn CorpusSource> = match &cfg.news_fixture_path {
                    Some(p) => Arc::new(FixtureCorpus::from_path(p)?),
                    None => Arc::new(DataNewsProvider::new(creds.apikey)?),
                };
                (Arc::new(oracle), Arc::new(annotator), corpus)
            }
        };

        let chat_log: Option<Arc<dyn LogSink>> = cfg
            .chat_log
            .as_ref()
            .map(|_| Arc::new(InMemoryLogStore::with_capacity(cfg.chat_log_capacity)) as Arc<dyn LogSink>);

        tracing::info!(
            mode = ?cfg.service_mode,
            oracle = oracle.name(),
            annotator = annotator.name(),
            corpus = corpus.name(),
            retrieve_articles = cfg.retrieve_articles,
            chat_log = chat_log.is_some(),
            "services wired"
        );

        Ok(Self {
            services: TurnServices {
                oracle,
                annotator,
                corpus,
                sessions: Arc::new(InMemorySessionStore::new()),
                chat_log,
                matcher: cfg.matcher.clone(),
                retrieve_articles: cfg.retrieve_articles,
                annotation_timeout: cfg.annotation_timeout,
            },
            workspace_configured: cfg.workspace_id.is_some() || cfg.service_mode == ServiceMode::Mock,
            log_auth: cfg.chat_log.clone().map(Arc::new),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let mut r = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/message", post(message));

    if let (Some(auth), Some(_)) = (&state.log_auth, &state.services.chat_log) {
        let protected = Router::new()
            .route("/clearDb", post(clear_db))
            .route("/chats", get(chats))
            .route_layer(middleware::from_fn_with_state(
                auth.clone(),
                basic_auth_middleware,
            ));
        r = r.merge(protected);
    }

    r.fallback_service(ServeDir::new(STATIC_DIR))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Errors that reach the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub EnrichError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            EnrichError::UpstreamOracle { status, body } => {
                let code = StatusCode::from_u16(status)
                    .ok()
                    .filter(|c| c.is_client_error() || c.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (code, Json(body)).into_response()
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": other.to_string() })),
            )
                .into_response(),
        }
    }
}

async fn message(
    State(state): State<AppState>,
    Json(body): Json<DialogRequest>,
) -> Result<Json<Value>, ApiError> {
    if !state.workspace_configured {
        return Ok(Json(json!({ "output": { "text": UNCONFIGURED_MESSAGE } })));
    }
    let today = chrono::Utc::now().date_naive();
    run_turn(&state.services, &body, today)
        .await
        .map(Json)
        .map_err(ApiError)
}

async fn clear_db(State(state): State<AppState>) -> Json<Value> {
    if let Some(log) = &state.services.chat_log {
        log.clear();
    }
    Json(json!({ "message": "Clearing db" }))
}

async fn chats(State(state): State<AppState>) -> Response {
    let records = state
        .services
        .chat_log
        .as_ref()
        .map(|l| l.list())
        .unwrap_or_default();
    match export_csv(&records) {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"chats.csv\""),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(target: "chat_log", error = %e, "csv export failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "csv export failed").into_response()
        }
    }
}
