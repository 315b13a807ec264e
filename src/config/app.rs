// src/config/app.rs
//! Process configuration read from the environment (after `.env` is loaded).

use std::path::PathBuf;
use std::time::Duration;

use crate::config::credentials::DEFAULT_CREDENTIALS_PATH;
use crate::config::matcher::MatcherConfig;

pub const DEFAULT_CONVERSATION_URL: &str = "https://gateway.watsonplatform.net/conversation/api";
pub const DEFAULT_CHAT_LOG_CAPACITY: usize = 5000;
const WORKSPACE_PLACEHOLDER: &str = "<workspace-id>";

/// Where the external collaborators come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    Live,
    /// Deterministic in-process oracle, annotator and corpus.
    Mock,
}

/// Basic-auth pair guarding the chat-log endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogAuth {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_mode: ServiceMode,
    /// `None` when unset or still the placeholder value.
    pub workspace_id: Option<String>,
    pub conversation_url: String,
    pub conversation_username: String,
    pub conversation_password: String,
    pub credentials_path: PathBuf,
    pub retrieve_articles: bool,
    pub news_fixture_path: Option<PathBuf>,
    pub annotation_timeout: Duration,
    /// `Some` when chat logging is enabled.
    pub chat_log: Option<LogAuth>,
    pub chat_log_capacity: usize,
    pub matcher: MatcherConfig,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let service_mode = match env_nonempty("SERVICE_MODE").as_deref() {
            Some(m) if m.eq_ignore_ascii_case("mock") => ServiceMode::Mock,
            _ => ServiceMode::Live,
        };

        let workspace_id = env_nonempty("WORKSPACE_ID").filter(|w| w != WORKSPACE_PLACEHOLDER);

        let chat_log = if env_flag("CHAT_LOG_ENABLED") {
            match (env_nonempty("LOG_USER"), env_nonempty("LOG_PASS")) {
                (Some(user), Some(pass)) => Some(LogAuth { user, pass }),
                _ => anyhow::bail!(
                    "LOG_USER or LOG_PASS not defined, both required to enable chat logging"
                ),
            }
        } else {
            None
        };

        let annotation_timeout = env_nonempty("ANNOTATION_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(crate::annotate::DEFAULT_ANNOTATION_TIMEOUT);

        let chat_log_capacity = env_nonempty("CHAT_LOG_CAPACITY")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CHAT_LOG_CAPACITY);

        Ok(Self {
            service_mode,
            workspace_id,
            conversation_url: env_nonempty("CONVERSATION_URL")
                .unwrap_or_else(|| DEFAULT_CONVERSATION_URL.to_string()),
            conversation_username: env_nonempty("CONVERSATION_USERNAME").unwrap_or_default(),
            conversation_password: env_nonempty("CONVERSATION_PASSWORD").unwrap_or_default(),
            credentials_path: env_nonempty("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            retrieve_articles: env_flag("RETRIEVE_ARTICLES"),
            news_fixture_path: env_nonempty("NEWS_FIXTURE_PATH").map(PathBuf::from),
            annotation_timeout,
            chat_log,
            chat_log_capacity,
            matcher: MatcherConfig::load()?,
        })
    }
}
