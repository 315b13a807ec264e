// src/dialog.rs
//! Dialogue oracle: the upstream conversational service that owns turn-taking.
//!
//! The core treats it as opaque: it passes `{input, context}` through and reads back the
//! output text, the ranked intents and the updated context.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{EnrichError, Result};

pub const CONVERSATION_VERSION_DATE: &str = "2016-07-11";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogEntity {
    pub entity: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogOutput {
    /// Lines of dialogue text; a bare string is accepted as one line.
    #[serde(default, deserialize_with = "de_text_lines")]
    pub text: Vec<String>,
}

impl DialogOutput {
    pub fn joined(&self) -> String {
        self.text.join(" ")
    }
}

fn de_text_lines<'de, D>(d: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::One(s)) => vec![s],
        Some(Raw::Many(v)) => v,
        None => Vec::new(),
    })
}

/// Request forwarded to the dialogue service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogRequest {
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub context: Value,
}

impl DialogRequest {
    /// `input.text`, or `""` when absent.
    pub fn input_text(&self) -> &str {
        self.input
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Session id carried in the client context (`conversation_id`), if any.
    pub fn conversation_id(&self) -> Option<&str> {
        self.context
            .get("conversation_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogResponse {
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub output: DialogOutput,
    #[serde(default)]
    pub intents: Vec<Intent>,
    #[serde(default)]
    pub entities: Vec<DialogEntity>,
    #[serde(default)]
    pub context: Value,
}

impl DialogResponse {
    pub fn primary_intent(&self) -> Option<&Intent> {
        self.intents.first()
    }

    /// Text the user actually typed, as echoed by the service.
    pub fn input_text(&self) -> &str {
        self.input
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait DialogOracle: Send + Sync {
    async fn message(&self, request: &DialogRequest) -> Result<DialogResponse>;
    fn name(&self) -> &'static str;
}

/// Live client for the hosted conversation service (workspace message API).
pub struct ConversationClient {
    http: reqwest::Client,
    base_url: String,
    workspace_id: String,
    username: String,
    password: String,
}

impl ConversationClient {
    pub fn new(
        base_url: &str,
        workspace_id: &str,
        username: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("dialog-news-enricher/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building conversation http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            workspace_id: workspace_id.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn message_url(&self) -> String {
        format!(
            "{}/v1/workspaces/{}/message",
            self.base_url, self.workspace_id
        )
    }
}

#[async_trait]
impl DialogOracle for ConversationClient {
    async fn message(&self, request: &DialogRequest) -> Result<DialogResponse> {
        let resp = self
            .http
            .post(self.message_url())
            .query(&[("version", CONVERSATION_VERSION_DATE)])
            .basic_auth(&self.username, Some(&self.password))
            .json(request)
            .send()
            .await
            .map_err(|e| EnrichError::UpstreamOracle {
                status: 500,
                body: json!({ "error": e.to_string() }),
            })?;

        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            tracing::warn!(target: "dialog", %status, "dialogue service returned an error");
            return Err(EnrichError::UpstreamOracle {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_value(body).map_err(|e| EnrichError::UpstreamOracle {
            status: 502,
            body: json!({ "error": format!("invalid dialogue response: {e}") }),
        })
    }

    fn name(&self) -> &'static str {
        "conversation"
    }
}

/// Deterministic in-process oracle: echoes the input and reports one fixed intent.
pub struct EchoOracle {
    pub intent: Intent,
}

impl Default for EchoOracle {
    fn default() -> Self {
        Self {
            intent: Intent {
                intent: "news_about_person".to_string(),
                confidence: 0.8,
            },
        }
    }
}

#[async_trait]
impl DialogOracle for EchoOracle {
    async fn message(&self, request: &DialogRequest) -> Result<DialogResponse> {
        let text = request.input_text().to_string();
        let mut context = match &request.context {
            Value::Object(m) => m.clone(),
            _ => Map::new(),
        };
        let turn = context
            .get("turn")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .saturating_add(1);
        context.insert("turn".to_string(), json!(turn));

        Ok(DialogResponse {
            input: json!({ "text": text }),
            output: DialogOutput {
                text: vec![format!("You said: {text}")],
            },
            intents: vec![self.intent.clone()],
            entities: Vec::new(),
            context: Value::Object(context),
        })
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}
