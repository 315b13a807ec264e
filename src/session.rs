// src/session.rs
//! Per-session conversation context and the session-keyed store it lives in.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::annotate::{Entity, Keyword};

/// Start of the search window when no date was ever mentioned.
pub const DEFAULT_START_DATE: &str = "now-1y";

/// Accumulated person/time window/topic, carried across the turns of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Entity>,
    #[serde(rename = "startDate", default = "default_start_date")]
    pub start_date: String,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

fn default_start_date() -> String {
    DEFAULT_START_DATE.to_string()
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            person: None,
            start_date: default_start_date(),
            keywords: Vec::new(),
        }
    }
}

impl ConversationContext {
    /// Person name, or `""` when no person is held.
    pub fn person_name(&self) -> &str {
        self.person.as_ref().map(|p| p.name()).unwrap_or_default()
    }
}

pub trait SessionStore: Send + Sync {
    /// Context for `session_id`; a fresh default when the session is unknown.
    fn get(&self, session_id: &str) -> ConversationContext;
    fn put(&self, session_id: &str, context: ConversationContext);
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<String, ConversationContext>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> ConversationContext {
        match self.inner.read() {
            Ok(m) => m.get(session_id).cloned().unwrap_or_default(),
            Err(poison) => poison
                .into_inner()
                .get(session_id)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn put(&self, session_id: &str, context: ConversationContext) {
        let mut m = match self.inner.write() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        m.insert(session_id.to_string(), context);
    }
}
