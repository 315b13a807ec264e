// src/news/types.rs
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::ConversationContext;

/// One sentence-level subject/object assertion inside an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationCandidate {
    pub sentence: String,
    #[serde(rename = "subjectEntities", default)]
    pub subject_entities: Vec<String>,
    #[serde(rename = "objectKeywords", default)]
    pub object_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDocument {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub relations: Vec<RelationCandidate>,
}

/// Query handed to a corpus source and to the matcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationQuery {
    pub subject_text: String,
    pub object_text: String,
    pub start_date: String,
    pub end_date: String,
    pub result_limit: usize,
}

impl RelationQuery {
    /// Built only when the context holds both a person name and at least one keyword.
    /// The object is the first held keyword.
    pub fn from_context(ctx: &ConversationContext, result_limit: usize) -> Option<Self> {
        let subject = ctx.person_name().trim();
        let object = ctx.keywords.first()?.text.trim();
        if subject.is_empty() || object.is_empty() {
            return None;
        }
        Some(Self {
            subject_text: subject.to_string(),
            object_text: object.to_string(),
            start_date: ctx.start_date.clone(),
            end_date: "now".to_string(),
            result_limit,
        })
    }
}

#[async_trait::async_trait]
pub trait CorpusSource: Send + Sync {
    async fn fetch(&self, query: &RelationQuery) -> Result<Vec<NewsDocument>>;
    fn name(&self) -> &'static str;
}
