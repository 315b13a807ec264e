// src/annotate/types.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Entity type tag that marks a person.
pub const PERSON_TYPE: &str = "Person";

/// A named thing recognized in text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(
        default,
        rename = "disambiguatedName",
        skip_serializing_if = "Option::is_none"
    )]
    pub disambiguated_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

impl Entity {
    pub fn person(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: PERSON_TYPE.to_string(),
            ..Default::default()
        }
    }

    /// Disambiguated name when present and non-blank, else the surface text.
    pub fn name(&self) -> &str {
        match self.disambiguated_name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.text,
        }
    }

    pub fn is_person(&self) -> bool {
        self.kind == PERSON_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub relevance: f64,
}

impl Keyword {
    pub fn new(text: &str, relevance: f64) -> Self {
        Self {
            text: text.to_string(),
            relevance,
        }
    }
}

/// Raw date mention, `date` in `YYYYMMDD[...]` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateMention {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Output of one annotation call. Each list keeps the extractor's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub dates: Vec<DateMention>,
}

impl Extraction {
    pub fn has_annotations(&self) -> bool {
        !(self.entities.is_empty() && self.keywords.is_empty() && self.dates.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRequest {
    pub text: String,
    /// `YYYY-MM-DD 00:00:00`, used by the extractor to resolve relative dates.
    pub anchor_date: String,
}

impl AnnotationRequest {
    pub fn new(text: &str, today: NaiveDate) -> Self {
        Self {
            text: text.to_string(),
            anchor_date: format!("{} 00:00:00", today.format("%Y-%m-%d")),
        }
    }
}

#[async_trait::async_trait]
pub trait Annotator: Send + Sync {
    async fn extract(&self, request: &AnnotationRequest) -> Result<Extraction>;
    fn name(&self) -> &'static str;
}
