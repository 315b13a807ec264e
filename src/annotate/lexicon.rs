// src/annotate/lexicon.rs
//! Offline annotator for local runs and tests (`SERVICE_MODE=mock`).
//!
//! People and topics come from a small lexicon and are matched case-insensitively on
//! word boundaries; ISO dates (`2023-01-15`) become `YYYYMMDD` date mentions.
//! Output lists keep the order of first appearance in the text.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::annotate::types::{
    AnnotationRequest, Annotator, DateMention, Entity, Extraction, Keyword,
};
use crate::error::Result;

static RE_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date regex"));

const DEFAULT_PEOPLE: &[&str] = &[
    "Hillary Clinton",
    "Donald Trump",
    "Barack Obama",
    "Angela Merkel",
    "Vladimir Putin",
];

const DEFAULT_TOPICS: &[&str] = &[
    "Syria",
    "economy",
    "immigration",
    "healthcare",
    "trade",
    "climate",
];

/// Relevance reported for every lexicon topic hit.
const TOPIC_RELEVANCE: f64 = 0.9;

pub struct LexiconAnnotator {
    people: Vec<(String, Regex)>,
    topics: Vec<(String, Regex)>,
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_PEOPLE, DEFAULT_TOPICS)
    }
}

impl LexiconAnnotator {
    pub fn new<S: AsRef<str>>(people: &[S], topics: &[S]) -> Self {
        Self {
            people: compile_terms(people),
            topics: compile_terms(topics),
        }
    }

    pub fn annotate(&self, text: &str) -> Extraction {
        let mut entities: Vec<(usize, Entity)> = self
            .people
            .iter()
            .filter_map(|(term, re)| re.find(text).map(|m| (m.start(), Entity::person(term))))
            .collect();
        entities.sort_by_key(|(pos, _)| *pos);

        let mut keywords: Vec<(usize, Keyword)> = self
            .topics
            .iter()
            .filter_map(|(term, re)| {
                re.find(text)
                    .map(|m| (m.start(), Keyword::new(term, TOPIC_RELEVANCE)))
            })
            .collect();
        keywords.sort_by_key(|(pos, _)| *pos);

        let dates = RE_ISO_DATE
            .captures_iter(text)
            .map(|c| DateMention {
                date: format!("{}{}{}", &c[1], &c[2], &c[3]),
                text: Some(c[0].to_string()),
            })
            .collect();

        Extraction {
            entities: entities.into_iter().map(|(_, e)| e).collect(),
            keywords: keywords.into_iter().map(|(_, k)| k).collect(),
            dates,
        }
    }
}

fn compile_terms<S: AsRef<str>>(terms: &[S]) -> Vec<(String, Regex)> {
    terms
        .iter()
        .filter_map(|t| {
            let term = t.as_ref().trim();
            if term.is_empty() {
                return None;
            }
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            Regex::new(&pattern).ok().map(|re| (term.to_string(), re))
        })
        .collect()
}

#[async_trait]
impl Annotator for LexiconAnnotator {
    async fn extract(&self, request: &AnnotationRequest) -> Result<Extraction> {
        Ok(self.annotate(&request.text))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
