// src/news/providers/data_news.rs
//! Live news-search provider: asks for articles whose enriched relations link the query
//! subject to the query object inside the query time window.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::error::{EnrichError, Result};
use crate::news::normalize_text;
use crate::news::types::{CorpusSource, NewsDocument, RelationCandidate, RelationQuery};

pub const DEFAULT_NEWS_URL: &str = "https://gateway-a.watsonplatform.net/calls/data/GetNews";

const RETURN_FIELDS: &str = "enriched.url.title,enriched.url.url,enriched.url.relations.relation";
/// `count` sent when the query carries no limit.
const UNLIMITED_COUNT: usize = 25;

pub struct DataNewsProvider {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl DataNewsProvider {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::with_url(api_key, DEFAULT_NEWS_URL)
    }

    pub fn with_url(api_key: String, url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("dialog-news-enricher/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building news http client")?;
        Ok(Self {
            http,
            api_key,
            url: url.to_string(),
        })
    }
}

/// `|subject...=X,object...=Y|` relation filter.
pub fn relation_filter(query: &RelationQuery) -> String {
    format!(
        "|subject.keywords.keyword.text={},object.keywords.keyword.text={}|",
        query.subject_text, query.object_text
    )
}

#[async_trait]
impl CorpusSource for DataNewsProvider {
    async fn fetch(&self, query: &RelationQuery) -> Result<Vec<NewsDocument>> {
        let t0 = std::time::Instant::now();
        let count = if query.result_limit == 0 {
            UNLIMITED_COUNT
        } else {
            query.result_limit
        };
        let params = [
            ("apikey", self.api_key.clone()),
            ("outputMode", "json".to_string()),
            ("start", query.start_date.clone()),
            ("end", query.end_date.clone()),
            ("count", count.to_string()),
            ("q.enriched.url.relations.relation", relation_filter(query)),
            ("return", RETURN_FIELDS.to_string()),
        ];

        let resp = self
            .http
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| EnrichError::CorpusUnavailable(format!("request failed: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| EnrichError::CorpusUnavailable(format!("reading body: {e}")))?;
        if !status.is_success() {
            return Err(EnrichError::CorpusUnavailable(format!("http {status}")));
        }

        let docs = parse_news(&body)?;
        histogram!("news_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("news_documents_total").increment(docs.len() as u64);
        Ok(docs)
    }

    fn name(&self) -> &'static str {
        "data-news"
    }
}

// --- wire format ---

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(rename = "statusInfo", default)]
    status_info: Option<String>,
    #[serde(default)]
    result: Option<NewsResult>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsResult {
    #[serde(default)]
    docs: Vec<Doc>,
}

#[derive(Debug, Deserialize)]
struct Doc {
    source: DocSource,
}

#[derive(Debug, Deserialize)]
struct DocSource {
    enriched: Enriched,
}

#[derive(Debug, Deserialize)]
struct Enriched {
    url: EnrichedUrl,
}

#[derive(Debug, Deserialize)]
struct EnrichedUrl {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    relations: Vec<WireRelation>,
}

#[derive(Debug, Deserialize)]
struct WireRelation {
    #[serde(default)]
    sentence: String,
    #[serde(default)]
    subject: Option<WireArgument>,
    #[serde(default)]
    object: Option<WireArgument>,
}

#[derive(Debug, Default, Deserialize)]
struct WireArgument {
    #[serde(default)]
    text: String,
    #[serde(default)]
    entities: Vec<WireText>,
    #[serde(default)]
    keywords: Vec<WireText>,
}

#[derive(Debug, Deserialize)]
struct WireText {
    #[serde(default)]
    text: String,
}

fn texts_or_surface(items: &[WireText], surface: &str) -> Vec<String> {
    let mut out: Vec<String> = items
        .iter()
        .map(|t| t.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if out.is_empty() && !surface.trim().is_empty() {
        out.push(surface.trim().to_string());
    }
    out
}

/// Parse a news-search JSON body into documents.
pub fn parse_news(body: &str) -> Result<Vec<NewsDocument>> {
    let raw: NewsResponse = serde_json::from_str(body)
        .map_err(|e| EnrichError::CorpusUnavailable(format!("invalid response: {e}")))?;
    if !raw.status.eq_ignore_ascii_case("OK") {
        let info = raw.status_info.unwrap_or(raw.status);
        return Err(EnrichError::CorpusUnavailable(info));
    }

    let docs = raw
        .result
        .unwrap_or_default()
        .docs
        .into_iter()
        .map(|d| {
            let u = d.source.enriched.url;
            let relations = u
                .relations
                .into_iter()
                .map(|r| {
                    let subject = r.subject.unwrap_or_default();
                    let object = r.object.unwrap_or_default();
                    RelationCandidate {
                        sentence: normalize_text(&r.sentence),
                        subject_entities: texts_or_surface(&subject.entities, &subject.text),
                        object_keywords: texts_or_surface(&object.keywords, &object.text),
                    }
                })
                .collect();
            NewsDocument {
                url: u.url,
                title: normalize_text(&u.title),
                relations,
            }
        })
        .collect();
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relations_with_fallbacks() {
        let body = r#"{
          "status": "OK",
          "result": {"docs": [{"source": {"enriched": {"url": {
            "title": "Clinton &amp; Syria",
            "url": "https://news.example/a",
            "relations": [
              {"sentence": " Clinton   spoke about Syria. ",
               "subject": {"text": "Clinton", "entities": [{"text": "Hillary Clinton"}]},
               "object": {"text": "about Syria", "keywords": [{"text": "Syria"}]}},
              {"sentence": "No arguments here."},
              {"sentence": "Surface only.",
               "subject": {"text": "Obama"}, "object": {"text": "trade"}}
            ]}}}}]}
        }"#;
        let docs = parse_news(body).unwrap();
        assert_eq!(docs.len(), 1);
        let d = &docs[0];
        assert_eq!(d.title, "Clinton & Syria");
        assert_eq!(d.relations[0].sentence, "Clinton spoke about Syria.");
        assert_eq!(d.relations[0].subject_entities, vec!["Hillary Clinton"]);
        assert_eq!(d.relations[0].object_keywords, vec!["Syria"]);
        assert!(d.relations[1].subject_entities.is_empty());
        assert_eq!(d.relations[2].subject_entities, vec!["Obama"]);
        assert_eq!(d.relations[2].object_keywords, vec!["trade"]);
    }

    #[test]
    fn error_status_is_corpus_unavailable() {
        let err = parse_news(r#"{"status":"ERROR","statusInfo":"daily-transaction-limit-exceeded"}"#)
            .unwrap_err();
        assert!(matches!(err, EnrichError::CorpusUnavailable(ref m) if m.contains("limit")));
    }

    #[test]
    fn ok_without_result_is_empty() {
        assert!(parse_news(r#"{"status":"OK"}"#).unwrap().is_empty());
    }

    #[test]
    fn relation_filter_embeds_both_sides() {
        let q = RelationQuery {
            subject_text: "Hillary Clinton".into(),
            object_text: "Syria".into(),
            start_date: "now-1y".into(),
            end_date: "now".into(),
            result_limit: 3,
        };
        assert_eq!(
            relation_filter(&q),
            "|subject.keywords.keyword.text=Hillary Clinton,object.keywords.keyword.text=Syria|"
        );
    }
}
