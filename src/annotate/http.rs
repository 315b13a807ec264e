// src/annotate/http.rs
//! Live annotation client for the combined entity/keyword/date extraction endpoint.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use metrics::histogram;
use serde::{Deserialize, Deserializer};

use crate::annotate::types::{
    AnnotationRequest, Annotator, DateMention, Entity, Extraction, Keyword,
};
use crate::error::{EnrichError, Result};

pub const DEFAULT_COMBINED_URL: &str =
    "https://gateway-a.watsonplatform.net/calls/text/TextGetCombinedData";

const EXTRACT_FIELDS: &str = "entities,keywords,dates";

pub struct HttpAnnotator {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl HttpAnnotator {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_url(api_key, timeout, DEFAULT_COMBINED_URL)
    }

    pub fn with_url(api_key: String, timeout: Duration, url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("dialog-news-enricher/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building annotation http client")?;
        Ok(Self {
            http,
            api_key,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Annotator for HttpAnnotator {
    async fn extract(&self, request: &AnnotationRequest) -> Result<Extraction> {
        let t0 = std::time::Instant::now();
        let form = [
            ("apikey", self.api_key.as_str()),
            ("text", request.text.as_str()),
            ("extract", EXTRACT_FIELDS),
            ("anchorDate", request.anchor_date.as_str()),
            ("outputMode", "json"),
        ];

        let resp = self
            .http
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| EnrichError::Extraction(format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| EnrichError::Extraction(format!("reading body: {e}")))?;
        histogram!("annotation_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        if !status.is_success() {
            return Err(EnrichError::Extraction(format!("http {status}: {body}")));
        }
        parse_combined(&body)
    }

    fn name(&self) -> &'static str {
        "combined-http"
    }
}

// --- wire format ---

#[derive(Debug, Deserialize)]
struct CombinedResponse {
    status: String,
    #[serde(rename = "statusInfo", default)]
    status_info: Option<String>,
    #[serde(default)]
    entities: Vec<WireEntity>,
    #[serde(default)]
    keywords: Vec<WireKeyword>,
    #[serde(default)]
    dates: Vec<WireDate>,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default, deserialize_with = "de_score")]
    relevance: Option<f64>,
    #[serde(default)]
    disambiguated: Option<WireDisambiguated>,
}

#[derive(Debug, Deserialize)]
struct WireDisambiguated {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireKeyword {
    #[serde(default)]
    text: String,
    #[serde(default, deserialize_with = "de_score")]
    relevance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireDate {
    date: String,
    #[serde(default)]
    text: Option<String>,
}

/// Scores arrive as JSON numbers or as numeric strings ("0.93").
fn de_score<'de, D>(d: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Str(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}

/// Parse the combined-extraction JSON body into an [`Extraction`].
pub fn parse_combined(body: &str) -> Result<Extraction> {
    let raw: CombinedResponse = serde_json::from_str(body)
        .map_err(|e| EnrichError::Extraction(format!("invalid response: {e}")))?;

    if !raw.status.eq_ignore_ascii_case("OK") {
        let info = raw.status_info.unwrap_or_else(|| raw.status.clone());
        return Err(EnrichError::Extraction(info));
    }

    let entities = raw
        .entities
        .into_iter()
        .map(|e| Entity {
            text: e.text,
            kind: e.kind,
            disambiguated_name: e.disambiguated.and_then(|d| d.name),
            relevance: e.relevance,
        })
        .collect();
    let keywords = raw
        .keywords
        .into_iter()
        .map(|k| Keyword {
            text: k.text,
            relevance: k.relevance.unwrap_or(0.0),
        })
        .collect();
    let dates = raw
        .dates
        .into_iter()
        .map(|d| DateMention {
            date: d.date,
            text: d.text,
        })
        .collect();

    Ok(Extraction {
        entities,
        keywords,
        dates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_scores_and_disambiguation() {
        let body = r#"{
            "status": "OK",
            "entities": [
                {"type": "Company", "text": "IBM", "relevance": "0.41"},
                {"type": "Person", "text": "Hillary", "relevance": "0.9",
                 "disambiguated": {"name": "Hillary Rodham Clinton"}}
            ],
            "keywords": [{"text": "Syria", "relevance": 0.87}, {"text": "war", "relevance": "n/a"}],
            "dates": [{"date": "20230115T000000", "text": "January 15"}]
        }"#;
        let ex = parse_combined(body).expect("ok");
        assert_eq!(ex.entities.len(), 2);
        assert_eq!(ex.entities[1].name(), "Hillary Rodham Clinton");
        assert_eq!(ex.entities[0].relevance, Some(0.41));
        assert_eq!(ex.keywords[0].relevance, 0.87);
        assert_eq!(ex.keywords[1].relevance, 0.0);
        assert_eq!(ex.dates[0].date, "20230115T000000");
    }

    #[test]
    fn non_ok_status_is_extraction_failure() {
        let body = r#"{"status": "ERROR", "statusInfo": "invalid-api-key"}"#;
        let err = parse_combined(body).unwrap_err();
        assert!(matches!(err, EnrichError::Extraction(ref m) if m == "invalid-api-key"));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let ex = parse_combined(r#"{"status":"OK"}"#).unwrap();
        assert!(!ex.has_annotations());
    }
}
