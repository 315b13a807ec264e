// src/news/mod.rs
pub mod providers;
pub mod types;

use metrics::counter;
use once_cell::sync::OnceCell;

pub use crate::news::types::{CorpusSource, NewsDocument, RelationCandidate, RelationQuery};

/// Max characters kept from a title or sentence.
const MAX_TEXT_CHARS: usize = 1500;

/// Normalize article text: decode entities, strip tags, unify quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }
    out
}

/// Fetch the corpus for `query`; an unavailable corpus is logged and treated as empty.
pub async fn fetch_or_empty(source: &dyn CorpusSource, query: &RelationQuery) -> Vec<NewsDocument> {
    match source.fetch(query).await {
        Ok(docs) => docs,
        Err(e) => {
            counter!("corpus_errors_total").increment(1);
            tracing::warn!(target: "news", source = source.name(), error = %e, "corpus unavailable, using empty corpus");
            Vec::new()
        }
    }
}
