// src/news/providers/fixture.rs
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;

use crate::error::{EnrichError, Result};
use crate::news::types::{CorpusSource, NewsDocument, RelationQuery};

/// Sample corpus bundled with the binary for mock mode.
const EMBEDDED_CORPUS: &str = include_str!("../../../fixtures/news_corpus.json");

/// Corpus read from a JSON array of documents. The query is ignored: the whole fixture
/// is handed to the matcher.
pub struct FixtureCorpus {
    pub json_content: String,
}

impl FixtureCorpus {
    pub fn from_fixture(content: &str) -> Self {
        Self {
            json_content: content.to_string(),
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading news fixture from {}", path.display()))?;
        Ok(Self::from_fixture(&content))
    }

    pub fn embedded() -> Self {
        Self::from_fixture(EMBEDDED_CORPUS)
    }
}

#[async_trait]
impl CorpusSource for FixtureCorpus {
    async fn fetch(&self, _query: &RelationQuery) -> Result<Vec<NewsDocument>> {
        serde_json::from_str(&self.json_content)
            .map_err(|e| EnrichError::CorpusUnavailable(format!("parsing news fixture: {e}")))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
