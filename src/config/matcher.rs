// src/config/matcher.rs
//! Thresholds for keyword retention and relation matching, loaded from TOML with env overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

pub const DEFAULT_MATCHER_CONFIG_PATH: &str = "config/matcher.toml";
pub const ENV_MATCHER_CONFIG_PATH: &str = "MATCHER_CONFIG_PATH";

pub const ENV_MIN_PERSON_SIMILARITY: &str = "MIN_PERSON_SIMILARITY";
pub const ENV_MIN_KEYWORD_SIMILARITY: &str = "MIN_KEYWORD_SIMILARITY";
pub const ENV_MIN_KEYWORD_RELEVANCE: &str = "MIN_KEYWORD_RELEVANCE";

pub const DEFAULT_MIN_KEYWORD_RELEVANCE: f64 = 0.5;
pub const DEFAULT_MIN_PERSON_SIMILARITY: f64 = 0.8;
pub const DEFAULT_MIN_KEYWORD_SIMILARITY: f64 = 0.6;
pub const DEFAULT_RESULT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Keywords below this relevance are dropped (inclusive lower bound).
    pub min_keyword_relevance: f64,
    /// Subject similarity must be strictly greater than this.
    pub min_person_similarity: f64,
    /// Object similarity must be strictly greater than this.
    pub min_keyword_similarity: f64,
    /// Max articles per query; 0 = unlimited.
    pub result_limit: usize,
    /// Sort matches by relevance instead of keeping corpus order.
    pub sort_by_relevance: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_keyword_relevance: DEFAULT_MIN_KEYWORD_RELEVANCE,
            min_person_similarity: DEFAULT_MIN_PERSON_SIMILARITY,
            min_keyword_similarity: DEFAULT_MIN_KEYWORD_SIMILARITY,
            result_limit: DEFAULT_RESULT_LIMIT,
            sort_by_relevance: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MatcherRoot {
    #[serde(default)]
    matcher: MatcherConfig,
}

impl MatcherConfig {
    /// Resolve the path from `MATCHER_CONFIG_PATH` or the default, then apply env overrides.
    ///
    /// A missing default file yields built-in defaults; a missing file named by the env var
    /// is an error.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(ENV_MATCHER_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_MATCHER_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::from_path(&path)?
            }
            Err(_) => {
                let path = Path::new(DEFAULT_MATCHER_CONFIG_PATH);
                if path.exists() {
                    Self::from_path(path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading matcher config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let root: MatcherRoot = toml::from_str(s).context("parsing matcher config")?;
        Ok(root.matcher.sanitized())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_unit_env(std::env::var(ENV_MIN_PERSON_SIMILARITY).ok()) {
            self.min_person_similarity = v;
        }
        if let Some(v) = parse_unit_env(std::env::var(ENV_MIN_KEYWORD_SIMILARITY).ok()) {
            self.min_keyword_similarity = v;
        }
        if let Some(v) = parse_unit_env(std::env::var(ENV_MIN_KEYWORD_RELEVANCE).ok()) {
            self.min_keyword_relevance = v;
        }
    }

    fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !(0.0..=1.0).contains(&self.min_person_similarity) {
            self.min_person_similarity = d.min_person_similarity;
        }
        if !(0.0..=1.0).contains(&self.min_keyword_similarity) {
            self.min_keyword_similarity = d.min_keyword_similarity;
        }
        if !self.min_keyword_relevance.is_finite() {
            self.min_keyword_relevance = d.min_keyword_relevance;
        }
        self
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_unit_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}
