// src/matcher.rs
//! Relation matcher: keeps the news documents that contain a relation whose subject
//! resembles the query person and whose object resembles the query topic, and picks
//! the best-supported sentence of each.
//!
//! Scoring per document:
//! - a candidate with a subject match records its subject score under its sentence, keeping
//!   the best subject score if the sentence repeats;
//! - an object match adds its score to that sentence's entry, but only if the entry already
//!   exists (object-only candidates contribute nothing);
//! - a sentence's score is its best subject score plus every object score added to it;
//! - a candidate matches when both sides match; the document keeps the matching candidate
//!   with the highest sentence score (first one wins ties).
//!
//! Both thresholds are strict: a score equal to the threshold is not a match.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::MatcherConfig;
use crate::news::{NewsDocument, RelationQuery};
use crate::similarity::best_similarity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub url: String,
    pub title: String,
    pub sentence: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    pub min_person_similarity: f64,
    pub min_keyword_similarity: f64,
}

impl From<&MatcherConfig> for MatchThresholds {
    fn from(cfg: &MatcherConfig) -> Self {
        Self {
            min_person_similarity: cfg.min_person_similarity,
            min_keyword_similarity: cfg.min_keyword_similarity,
        }
    }
}

/// Per-sentence accumulator; the subject part is kept apart so a repeated sentence can only
/// raise it, never overwrite the object part.
#[derive(Debug, Clone, Copy)]
struct SentenceScore {
    subject: f64,
    objects: f64,
}

impl SentenceScore {
    fn total(&self) -> f64 {
        self.subject + self.objects
    }
}

/// Best matching relation of one document, or `None` when no relation matches both sides.
pub fn match_document(
    query: &RelationQuery,
    doc: &NewsDocument,
    thresholds: MatchThresholds,
) -> Option<MatchResult> {
    let mut relevance_by_sentence: HashMap<&str, SentenceScore> = HashMap::new();
    // (candidate index, subject + object score)
    let mut matched: Vec<(usize, f64)> = Vec::new();

    for (idx, cand) in doc.relations.iter().enumerate() {
        let subject_score =
            best_similarity(&cand.subject_entities, &query.subject_text).unwrap_or(0.0);
        let has_subject = subject_score > thresholds.min_person_similarity;
        if has_subject {
            let entry = relevance_by_sentence
                .entry(cand.sentence.as_str())
                .or_insert(SentenceScore {
                    subject: subject_score,
                    objects: 0.0,
                });
            if subject_score > entry.subject {
                entry.subject = subject_score;
            }
        }

        let object_score =
            best_similarity(&cand.object_keywords, &query.object_text).unwrap_or(0.0);
        let has_object = object_score > thresholds.min_keyword_similarity;
        if has_object {
            if let Some(entry) = relevance_by_sentence.get_mut(cand.sentence.as_str()) {
                entry.objects += object_score;
            }
        }

        if has_subject && has_object {
            matched.push((idx, subject_score + object_score));
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, own_score) in matched {
        let score = relevance_by_sentence
            .get(doc.relations[idx].sentence.as_str())
            .map(SentenceScore::total)
            .unwrap_or(own_score);
        match best {
            Some((_, b)) if b >= score => {}
            _ => best = Some((idx, score)),
        }
    }

    best.map(|(idx, relevance)| MatchResult {
        url: doc.url.clone(),
        title: doc.title.clone(),
        sentence: doc.relations[idx].sentence.clone(),
        relevance,
    })
}

/// Match every document of `corpus` against `query`.
///
/// Results keep corpus order unless `cfg.sort_by_relevance` is set (stable, descending).
/// At most `query.result_limit` results are returned; `0` means unlimited.
pub fn match_relations(
    query: &RelationQuery,
    corpus: &[NewsDocument],
    cfg: &MatcherConfig,
) -> Vec<MatchResult> {
    let thresholds = MatchThresholds::from(cfg);
    let mut out: Vec<MatchResult> = corpus
        .iter()
        .filter_map(|doc| match_document(query, doc, thresholds))
        .collect();

    if cfg.sort_by_relevance {
        out.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    }
    if query.result_limit > 0 {
        out.truncate(query.result_limit);
    }

    tracing::debug!(
        target: "matcher",
        corpus = corpus.len(),
        matched = out.len(),
        "relation matching done"
    );
    out
}
