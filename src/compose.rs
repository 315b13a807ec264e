// src/compose.rs
//! Builds the user-facing text of a turn from discrete `<br>`-separated fragments.

use crate::dialog::Intent;
use crate::interpret::{Interpretation, TurnStatus};
use crate::matcher::MatchResult;

pub const FRAGMENT_SEPARATOR: &str = "<br>";

/// Confidence at or above which the intent counts as understood.
pub const UNDERSTOOD_CONFIDENCE: f64 = 0.75;
/// Confidence at or above which the intent is a reasonable guess.
pub const GUESS_CONFIDENCE: f64 = 0.5;

/// What the enrichment stages produced for this turn.
#[derive(Debug, Clone, Copy)]
pub enum Enrichment<'a> {
    /// Annotation failed; the note is appended to the dialogue text.
    Unavailable { note: &'a str },
    /// The annotator found nothing usable.
    NothingFound,
    Interpreted {
        interpretation: &'a Interpretation,
        /// `None` when article retrieval is disabled or the turn was not ready.
        articles: Option<&'a [MatchResult]>,
    },
}

/// Sentence describing the primary intent, banded by confidence (higher band inclusive).
pub fn intent_sentence(intent: &Intent) -> String {
    if intent.confidence >= UNDERSTOOD_CONFIDENCE {
        format!("I understood your intent was {}", intent.intent)
    } else if intent.confidence >= GUESS_CONFIDENCE {
        format!("I think your intent was {}", intent.intent)
    } else {
        "I did not understand your intent".to_string()
    }
}

fn missing_prompts(status: TurnStatus, person_name: &str) -> Vec<String> {
    match status {
        TurnStatus::ReadyForQuery => Vec::new(),
        TurnStatus::MissingPersonAndTopic => vec![
            "Which person are you interested in?".to_string(),
            "Which topic are you interested in?".to_string(),
        ],
        TurnStatus::MissingPerson => vec!["Which person are you interested in?".to_string()],
        TurnStatus::MissingTopic => vec![format!(
            "Which topic about {person_name} are you interested in?"
        )],
    }
}

fn article_fragments(articles: &[MatchResult]) -> Vec<String> {
    if articles.is_empty() {
        return vec!["No related articles found".to_string()];
    }
    articles
        .iter()
        .flat_map(|m| {
            [
                format!("Found article: {}", m.title),
                format!("via {}", m.url),
                format!("\"{}\"", m.sentence),
            ]
        })
        .collect()
}

/// Assemble the display string for one turn.
pub fn compose(dialog_text: &str, enrichment: Enrichment<'_>, intent: Option<&Intent>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !dialog_text.trim().is_empty() {
        parts.push(dialog_text.to_string());
    }

    match enrichment {
        Enrichment::Unavailable { note } => parts.push(format!("Annotation error: {note}")),
        Enrichment::NothingFound => {}
        Enrichment::Interpreted {
            interpretation,
            articles,
        } => {
            let ctx = &interpretation.context;
            if !ctx.person_name().is_empty() {
                parts.push(format!("Found person: {}", ctx.person_name()));
            }
            if interpretation.updates.date_found {
                parts.push(format!("Searching articles since {}", ctx.start_date));
            }
            if !ctx.keywords.is_empty() {
                let kws: Vec<&str> = ctx.keywords.iter().map(|k| k.text.as_str()).collect();
                parts.push(format!("Found keywords: {}", kws.join(", ")));
            }
            parts.extend(missing_prompts(interpretation.status, ctx.person_name()));
            if let (TurnStatus::ReadyForQuery, Some(found)) = (interpretation.status, articles) {
                parts.extend(article_fragments(found));
            }
        }
    }

    if let Some(i) = intent {
        parts.push(intent_sentence(i));
    }
    parts.join(FRAGMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{Entity, Keyword};
    use crate::interpret::TurnUpdates;
    use crate::session::ConversationContext;

    fn intent(c: f64) -> Intent {
        Intent {
            intent: "news".into(),
            confidence: c,
        }
    }

    #[test]
    fn confidence_bands_with_inclusive_boundaries() {
        assert_eq!(intent_sentence(&intent(0.8)), "I understood your intent was news");
        assert_eq!(intent_sentence(&intent(0.75)), "I understood your intent was news");
        assert_eq!(intent_sentence(&intent(0.6)), "I think your intent was news");
        assert_eq!(intent_sentence(&intent(0.5)), "I think your intent was news");
        assert_eq!(intent_sentence(&intent(0.3)), "I did not understand your intent");
    }

    #[test]
    fn failure_note_is_appended() {
        let out = compose("Hello", Enrichment::Unavailable { note: "boom" }, None);
        assert_eq!(out, "Hello<br>Annotation error: boom");
    }

    #[test]
    fn nothing_found_keeps_dialog_text() {
        let out = compose("Hello", Enrichment::NothingFound, Some(&intent(0.9)));
        assert_eq!(out, "Hello<br>I understood your intent was news");
    }

    #[test]
    fn missing_topic_prompt_mentions_person() {
        let mut ctx = ConversationContext::default();
        ctx.person = Some(Entity::person("Hillary Clinton"));
        let interp = Interpretation {
            context: ctx,
            status: TurnStatus::MissingTopic,
            updates: TurnUpdates {
                person_found: true,
                ..Default::default()
            },
        };
        let out = compose(
            "",
            Enrichment::Interpreted {
                interpretation: &interp,
                articles: None,
            },
            None,
        );
        assert_eq!(
            out,
            "Found person: Hillary Clinton<br>Which topic about Hillary Clinton are you interested in?"
        );
    }

    #[test]
    fn ready_turn_lists_articles_or_says_none() {
        let mut ctx = ConversationContext::default();
        ctx.person = Some(Entity::person("Hillary Clinton"));
        ctx.keywords = vec![Keyword::new("Syria", 0.9)];
        let interp = Interpretation {
            context: ctx,
            status: TurnStatus::ReadyForQuery,
            updates: TurnUpdates::default(),
        };
        let found = vec![MatchResult {
            url: "https://x/a".into(),
            title: "T".into(),
            sentence: "S".into(),
            relevance: 2.0,
        }];
        let out = compose(
            "Ok",
            Enrichment::Interpreted {
                interpretation: &interp,
                articles: Some(&found),
            },
            None,
        );
        assert!(out.ends_with("Found article: T<br>via https://x/a<br>\"S\""), "{out}");

        let none = compose(
            "Ok",
            Enrichment::Interpreted {
                interpretation: &interp,
                articles: Some(&[]),
            },
            None,
        );
        assert!(none.ends_with("No related articles found"), "{none}");
    }
}
