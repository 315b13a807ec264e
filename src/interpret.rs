// src/interpret.rs
//! Turn interpreter: merges fresh annotations into the conversation context and decides
//! whether enough is known (person + topic) to query the news corpus.
//!
//! Selection is explicit "first in input order" for both the person entity and the date.

use chrono::NaiveDate;
use serde::Serialize;

use crate::annotate::{DateMention, Entity, Extraction, Keyword};
use crate::session::ConversationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnStatus {
    ReadyForQuery,
    MissingPersonAndTopic,
    MissingPerson,
    MissingTopic,
}

impl TurnStatus {
    pub fn from_parts(has_person: bool, has_topic: bool) -> Self {
        match (has_person, has_topic) {
            (true, true) => TurnStatus::ReadyForQuery,
            (false, false) => TurnStatus::MissingPersonAndTopic,
            (false, true) => TurnStatus::MissingPerson,
            (true, false) => TurnStatus::MissingTopic,
        }
    }

    pub fn is_ready(self) -> bool {
        self == TurnStatus::ReadyForQuery
    }
}

/// What changed during one interpretation (drives the response fragments).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnUpdates {
    pub person_found: bool,
    pub date_found: bool,
    pub keywords_replaced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub context: ConversationContext,
    pub status: TurnStatus,
    pub updates: TurnUpdates,
}

/// First entity of type `Person`, in input order.
pub fn first_person(entities: &[Entity]) -> Option<&Entity> {
    entities.iter().find(|e| e.is_person())
}

/// Convert a `YYYYMMDD[...]` mention into `now-<N>d`, `N = |today - date|` in whole days.
///
/// The direction (past/future) is dropped; consumers only understand the subtractive form.
pub fn date_offset_token(mention: &DateMention, today: NaiveDate) -> Option<String> {
    let raw = mention.date.trim();
    let ymd = raw.get(0..8)?;
    let found = NaiveDate::parse_from_str(ymd, "%Y%m%d").ok()?;
    let days = (today - found).num_days().abs();
    Some(format!("now-{days}d"))
}

/// Keep non-blank keywords with `relevance >= min_relevance` that are not the person's surface text.
pub fn retain_keywords(keywords: &[Keyword], person: Option<&Entity>, min_relevance: f64) -> Vec<Keyword> {
    let person_text = person.map(|p| p.text.trim().to_lowercase());
    keywords
        .iter()
        .filter(|k| !k.text.trim().is_empty())
        .filter(|k| k.relevance >= min_relevance)
        .filter(|k| match &person_text {
            Some(pt) => k.text.trim().to_lowercase() != *pt,
            None => true,
        })
        .cloned()
        .collect()
}

/// Merge `extraction` into `context`.
///
/// - a person is replaced only by a newer `Person` entity, never cleared;
/// - the first date mention replaces the window start;
/// - a non-empty keyword list replaces the held keywords even when filtering empties it.
pub fn interpret(
    context: &ConversationContext,
    extraction: &Extraction,
    today: NaiveDate,
    min_keyword_relevance: f64,
) -> Interpretation {
    let mut ctx = context.clone();
    let mut updates = TurnUpdates::default();

    if let Some(person) = first_person(&extraction.entities) {
        ctx.person = Some(person.clone());
        updates.person_found = true;
    }

    if let Some(first) = extraction.dates.first() {
        match date_offset_token(first, today) {
            Some(token) => {
                ctx.start_date = token;
                updates.date_found = true;
            }
            None => {
                tracing::warn!(target: "interpret", date = %first.date, "unparsable date mention ignored");
            }
        }
    }

    if !extraction.keywords.is_empty() {
        ctx.keywords = retain_keywords(&extraction.keywords, ctx.person.as_ref(), min_keyword_relevance);
        updates.keywords_replaced = true;
    }

    let status = TurnStatus::from_parts(!ctx.person_name().trim().is_empty(), !ctx.keywords.is_empty());

    Interpretation {
        context: ctx,
        status,
        updates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::PERSON_TYPE;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entity(text: &str, kind: &str) -> Entity {
        Entity {
            text: text.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    #[test]
    fn first_person_wins() {
        let ents = vec![
            entity("IBM", "Company"),
            entity("Hillary Clinton", PERSON_TYPE),
            entity("Donald Trump", PERSON_TYPE),
        ];
        assert_eq!(first_person(&ents).unwrap().text, "Hillary Clinton");
        assert!(first_person(&ents[..1]).is_none());
    }

    #[test]
    fn date_offset_matches_calendar_days() {
        let m = DateMention {
            date: "20230115".into(),
            text: None,
        };
        assert_eq!(date_offset_token(&m, day(2023, 3, 1)).as_deref(), Some("now-45d"));

        let future = DateMention {
            date: "20230316T000000".into(),
            text: None,
        };
        assert_eq!(date_offset_token(&future, day(2023, 3, 1)).as_deref(), Some("now-15d"));

        let junk = DateMention {
            date: "2023".into(),
            text: None,
        };
        assert!(date_offset_token(&junk, day(2023, 3, 1)).is_none());
    }

    #[test]
    fn person_is_kept_on_off_topic_turn() {
        let mut ctx = ConversationContext::default();
        ctx.person = Some(Entity::person("Hillary Clinton"));
        let ex = Extraction {
            entities: vec![entity("Paris", "City")],
            ..Default::default()
        };
        let out = interpret(&ctx, &ex, day(2023, 3, 1), 0.5);
        assert_eq!(out.context.person_name(), "Hillary Clinton");
        assert!(!out.updates.person_found);
    }

    #[test]
    fn disambiguated_name_is_used() {
        let mut p = Entity::person("Hillary");
        p.disambiguated_name = Some("Hillary Rodham Clinton".into());
        let ex = Extraction {
            entities: vec![p],
            ..Default::default()
        };
        let out = interpret(&ConversationContext::default(), &ex, day(2023, 3, 1), 0.5);
        assert_eq!(out.context.person_name(), "Hillary Rodham Clinton");
    }

    #[test]
    fn keyword_filter_drops_low_relevance_and_person_text() {
        let person = Entity::person("Hillary Clinton");
        let kws = vec![
            Keyword::new("hillary clinton", 0.99),
            Keyword::new("Syria", 0.8),
            Keyword::new("weather", 0.2),
            Keyword::new("emails", 0.5),
        ];
        let kept = retain_keywords(&kws, Some(&person), 0.5);
        let texts: Vec<_> = kept.iter().map(|k| k.text.as_str()).collect();
        assert_eq!(texts, vec!["Syria", "emails"]);
    }

    #[test]
    fn blank_keywords_do_not_make_a_topic() {
        let mut ctx = ConversationContext::default();
        ctx.person = Some(Entity::person("Hillary Clinton"));
        let ex = Extraction {
            keywords: vec![Keyword::new("", 0.9), Keyword::new("   ", 0.95)],
            ..Default::default()
        };
        let out = interpret(&ctx, &ex, day(2023, 3, 1), 0.5);
        assert!(out.context.keywords.is_empty());
        assert_eq!(out.status, TurnStatus::MissingTopic);
    }

    #[test]
    fn unparsable_date_keeps_previous_window() {
        let mut ctx = ConversationContext::default();
        ctx.start_date = "now-10d".into();
        let ex = Extraction {
            dates: vec![DateMention {
                date: "garbage".into(),
                text: None,
            }],
            ..Default::default()
        };
        let out = interpret(&ctx, &ex, day(2023, 3, 1), 0.5);
        assert_eq!(out.context.start_date, "now-10d");
        assert!(!out.updates.date_found);
    }
}
