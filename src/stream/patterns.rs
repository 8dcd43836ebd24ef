//! Request classification and routing.
//!
//! A message is matched against an ordered list of keyword predicates; the
//! first hit decides which emitter sequence runs. The order encodes
//! precedence and is part of the protocol contract — reordering it changes
//! which pattern wins for mixed messages.
//!
//! All predicates are word-boundary matches over a lowercased copy of the
//! message, so "suitable" does not trigger the table pattern.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::component::ComponentRegistry;
use crate::errors::StreamError;
use crate::planner::LlmPlanner;
use crate::stream::{StreamSink, card, chart, table};

static LLM_PLAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(ai|llm|plan|analyze|dashboard|intelligent|smart|insights?|summary)\b").unwrap()
});

static DELAYED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(delayed|partial)\b").unwrap());

static CARD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(cards?|components?)\b").unwrap());

static CARDS_PLURAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(cards|components)\b").unwrap());

static MULTI_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(two|2|three|3|multiple|several)\b").unwrap());

static INCREMENTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(loading|states?|progressive)\b").unwrap());

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(tables?|sales|users?|products?)\b").unwrap());

static CHART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(charts?|lines?|bars?|graphs?|plots?|trends?|revenue|growth|performance|metrics?)\b",
    )
    .unwrap()
});

/// The equivalence classes of request messages, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// LLM-planned component layout.
    LlmPlan,
    /// One card introduced partially, completed after a hard wait.
    DelayedCard,
    /// Several cards introduced partially, completed after a shared wait.
    DelayedMultiCards,
    /// Several cards, introduced empty and filled in sequence.
    MultiCards,
    /// One card, introduced empty and filled once.
    SingleCard,
    /// One card filled one field at a time.
    IncrementalCard,
    /// Progressive tables.
    Tables,
    /// Progressive charts.
    Charts,
    /// Plain text, no components.
    Default,
}

impl Pattern {
    /// Classify a message. Deterministic: same input, same pattern.
    ///
    /// The multi-card checks must run before the single-card check so that
    /// "two delayed cards" is not swallowed by the simpler predicates; a
    /// bare singular "card" falls through the multi check because it needs
    /// either a plural keyword or an explicit count.
    pub fn detect(message: &str) -> Pattern {
        let lower = message.to_lowercase();

        if LLM_PLAN.is_match(&lower) {
            return Pattern::LlmPlan;
        }

        let delayed = DELAYED.is_match(&lower);
        let card = CARD.is_match(&lower);
        let multi = MULTI_COUNT.is_match(&lower);
        let tabular = TABLE.is_match(&lower) || CHART.is_match(&lower);

        if delayed && card && !multi {
            return Pattern::DelayedCard;
        }
        if delayed && card && multi {
            return Pattern::DelayedMultiCards;
        }
        if (CARDS_PLURAL.is_match(&lower) || multi) && !tabular {
            return Pattern::MultiCards;
        }
        if card {
            return Pattern::SingleCard;
        }
        if INCREMENTAL.is_match(&lower) {
            return Pattern::IncrementalCard;
        }
        if TABLE.is_match(&lower) {
            return Pattern::Tables;
        }
        if CHART.is_match(&lower) {
            return Pattern::Charts;
        }
        Pattern::Default
    }
}

static COUNT_THREE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(three|3)\b").unwrap());
static COUNT_FOUR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(four|4)\b").unwrap());
static COUNT_FIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(five|5)\b").unwrap());
static COUNT_SOME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(multiple|several)\b").unwrap());

/// Number of cards requested. An unspecific "multiple"/"several" means 3;
/// anything else with a multi keyword means 2. Callers clamp to the
/// configured maximum.
pub(crate) fn card_count(lower: &str) -> usize {
    if COUNT_THREE.is_match(lower) {
        3
    } else if COUNT_FOUR.is_match(lower) {
        4
    } else if COUNT_FIVE.is_match(lower) {
        5
    } else if COUNT_SOME.is_match(lower) {
        3
    } else {
        2
    }
}

/// Number of tables or charts requested; defaults to 1.
pub(crate) fn collection_count(lower: &str) -> usize {
    if COUNT_THREE.is_match(lower) {
        3
    } else if MULTI_COUNT.is_match(lower) {
        2
    } else {
        1
    }
}

/// Route a request to its emitter sequence.
///
/// Owns the per-request registry; it is dropped with the request task.
pub async fn dispatch(
    message: &str,
    sink: &StreamSink,
    planner: &LlmPlanner,
) -> Result<(), StreamError> {
    let mut registry = ComponentRegistry::new();
    let lower = message.to_lowercase();
    let pattern = Pattern::detect(message);
    info!(?pattern, "dispatching request");

    match pattern {
        Pattern::LlmPlan => planner.stream_plan(message, sink, &mut registry).await,
        Pattern::DelayedCard => card::delayed_card(sink, &mut registry).await,
        Pattern::DelayedMultiCards => {
            card::delayed_multi_cards(sink, &mut registry, card_count(&lower)).await
        }
        Pattern::MultiCards => card::multi_cards(sink, &mut registry, card_count(&lower)).await,
        Pattern::SingleCard => card::single_card(sink, &mut registry).await,
        Pattern::IncrementalCard => card::incremental_card(sink, &mut registry).await,
        Pattern::Tables => table::handle_tables(&lower, sink, &mut registry).await,
        Pattern::Charts => chart::handle_charts(&lower, sink, &mut registry).await,
        Pattern::Default => default_response(sink).await,
    }
}

/// Text-only reply when no pattern matches.
async fn default_response(sink: &StreamSink) -> Result<(), StreamError> {
    sink.text(
        "This is a text-only response. Try asking for 'a card', 'two cards', \
         'show me loading states', 'show me a table', or 'show me a chart' \
         to see progressive component rendering in action!",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_card() {
        assert_eq!(Pattern::detect("show me a card"), Pattern::SingleCard);
        assert_eq!(Pattern::detect("show me a component"), Pattern::SingleCard);
    }

    #[test]
    fn test_delayed_single_card() {
        assert_eq!(Pattern::detect("show me a delayed card"), Pattern::DelayedCard);
        assert_eq!(Pattern::detect("partial card please"), Pattern::DelayedCard);
    }

    #[test]
    fn test_delayed_multi_beats_simpler_patterns() {
        assert_eq!(
            Pattern::detect("show me two delayed cards"),
            Pattern::DelayedMultiCards
        );
        assert_eq!(
            Pattern::detect("three delayed components"),
            Pattern::DelayedMultiCards
        );
    }

    #[test]
    fn test_multi_cards() {
        assert_eq!(Pattern::detect("show me two cards"), Pattern::MultiCards);
        assert_eq!(Pattern::detect("several cards"), Pattern::MultiCards);
        // A bare count with nothing else still means cards
        assert_eq!(Pattern::detect("three"), Pattern::MultiCards);
        assert_eq!(Pattern::detect("cards"), Pattern::MultiCards);
    }

    #[test]
    fn test_multi_count_with_table_keyword_goes_to_tables() {
        assert_eq!(Pattern::detect("show me two tables"), Pattern::Tables);
        assert_eq!(Pattern::detect("two sales tables"), Pattern::Tables);
    }

    #[test]
    fn test_multi_count_with_chart_keyword_goes_to_charts() {
        assert_eq!(Pattern::detect("show me two charts"), Pattern::Charts);
        assert_eq!(Pattern::detect("two line charts"), Pattern::Charts);
    }

    #[test]
    fn test_incremental_loading() {
        assert_eq!(
            Pattern::detect("show me loading states"),
            Pattern::IncrementalCard
        );
        assert_eq!(
            Pattern::detect("progressive rendering demo"),
            Pattern::IncrementalCard
        );
    }

    #[test]
    fn test_tables() {
        assert_eq!(Pattern::detect("show me sales table"), Pattern::Tables);
        assert_eq!(Pattern::detect("list the users"), Pattern::Tables);
        assert_eq!(Pattern::detect("products"), Pattern::Tables);
    }

    #[test]
    fn test_charts() {
        assert_eq!(Pattern::detect("show me a line chart"), Pattern::Charts);
        assert_eq!(Pattern::detect("revenue graph"), Pattern::Charts);
        assert_eq!(Pattern::detect("growth trend"), Pattern::Charts);
    }

    #[test]
    fn test_llm_plan_wins_over_everything() {
        assert_eq!(
            Pattern::detect("show me ai dashboard with sales trends"),
            Pattern::LlmPlan
        );
        assert_eq!(Pattern::detect("give me a summary card"), Pattern::LlmPlan);
    }

    #[test]
    fn test_default_for_empty_and_unmatched() {
        assert_eq!(Pattern::detect(""), Pattern::Default);
        assert_eq!(Pattern::detect("hello there"), Pattern::Default);
    }

    #[test]
    fn test_word_boundary_matching() {
        // "suitable" must not match "table", "stable" must not either
        assert_eq!(Pattern::detect("is this suitable"), Pattern::Default);
        assert_eq!(Pattern::detect("a stable system"), Pattern::Default);
        // "scards" is not "cards"
        assert_eq!(Pattern::detect("discards"), Pattern::Default);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Pattern::detect("SHOW ME A CARD"), Pattern::SingleCard);
        assert_eq!(Pattern::detect("Sales Table"), Pattern::Tables);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let message = "show me two delayed cards";
        let first = Pattern::detect(message);
        for _ in 0..10 {
            assert_eq!(Pattern::detect(message), first);
        }
    }

    #[test]
    fn test_card_count() {
        assert_eq!(card_count("two cards"), 2);
        assert_eq!(card_count("three cards"), 3);
        assert_eq!(card_count("4 cards"), 4);
        assert_eq!(card_count("five cards"), 5);
        assert_eq!(card_count("several cards"), 3);
        assert_eq!(card_count("multiple components"), 3);
    }

    #[test]
    fn test_collection_count() {
        assert_eq!(collection_count("a table"), 1);
        assert_eq!(collection_count("two tables"), 2);
        assert_eq!(collection_count("three charts"), 3);
        assert_eq!(collection_count("multiple tables"), 2);
    }
}
