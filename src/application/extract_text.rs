//! Ad-hoc extraction use case

use crate::domain::card::{Card, CardType};
use crate::domain::extract::{extract_card, split_clauses, ExtractOptions, Extraction};

/// Extract a piece of card text as if it were printed on a card of `card_type`
pub fn extract_text(
    text: &str,
    trigger: Option<&str>,
    card_type: CardType,
    options: &ExtractOptions,
) -> Extraction {
    let mut card = Card::new("adhoc", "adhoc", card_type).with_text(text);
    if let Some(trigger) = trigger {
        card = card.with_trigger(trigger);
    }
    log::debug!("Text splits into {} clauses", split_clauses(text).len());
    extract_card(&card, options)
}
