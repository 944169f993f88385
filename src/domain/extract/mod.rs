//! Effect extraction: card text to effect tokens
//!
//! Text is split into clauses, every rule of the table runs over every
//! clause, and the per-clause results are kept as blocks. The card's automatic
//! effects are the union of its blocks.

pub mod clauses;
pub mod rules;

pub use clauses::{split_clauses, Clause, TimingMarker};

use crate::domain::card::{Card, CardType};
use crate::domain::effects::{EffectCategory, Effects};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const THIS_TURN: &str = ":ThisTurn";

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Run the card's trigger text through the rules as well
    pub include_trigger_text: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            include_trigger_text: true,
        }
    }
}

/// How long a durational effect lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    UntilEndOfTurn,
    UntilEndOfOppNextTurn,
    UntilStartOfYourNextTurn,
}

impl Duration {
    pub fn suffix(&self) -> &'static str {
        match self {
            Duration::UntilEndOfTurn => ":UntilEndOfTurn",
            Duration::UntilEndOfOppNextTurn => ":UntilEndOfOppNextTurn",
            Duration::UntilStartOfYourNextTurn => ":UntilStartOfYourNextTurn",
        }
    }
}

fn duration_patterns() -> &'static [(Duration, Regex)] {
    static PATTERNS: OnceLock<Vec<(Duration, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                Duration::UntilEndOfOppNextTurn,
                Regex::new(r"(?i)\buntil the end of your opponent's next turn\b").unwrap(),
            ),
            (
                Duration::UntilEndOfTurn,
                Regex::new(r"(?i)\buntil (?:the )?end of (?:this|your) turn\b").unwrap(),
            ),
            (
                Duration::UntilStartOfYourNextTurn,
                Regex::new(r"(?i)\buntil the start of your next turn\b").unwrap(),
            ),
        ]
    })
}

/// Distinct duration phrases of a clause
pub fn durations_in(clause: &str) -> Vec<Duration> {
    duration_patterns()
        .iter()
        .filter(|(_, regex)| regex.is_match(clause))
        .map(|(duration, _)| *duration)
        .collect()
}

/// Replace the `:ThisTurn` suffix of a durational token when the clause names
/// exactly one duration
pub fn apply_duration(token: &str, clause: &str) -> String {
    let Some(stem) = token.strip_suffix(THIS_TURN) else {
        return token.to_string();
    };
    match durations_in(clause).as_slice() {
        [] => token.to_string(),
        [duration] => format!("{}{}", stem, duration.suffix()),
        several => {
            log::debug!(
                "Clause names {} durations, keeping {}: {}",
                several.len(),
                token,
                clause
            );
            token.to_string()
        }
    }
}

/// Run every rule over one clause
pub fn extract_clause(clause: &Clause) -> Effects {
    let text = clause.text.replace('’', "'");
    let mut effects = Effects::new();

    for mechanic in clause.mechanics() {
        effects.insert(EffectCategory::Mechanics, mechanic);
    }

    for rule in rules::rules() {
        for emission in rule.apply(&text) {
            let token = if emission.durational {
                apply_duration(&emission.token, &text)
            } else {
                emission.token
            };
            log::debug!("{} -> {} {}", rule.name(), emission.category, token);
            effects.insert(emission.category, token);
        }
    }
    effects
}

/// Per-clause effects of a text, empty clauses dropped
pub fn extract_text(text: &str) -> Vec<Effects> {
    split_clauses(text)
        .iter()
        .map(extract_clause)
        .filter(|effects| !effects.is_empty())
        .collect()
}

/// Tokens a card carries regardless of what its text says
pub fn identity_effects(card: &Card) -> Effects {
    let mut effects = Effects::new();
    let has_trigger = card.trigger_text().is_some();

    if has_trigger {
        effects.insert(EffectCategory::Produces, "HasTrigger");
        if card.card_type == CardType::Character {
            effects.insert(EffectCategory::Produces, "Character:HasTrigger");
        }
    }
    if card.card_type == CardType::Character && card.text.trim().is_empty() && !has_trigger {
        effects.insert(EffectCategory::Produces, "NoBaseEffect");
    }
    effects
}

/// Result of extracting one card
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub blocks: Vec<Effects>,
    pub auto: Effects,
}

/// Extract a card's blocks and automatic effects
pub fn extract_card(card: &Card, options: &ExtractOptions) -> Extraction {
    let mut blocks = extract_text(&card.text);

    if options.include_trigger_text {
        if let Some(trigger) = card.trigger_text() {
            for mut block in extract_text(trigger) {
                block.insert(
                    EffectCategory::Mechanics,
                    TimingMarker::Trigger.mechanic(),
                );
                blocks.push(block);
            }
        }
    }

    let identity = identity_effects(card);
    if !identity.is_empty() {
        blocks.push(identity);
    }

    let mut auto = Effects::new();
    for block in &blocks {
        auto.extend(block);
    }
    Extraction { blocks, auto }
}
