//! Edge filters applied after the ladders

use crate::domain::card::{Card, CardType};
use crate::domain::effects::Effects;
use regex::Regex;
use std::sync::OnceLock;

fn leader_type_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^NeedsLeaderType:\{(.+)\}$").unwrap())
}

fn leader_any_of_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^LeaderIsTraitAnyOf:\[(.*)\]$").unwrap())
}

/// Restricts edges to consumers a leader with the given traits can support
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderTraitFilter {
    traits: Vec<String>,
}

impl LeaderTraitFilter {
    pub fn new(traits: impl IntoIterator<Item = String>) -> Self {
        LeaderTraitFilter {
            traits: traits
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated trait list
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(',').map(str::to_string))
    }

    pub fn traits(&self) -> &[String] {
        &self.traits
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    fn knows(&self, name: &str) -> bool {
        self.traits
            .iter()
            .any(|t| t.eq_ignore_ascii_case(name.trim()))
    }

    /// Whether a consumer with these effects may receive edges
    pub fn allows(&self, consumer: &Effects) -> bool {
        if self.is_empty() {
            return true;
        }
        consumer.requires.iter().all(|token| {
            if let Some(name) = token.strip_prefix("LeaderIsTrait:") {
                return self.knows(name);
            }
            if let Some(caps) = leader_type_regex().captures(token) {
                return self.knows(&caps[1]);
            }
            if let Some(caps) = leader_any_of_regex().captures(token) {
                return caps[1].split(',').any(|name| self.knows(name));
            }
            true
        })
    }
}

/// Leader and colour compatibility of an ordered pair
///
/// Two leaders never pair. A leader pairs with a playable card only when the
/// card's colours all belong to the leader. Missing metadata passes.
pub fn colour_compatible(from: Option<&Card>, to: Option<&Card>) -> bool {
    let (Some(from), Some(to)) = (from, to) else {
        return true;
    };
    match (&from.card_type, &to.card_type) {
        (CardType::Leader, CardType::Leader) => false,
        (CardType::Leader, other) if other.is_playable() => to.colors_within(&from.color),
        (other, CardType::Leader) if other.is_playable() => from.colors_within(&to.color),
        _ => true,
    }
}
