//! Effects records: what a card produces, requires, and which mechanics it shows

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The three token categories of an effects record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectCategory {
    /// Capabilities the card grants (a.k.a. outbound)
    Produces,
    /// Conditions or gates the card depends on (a.k.a. inbound)
    Requires,
    /// Timing keywords and printed abilities (a.k.a. keywords)
    Mechanics,
}

impl EffectCategory {
    pub const ALL: [EffectCategory; 3] = [
        EffectCategory::Produces,
        EffectCategory::Requires,
        EffectCategory::Mechanics,
    ];
}

impl fmt::Display for EffectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectCategory::Produces => "produces",
            EffectCategory::Requires => "requires",
            EffectCategory::Mechanics => "mechanics",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EffectCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "produces" | "outbound" => Ok(EffectCategory::Produces),
            "requires" | "inbound" => Ok(EffectCategory::Requires),
            "mechanics" | "keywords" => Ok(EffectCategory::Mechanics),
            _ => Err(format!(
                "Invalid category: {} (expected produces, requires or mechanics)",
                s
            )),
        }
    }
}

/// Per-category token sets
///
/// Sets are ordered so that every artifact serializes identically between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effects {
    #[serde(default, alias = "outbound")]
    pub produces: BTreeSet<String>,
    #[serde(default, alias = "inbound")]
    pub requires: BTreeSet<String>,
    #[serde(default, alias = "keywords")]
    pub mechanics: BTreeSet<String>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.produces.is_empty() && self.requires.is_empty() && self.mechanics.is_empty()
    }

    pub fn get(&self, category: EffectCategory) -> &BTreeSet<String> {
        match category {
            EffectCategory::Produces => &self.produces,
            EffectCategory::Requires => &self.requires,
            EffectCategory::Mechanics => &self.mechanics,
        }
    }

    pub fn get_mut(&mut self, category: EffectCategory) -> &mut BTreeSet<String> {
        match category {
            EffectCategory::Produces => &mut self.produces,
            EffectCategory::Requires => &mut self.requires,
            EffectCategory::Mechanics => &mut self.mechanics,
        }
    }

    /// Add a token; returns false when it was already present
    pub fn insert(&mut self, category: EffectCategory, token: impl Into<String>) -> bool {
        self.get_mut(category).insert(token.into())
    }

    pub fn contains(&self, category: EffectCategory, token: &str) -> bool {
        self.get(category).contains(token)
    }

    /// In-place per-category union
    pub fn extend(&mut self, other: &Effects) {
        for category in EffectCategory::ALL {
            let extra = other.get(category).iter().cloned();
            self.get_mut(category).extend(extra);
        }
    }

    /// Per-category union
    pub fn union(&self, other: &Effects) -> Effects {
        let mut merged = self.clone();
        merged.extend(other);
        merged
    }

    /// Per-category set difference
    pub fn difference(&self, other: &Effects) -> Effects {
        let mut result = Effects::new();
        for category in EffectCategory::ALL {
            let kept = self
                .get(category)
                .difference(other.get(category))
                .cloned()
                .collect();
            *result.get_mut(category) = kept;
        }
        result
    }

    /// Total number of tokens across all categories
    pub fn len(&self) -> usize {
        self.produces.len() + self.requires.len() + self.mechanics.len()
    }
}

/// A manual amendment: tokens to add and tokens to remove, per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectsDelta {
    #[serde(default)]
    pub add: Effects,
    #[serde(default)]
    pub remove: Effects,
}

impl EffectsDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// `(base ∪ add) − remove`, per category
    pub fn apply(&self, base: &Effects) -> Effects {
        base.union(&self.add).difference(&self.remove)
    }
}
