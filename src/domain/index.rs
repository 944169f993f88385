//! Postings index: token to the cards carrying it

use crate::domain::card::is_alt_art;
use crate::domain::effects::Effects;
use crate::domain::tags::{EffectSource, TagStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type Postings = BTreeMap<String, BTreeSet<String>>;

/// Inverted index over produces and requires tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingsIndex {
    pub by_produces: Postings,
    pub by_requires: Postings,
}

impl PostingsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a set of cards in one pass; alternate arts are skipped
    pub fn from_effects<'a>(cards: impl IntoIterator<Item = (&'a str, &'a Effects)>) -> Self {
        let mut index = PostingsIndex::new();
        for (card_id, effects) in cards {
            index.insert(card_id, effects);
        }
        index
    }

    /// Index a tag store using the chosen record of every entry
    pub fn from_store(store: &TagStore, source: EffectSource) -> Self {
        let mut index = PostingsIndex::new();
        for (card_id, entry) in store.regular_entries() {
            index.insert(card_id, &entry.effects(source));
        }
        index
    }

    pub fn insert(&mut self, card_id: &str, effects: &Effects) {
        if is_alt_art(card_id) {
            return;
        }
        for token in &effects.produces {
            self.by_produces
                .entry(token.clone())
                .or_default()
                .insert(card_id.to_string());
        }
        for token in &effects.requires {
            self.by_requires
                .entry(token.clone())
                .or_default()
                .insert(card_id.to_string());
        }
    }

    pub fn producers(&self, token: &str) -> Option<&BTreeSet<String>> {
        self.by_produces.get(token)
    }

    pub fn consumers(&self, token: &str) -> Option<&BTreeSet<String>> {
        self.by_requires.get(token)
    }

    /// Every card id that appears in any posting
    pub fn card_ids(&self) -> BTreeSet<&str> {
        self.by_produces
            .values()
            .chain(self.by_requires.values())
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub cards: usize,
}

/// The index as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexArtifact {
    #[serde(flatten)]
    pub index: PostingsIndex,
    pub meta: IndexMeta,
}
