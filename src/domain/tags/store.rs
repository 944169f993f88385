//! Tag store: automatic and manual tags per card, and the merge between them
//!
//! Two manual-tag policies exist and a store uses exactly one, selected by
//! its `meta.version`:
//!
//! - version 1: the manual record replaces the automatic one when non-empty
//! - version 2: the manual record is an add/remove delta over the automatic one
//!
//! Version 1 is read for import only; stores are always written as version 2.

use crate::domain::card::is_alt_art;
use crate::domain::effects::{Effects, EffectsDelta};
use crate::domain::extract::Extraction;
use crate::error::{Result, SynergyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const LEGACY_SCHEMA: u64 = 1;
pub const CURRENT_SCHEMA: u64 = 2;

/// Manual tags under one of the two schema policies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualTags {
    /// Legacy whole-record replacement
    Override(Effects),
    /// Per-category amendment of the automatic tags
    Delta(EffectsDelta),
}

impl Default for ManualTags {
    fn default() -> Self {
        ManualTags::Delta(EffectsDelta::default())
    }
}

/// One card's entry in the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagEntry {
    pub auto: Effects,
    pub manual: ManualTags,
    pub blocks: Vec<Effects>,
    pub reviewed: bool,
    pub notes: Option<String>,
    pub last_edited_at: Option<DateTime<Utc>>,
}

impl TagEntry {
    pub fn from_extraction(extraction: Extraction) -> Self {
        TagEntry {
            auto: extraction.auto,
            blocks: extraction.blocks,
            ..Default::default()
        }
    }

    /// Automatic tags with the manual policy applied
    pub fn effective(&self) -> Effects {
        match &self.manual {
            ManualTags::Override(manual) if !manual.is_empty() => manual.clone(),
            ManualTags::Override(_) => self.auto.clone(),
            ManualTags::Delta(delta) => delta.apply(&self.auto),
        }
    }

    /// The hand-written side: the override record, or what the delta adds
    pub fn manual_effects(&self) -> Effects {
        match &self.manual {
            ManualTags::Override(manual) => manual.clone(),
            ManualTags::Delta(delta) => delta.add.clone(),
        }
    }

    pub fn effects(&self, source: EffectSource) -> Effects {
        match source {
            EffectSource::Effective => self.effective(),
            EffectSource::Auto => self.auto.clone(),
            EffectSource::Manual => self.manual_effects(),
        }
    }

    /// Edit the manual delta; a legacy override is converted first
    pub fn update_delta(&mut self, edit: impl FnOnce(&mut EffectsDelta)) {
        let mut delta = match std::mem::take(&mut self.manual) {
            ManualTags::Override(manual) => override_to_delta(&self.auto, &manual),
            ManualTags::Delta(delta) => delta,
        };
        edit(&mut delta);
        self.manual = ManualTags::Delta(delta);
    }

    /// Replace the automatic tags, keeping every curated field
    pub fn refresh(&mut self, extraction: Extraction) {
        self.auto = extraction.auto;
        self.blocks = extraction.blocks;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_edited_at = Some(now);
    }

    fn into_current(self) -> Self {
        let manual = match self.manual {
            ManualTags::Override(manual) => {
                ManualTags::Delta(override_to_delta(&self.auto, &manual))
            }
            delta => delta,
        };
        TagEntry { manual, ..self }
    }
}

/// An override `M` over `A` becomes `add = M − A`, `remove = A − M`; an empty
/// override means "no change"
fn override_to_delta(auto: &Effects, manual: &Effects) -> EffectsDelta {
    if manual.is_empty() {
        return EffectsDelta::default();
    }
    EffectsDelta {
        add: manual.difference(auto),
        remove: auto.difference(manual),
    }
}

/// Which record of an entry feeds the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectSource {
    #[default]
    Effective,
    Auto,
    Manual,
}

impl FromStr for EffectSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "effective" => Ok(EffectSource::Effective),
            "auto" => Ok(EffectSource::Auto),
            "manual" => Ok(EffectSource::Manual),
            _ => Err(format!(
                "Invalid source: {} (expected effective, auto or manual)",
                s
            )),
        }
    }
}

impl fmt::Display for EffectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectSource::Effective => "effective",
            EffectSource::Auto => "auto",
            EffectSource::Manual => "manual",
        };
        write!(f, "{}", name)
    }
}

/// One entry of a manual overrides file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOverride {
    pub card_id: String,
    #[serde(default)]
    pub add: Effects,
    #[serde(default)]
    pub remove: Effects,
}

/// The tag store
#[derive(Debug, Clone, PartialEq)]
pub struct TagStore {
    /// Schema version the store was read with
    pub version: u64,
    pub generated_at: Option<DateTime<Utc>>,
    pub cards: BTreeMap<String, TagEntry>,
}

impl Default for TagStore {
    fn default() -> Self {
        TagStore {
            version: CURRENT_SCHEMA,
            generated_at: None,
            cards: BTreeMap::new(),
        }
    }
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, card_id: &str) -> Option<&TagEntry> {
        self.cards.get(card_id)
    }

    pub fn get_mut(&mut self, card_id: &str) -> Option<&mut TagEntry> {
        self.cards.get_mut(card_id)
    }

    /// Entries that take part in the index and the graph
    pub fn regular_entries(&self) -> impl Iterator<Item = (&str, &TagEntry)> {
        self.cards
            .iter()
            .filter(|(id, _)| !is_alt_art(id))
            .map(|(id, entry)| (id.as_str(), entry))
    }

    /// Effective effects of every regular card
    pub fn effective_by_card(&self) -> BTreeMap<String, Effects> {
        self.regular_entries()
            .map(|(id, entry)| (id.to_string(), entry.effective()))
            .collect()
    }

    /// Store a fresh extraction, keeping curated fields of an existing entry
    pub fn upsert_extraction(&mut self, card_id: &str, extraction: Extraction) {
        match self.cards.get_mut(card_id) {
            Some(entry) => entry.refresh(extraction),
            None => {
                self.cards
                    .insert(card_id.to_string(), TagEntry::from_extraction(extraction));
            }
        }
    }

    /// Replace a card's manual delta; false when the card is not in the store
    pub fn apply_override(&mut self, manual: &ManualOverride) -> bool {
        if is_alt_art(&manual.card_id) {
            return false;
        }
        match self.cards.get_mut(&manual.card_id) {
            Some(entry) => {
                entry.manual = ManualTags::Delta(EffectsDelta {
                    add: manual.add.clone(),
                    remove: manual.remove.clone(),
                });
                true
            }
            None => false,
        }
    }

    /// Convert every entry to the delta policy without changing its effective
    /// effects
    pub fn into_current(self) -> Self {
        TagStore {
            version: CURRENT_SCHEMA,
            generated_at: self.generated_at,
            cards: self
                .cards
                .into_iter()
                .map(|(id, entry)| (id, entry.into_current()))
                .collect(),
        }
    }

    /// Read a store document, dispatching on `meta.version`
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let version = value
            .get("meta")
            .and_then(|meta| meta.get("version"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);

        match version {
            LEGACY_SCHEMA => {
                let doc: Document<LegacyEntry> = serde_json::from_value(value)?;
                Ok(doc.into_store(|e| e.into_entry()))
            }
            CURRENT_SCHEMA => {
                let doc: Document<CurrentEntry> = serde_json::from_value(value)?;
                Ok(doc.into_store(|e| e.into_entry()))
            }
            other => Err(SynergyError::UnsupportedSchema(other)),
        }
    }

    /// Serialize as a current-schema document
    pub fn to_value(&self) -> Result<serde_json::Value> {
        let current = self.clone().into_current();
        let doc = Document {
            meta: StoreMeta {
                version: CURRENT_SCHEMA,
                generated_at: current.generated_at,
            },
            cards: current
                .cards
                .into_iter()
                .map(|(id, entry)| (id, CurrentEntry::from(entry)))
                .collect(),
        };
        Ok(serde_json::to_value(doc)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreMeta {
    version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Document<E> {
    meta: StoreMeta,
    #[serde(default = "BTreeMap::new")]
    cards: BTreeMap<String, E>,
}

impl<E> Document<E> {
    fn into_store(self, convert: impl Fn(E) -> TagEntry) -> TagStore {
        TagStore {
            version: self.meta.version,
            generated_at: self.meta.generated_at,
            cards: self
                .cards
                .into_iter()
                .map(|(id, entry)| (id, convert(entry)))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    #[serde(default)]
    auto: Effects,
    #[serde(default)]
    manual: Effects,
    #[serde(default)]
    blocks: Vec<Effects>,
    #[serde(default)]
    reviewed: bool,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    last_edited_at: Option<DateTime<Utc>>,
}

impl LegacyEntry {
    fn into_entry(self) -> TagEntry {
        TagEntry {
            auto: self.auto,
            manual: ManualTags::Override(self.manual),
            blocks: self.blocks,
            reviewed: self.reviewed,
            notes: self.notes,
            last_edited_at: self.last_edited_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentEntry {
    #[serde(default)]
    auto: Effects,
    #[serde(default)]
    add: Effects,
    #[serde(default)]
    remove: Effects,
    #[serde(default)]
    blocks: Vec<Effects>,
    #[serde(default)]
    reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_edited_at: Option<DateTime<Utc>>,
}

impl CurrentEntry {
    fn into_entry(self) -> TagEntry {
        TagEntry {
            auto: self.auto,
            manual: ManualTags::Delta(EffectsDelta {
                add: self.add,
                remove: self.remove,
            }),
            blocks: self.blocks,
            reviewed: self.reviewed,
            notes: self.notes,
            last_edited_at: self.last_edited_at,
        }
    }
}

impl From<TagEntry> for CurrentEntry {
    fn from(entry: TagEntry) -> Self {
        let delta = match entry.manual {
            ManualTags::Delta(delta) => delta,
            ManualTags::Override(manual) => override_to_delta(&entry.auto, &manual),
        };
        CurrentEntry {
            auto: entry.auto,
            add: delta.add,
            remove: delta.remove,
            blocks: entry.blocks,
            reviewed: entry.reviewed,
            notes: entry.notes,
            last_edited_at: entry.last_edited_at,
        }
    }
}
