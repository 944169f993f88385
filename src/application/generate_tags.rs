//! Tag generation use case
//!
//! Extracts every regular card of the database into the tag store, keeping the
//! curated fields of an existing store, then applies a manual overrides file.

use crate::domain::card::CardDatabase;
use crate::domain::extract::{extract_card, ExtractOptions};
use crate::domain::tags::{ManualOverride, TagStore};
use crate::error::Result;
use crate::infrastructure::{ArtifactRepository, FileSystemRepository};
use chrono::Utc;
use std::path::PathBuf;

/// Options for tag generation
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Card database to read
    pub cards: PathBuf,

    /// Where the tag store is written
    pub output: PathBuf,

    /// Manual overrides file
    pub overrides: Option<PathBuf>,

    /// Existing store whose curated fields are carried over
    pub existing: Option<PathBuf>,

    pub extract: ExtractOptions,
}

/// What a generation run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub tagged: usize,
    pub skipped_alt_art: usize,
    pub overrides_applied: usize,
    pub overrides_skipped: Vec<String>,
}

/// Extract every regular card into `store`
pub fn tag_cards(store: &mut TagStore, cards: &CardDatabase, options: &ExtractOptions) -> usize {
    let mut tagged = 0;
    for (card_id, card) in cards.regular_cards() {
        store.upsert_extraction(card_id, extract_card(card, options));
        tagged += 1;
    }
    tagged
}

/// Apply overrides; returns the ids that were skipped
pub fn apply_overrides(store: &mut TagStore, overrides: &[ManualOverride]) -> Vec<String> {
    let mut skipped = Vec::new();
    for manual in overrides {
        if !store.apply_override(manual) {
            log::warn!(
                "Skipping override for {}: not a tagged card",
                manual.card_id
            );
            skipped.push(manual.card_id.clone());
        }
    }
    skipped
}

/// Service for generating the tag store
pub struct GenerateTagsService {
    repository: FileSystemRepository,
}

impl GenerateTagsService {
    /// Create new generate tags service
    pub fn new(repository: FileSystemRepository) -> Self {
        GenerateTagsService { repository }
    }

    /// Execute the generation
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read or parsed, or the store
    /// cannot be written. Overrides for unknown cards are not errors.
    pub fn execute(&self, options: &GenerateOptions) -> Result<GenerateReport> {
        let cards = self.repository.load_cards(&options.cards)?;

        let mut store = match &options.existing {
            Some(path) => self.repository.load_tag_store(path)?.into_current(),
            None => TagStore::new(),
        };

        let tagged = tag_cards(&mut store, &cards, &options.extract);
        log::info!("Tagged {} cards", tagged);

        let overrides = match &options.overrides {
            Some(path) => self.repository.load_overrides(path)?,
            None => Vec::new(),
        };
        let overrides_skipped = apply_overrides(&mut store, &overrides);
        let overrides_applied = overrides.len() - overrides_skipped.len();
        if !overrides.is_empty() {
            log::info!("Applied {} manual overrides", overrides_applied);
        }

        store.generated_at = Some(Utc::now());
        self.repository.save_tag_store(&options.output, &store)?;

        Ok(GenerateReport {
            tagged,
            skipped_alt_art: cards.len() - tagged,
            overrides_applied,
            overrides_skipped,
        })
    }
}
