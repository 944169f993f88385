//! Index building use case

use crate::domain::index::{IndexArtifact, IndexMeta, PostingsIndex};
use crate::domain::tags::EffectSource;
use crate::error::Result;
use crate::infrastructure::{ArtifactRepository, FileSystemRepository};
use chrono::Utc;
use std::path::Path;

/// Service for building the postings index of a tag store
pub struct BuildIndexService {
    repository: FileSystemRepository,
}

impl BuildIndexService {
    pub fn new(repository: FileSystemRepository) -> Self {
        BuildIndexService { repository }
    }

    /// Read the store at `tags`, write the index to `output`
    pub fn execute(&self, tags: &Path, output: &Path, source: EffectSource) -> Result<IndexArtifact> {
        let store = self.repository.load_tag_store(tags)?;
        let index = PostingsIndex::from_store(&store, source);
        let cards = store.regular_entries().count();

        log::info!(
            "Indexed {} cards: {} produces keys, {} requires keys",
            cards,
            index.by_produces.len(),
            index.by_requires.len()
        );

        let artifact = IndexArtifact {
            index,
            meta: IndexMeta {
                source: source.to_string(),
                generated_at: Utc::now(),
                cards,
            },
        };
        self.repository.save_artifact(output, &artifact)?;
        Ok(artifact)
    }
}
