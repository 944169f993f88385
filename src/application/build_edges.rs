//! Graph building use case

use crate::domain::graph::{build_graph, GraphArtifact, GraphConfig, LeaderTraitFilter};
use crate::error::Result;
use crate::infrastructure::{ArtifactRepository, FileSystemRepository};
use std::path::PathBuf;

/// Options for graph building
#[derive(Debug, Clone)]
pub struct EdgeOptions {
    pub tags: PathBuf,
    pub cards: PathBuf,
    pub output: PathBuf,

    /// Comma-separated leader traits; empty or absent disables the filter
    pub leader_traits: Option<String>,

    pub graph: GraphConfig,
}

/// Service for building the synergy graph
pub struct BuildEdgesService {
    repository: FileSystemRepository,
}

impl BuildEdgesService {
    pub fn new(repository: FileSystemRepository) -> Self {
        BuildEdgesService { repository }
    }

    pub fn execute(&self, options: &EdgeOptions) -> Result<GraphArtifact> {
        let store = self.repository.load_tag_store(&options.tags)?;
        let cards = self.repository.load_cards(&options.cards)?;

        let leader = options
            .leader_traits
            .as_deref()
            .map(LeaderTraitFilter::from_csv)
            .filter(|filter| !filter.is_empty());
        if let Some(filter) = &leader {
            log::info!("Filtering for leader traits: {}", filter.traits().join(", "));
        }

        let graph = build_graph(
            &store.effective_by_card(),
            &cards,
            &options.graph,
            leader.as_ref(),
        );
        let artifact = GraphArtifact::new(graph, &options.graph, leader.as_ref());
        self.repository.save_artifact(&options.output, &artifact)?;
        Ok(artifact)
    }
}
