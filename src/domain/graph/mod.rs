//! Synergy graph construction
//!
//! Ladders scan the postings index for producer and consumer token families
//! and emit scored candidate edges. Candidates then pass the leader-trait
//! filter and the leader/colour filter, are deduplicated per ordered pair
//! (highest score wins) and sorted.
//!
//! ```
//! use synergy::domain::effects::{EffectCategory, Effects};
//! use synergy::domain::graph::{build_graph, GraphConfig};
//! use synergy::domain::card::CardDatabase;
//! use std::collections::BTreeMap;
//!
//! let mut a = Effects::new();
//! a.insert(EffectCategory::Produces, "ReduceCost:5:ThisTurn");
//! let mut b = Effects::new();
//! b.insert(EffectCategory::Produces, "KO:Cost<=5");
//! let effects = BTreeMap::from([("A".to_string(), a), ("B".to_string(), b)]);
//!
//! let graph = build_graph(&effects, &CardDatabase::new(), &GraphConfig::default(), None);
//! assert_eq!(graph.edges[0].score, 1.0);
//! assert_eq!(graph.edges[0].reason, "Cost ladder (window)");
//! ```

pub mod filters;
pub mod ladders;

pub use filters::{colour_compatible, LeaderTraitFilter};
pub use ladders::{LadderContext, LadderKind};

use crate::domain::card::{is_alt_art, CardDatabase};
use crate::domain::effects::Effects;
use crate::domain::index::PostingsIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Which ladders run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderToggles {
    pub resource: bool,
    pub cost: bool,
    pub power: bool,
    pub sequencing: bool,
    pub recycling: bool,
    pub category: bool,
    pub trigger: bool,
    pub ally: bool,
}

impl Default for LadderToggles {
    fn default() -> Self {
        LadderToggles {
            resource: true,
            cost: true,
            power: true,
            sequencing: true,
            recycling: true,
            category: true,
            trigger: true,
            ally: true,
        }
    }
}

impl LadderToggles {
    pub fn is_enabled(&self, kind: LadderKind) -> bool {
        match kind {
            LadderKind::Resource => self.resource,
            LadderKind::Cost => self.cost,
            LadderKind::Power => self.power,
            LadderKind::Sequencing => self.sequencing,
            LadderKind::Recycling => self.recycling,
            LadderKind::Category => self.category,
            LadderKind::Trigger => self.trigger,
            LadderKind::Ally => self.ally,
        }
    }
}

/// Scoring constants and ladder switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Window score when the window's threshold is zero
    pub window_fallback: f64,
    pub enable_score: f64,
    /// Enable score for a reducer of zero
    pub enable_score_weak: f64,
    pub sequencing_score: f64,
    pub recycling_score: f64,
    /// Fan-out score is `|N| / fanout_divisor`, capped at 1
    pub fanout_divisor: f64,
    pub trigger_hand_score: f64,
    pub trigger_discard_score: f64,
    pub trigger_played_score: f64,
    pub ally_direct_score: f64,
    pub ally_indirect_score: f64,
    pub ladders: LadderToggles,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            window_fallback: 0.5,
            enable_score: 0.6,
            enable_score_weak: 0.4,
            sequencing_score: 1.0,
            recycling_score: 0.8,
            fanout_divisor: 5.0,
            trigger_hand_score: 0.8,
            trigger_discard_score: 0.8,
            trigger_played_score: 0.9,
            ally_direct_score: 1.0,
            ally_indirect_score: 0.6,
            ladders: LadderToggles::default(),
        }
    }
}

impl GraphConfig {
    /// Constant scores with their names, for validation
    pub fn scores(&self) -> [(&'static str, f64); 10] {
        [
            ("window_fallback", self.window_fallback),
            ("enable_score", self.enable_score),
            ("enable_score_weak", self.enable_score_weak),
            ("sequencing_score", self.sequencing_score),
            ("recycling_score", self.recycling_score),
            ("trigger_hand_score", self.trigger_hand_score),
            ("trigger_discard_score", self.trigger_discard_score),
            ("trigger_played_score", self.trigger_played_score),
            ("ally_direct_score", self.ally_direct_score),
            ("ally_indirect_score", self.ally_indirect_score),
        ]
    }

    pub fn enabled_ladders(&self) -> Vec<LadderKind> {
        LadderKind::ALL
            .into_iter()
            .filter(|kind| self.ladders.is_enabled(*kind))
            .collect()
    }

    /// Human-readable summary stored in the graph metadata
    pub fn scoring_summary(&self) -> String {
        let names: Vec<&str> = self.enabled_ladders().iter().map(|k| k.name()).collect();
        format!("Rules: {}", names.join("; "))
    }
}

/// A directed, scored synergy edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub reason: String,
    pub score: f64,
}

impl Edge {
    pub fn new(from: &str, to: &str, reason: &str, score: f64) -> Self {
        Edge {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
            score: score.clamp(0.0, 1.0),
        }
    }
}

/// Built graph: sorted edges plus every card that took part
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub edges: Vec<Edge>,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMeta {
    pub generated_at: DateTime<Utc>,
    pub scoring: String,
    pub leader_traits: Vec<String>,
}

/// The graph as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphArtifact {
    pub meta: GraphMeta,
    pub edges: Vec<Edge>,
    pub nodes: Vec<String>,
}

impl GraphArtifact {
    pub fn new(graph: Graph, config: &GraphConfig, leader: Option<&LeaderTraitFilter>) -> Self {
        GraphArtifact {
            meta: GraphMeta {
                generated_at: Utc::now(),
                scoring: config.scoring_summary(),
                leader_traits: leader.map(|l| l.traits().to_vec()).unwrap_or_default(),
            },
            edges: graph.edges,
            nodes: graph.nodes,
        }
    }
}

/// Keep the highest score per ordered pair; the first candidate wins ties
pub fn dedup_edges(candidates: Vec<Edge>) -> Vec<Edge> {
    let mut best: BTreeMap<(String, String), Edge> = BTreeMap::new();
    for edge in candidates {
        match best.entry((edge.from.clone(), edge.to.clone())) {
            Entry::Vacant(slot) => {
                slot.insert(edge);
            }
            Entry::Occupied(mut slot) => {
                if edge.score > slot.get().score {
                    slot.insert(edge);
                }
            }
        }
    }
    best.into_values().collect()
}

/// Score descending, then `from`, then `to`
pub fn sort_edges(edges: &mut [Edge]) {
    edges.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
    });
}

/// Build the synergy graph from effective effects by card
pub fn build_graph(
    effects: &BTreeMap<String, Effects>,
    cards: &CardDatabase,
    config: &GraphConfig,
    leader: Option<&LeaderTraitFilter>,
) -> Graph {
    let regular: BTreeMap<&str, &Effects> = effects
        .iter()
        .filter(|(id, _)| !is_alt_art(id))
        .map(|(id, e)| (id.as_str(), e))
        .collect();
    let index = PostingsIndex::from_effects(regular.iter().map(|(id, e)| (*id, *e)));
    let ctx = LadderContext {
        index: &index,
        cards,
        config,
    };

    let mut candidates = Vec::new();
    for kind in config.enabled_ladders() {
        let before = candidates.len();
        kind.run(&ctx, &mut candidates);
        log::info!(
            "{}: {} candidate edges",
            kind.name(),
            candidates.len() - before
        );
    }

    let total = candidates.len();
    let candidates: Vec<Edge> = candidates
        .into_iter()
        .filter(|edge| !is_alt_art(&edge.from) && !is_alt_art(&edge.to))
        .filter(|edge| match (leader, regular.get(edge.to.as_str())) {
            (Some(filter), Some(consumer)) => filter.allows(consumer),
            _ => true,
        })
        .filter(|edge| colour_compatible(cards.get(&edge.from), cards.get(&edge.to)))
        .collect();
    log::debug!("{} of {} candidates passed the filters", candidates.len(), total);

    let mut edges = dedup_edges(candidates);
    sort_edges(&mut edges);
    log::info!("{} edges over {} nodes", edges.len(), regular.len());

    Graph {
        edges,
        nodes: regular.keys().map(|id| id.to_string()).collect(),
    }
}
