//! Domain layer - Cards, effect tokens, extraction, tagging and the graph

pub mod card;
pub mod effects;
pub mod extract;
pub mod graph;
pub mod index;
pub mod tags;
pub mod token;

pub use card::{Card, CardDatabase, CardType};
pub use effects::{EffectCategory, Effects, EffectsDelta};
pub use graph::{Edge, Graph, GraphConfig};
pub use index::PostingsIndex;
