//! Tag system: manual tag grammar and the tag store

pub mod expr;
pub mod store;

// Re-export main types
pub use expr::{TagExpr, TagKind, ValidationErrors, TAG_KINDS};
pub use store::{
    EffectSource, ManualOverride, ManualTags, TagEntry, TagStore, CURRENT_SCHEMA, LEGACY_SCHEMA,
};
