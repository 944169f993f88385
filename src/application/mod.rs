//! Application layer - Use cases and orchestration

pub mod build_edges;
pub mod build_index;
pub mod check_expr;
pub mod edit_tags;
pub mod extract_text;
pub mod generate_tags;
pub mod manage_config;

pub use build_edges::{BuildEdgesService, EdgeOptions};
pub use build_index::BuildIndexService;
pub use check_expr::{check_expressions, ExprCheck};
pub use edit_tags::{EditTagsService, TagChange, TagEdit};
pub use extract_text::extract_text;
pub use generate_tags::{GenerateOptions, GenerateReport, GenerateTagsService};
pub use manage_config::ConfigService;
