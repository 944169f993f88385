//! CLI layer - Command-line interface

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands};
pub use output::{
    format_checks, format_extraction, format_generate_report, format_graph_summary,
    format_index_summary, format_kinds,
};
