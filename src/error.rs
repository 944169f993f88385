//! Error types for synergy

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the synergy pipeline
#[derive(Debug, Error)]
pub enum SynergyError {
    #[error("Cannot read {path}: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    ParseArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write {path}: {source}")]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported tag store schema version: {0}")]
    UnsupportedSchema(u64),

    #[error("Invalid tag expression '{input}': {}", .errors.join("; "))]
    InvalidExpression { input: String, errors: Vec<String> },

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot parse configuration: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SynergyError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SynergyError::ReadArtifact { .. } | SynergyError::ParseArtifact { .. } => 2,
            SynergyError::UnsupportedSchema(_) => 2,
            SynergyError::InvalidExpression { .. } => 3,
            SynergyError::CardNotFound(_) => 4,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            SynergyError::ReadArtifact { path, .. } => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Check that {} exists and is readable\n\
                    • Generate the tag store first: synergy tags <cards.json> <tags.json>",
                    self,
                    path.display()
                )
            }
            SynergyError::ParseArtifact { .. } => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Make sure the file is the artifact this command expects\n\
                    • Regenerate it with the matching synergy command",
                    self
                )
            }
            SynergyError::UnsupportedSchema(version) => {
                format!(
                    "Unsupported tag store schema version: {}\n\n\
                    Supported versions:\n\
                    • 1 (legacy whole-record manual tags, import only)\n\
                    • 2 (per-category add/remove deltas)",
                    version
                )
            }
            SynergyError::InvalidExpression { input, errors } => {
                let mut msg = format!("Invalid tag expression: '{}'\n", input);
                for error in errors {
                    msg.push_str(&format!("  • {}\n", error));
                }
                msg.push_str(
                    "\nExamples:\n\
                    KO:Cost<=5\n\
                    NeedsDON:2\n\
                    CostMod:-1[where=Category:{Navy}]\n\n\
                    Run 'synergy kinds' for the full list",
                );
                msg
            }
            SynergyError::TomlDeserialize(_) => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Run 'synergy config' to print a valid configuration\n\
                    • Sections are [graph], [graph.ladders] and [extract]",
                    self
                )
            }
            SynergyError::CardNotFound(id) => {
                format!(
                    "Card not found: '{}'\n\n\
                    Suggestions:\n\
                    • Check the card id spelling (e.g., OP01-001)\n\
                    • Alternate-art ids (containing '_') are never tagged",
                    id
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using SynergyError
pub type Result<T> = std::result::Result<T, SynergyError>;
