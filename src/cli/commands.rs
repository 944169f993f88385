//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "synergy")]
#[command(about = "Card synergy pipeline: tags, index and synergy graph", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract effect tags for every card into a tag store
    Tags {
        /// Card database (JSON)
        cards: PathBuf,

        /// Tag store to write
        output: PathBuf,

        /// Manual overrides file (JSON array of {cardId, add, remove})
        #[arg(long, value_name = "FILE")]
        overrides: Option<PathBuf>,

        /// Existing tag store whose manual tags are kept
        #[arg(long, value_name = "FILE")]
        existing: Option<PathBuf>,
    },

    /// Build the postings index of a tag store
    Index {
        /// Tag store (JSON)
        tags: PathBuf,

        /// Index file to write
        output: PathBuf,

        /// Which tags to index (effective, auto, manual)
        #[arg(long, default_value = "effective")]
        source: String,
    },

    /// Build the synergy graph
    Edges {
        /// Tag store (JSON)
        tags: PathBuf,

        /// Card database (JSON)
        cards: PathBuf,

        /// Graph file to write
        output: PathBuf,

        /// Comma-separated leader traits (e.g., "Straw Hat Crew,Supernovas")
        leader_traits: Option<String>,
    },

    /// Show what the extractor finds in a piece of card text
    Extract {
        /// Card text
        text: String,

        /// Trigger text
        #[arg(long)]
        trigger: Option<String>,

        /// Card type (leader, character, event, stage)
        #[arg(long, default_value = "character")]
        card_type: String,
    },

    /// Validate manual tag expressions
    Check {
        /// Expressions to check
        #[arg(required = true)]
        exprs: Vec<String>,
    },

    /// Edit a card's manual tags in a tag store
    Tag {
        /// Tag store (JSON), updated in place
        store: PathBuf,

        /// Card id (e.g., OP01-016)
        card_id: String,

        /// Tag to add, as CATEGORY=EXPR (e.g., requires=NeedsDON:2)
        #[arg(long, value_name = "CAT=EXPR")]
        add: Vec<String>,

        /// Tag to remove, as CATEGORY=TOKEN
        #[arg(long, value_name = "CAT=TOKEN")]
        remove: Vec<String>,

        /// Mark the card as reviewed
        #[arg(long)]
        reviewed: bool,

        /// Attach a note to the card
        #[arg(long, value_name = "TEXT")]
        note: Option<String>,
    },

    /// List the tag expression kinds
    Kinds,

    /// Print the effective configuration
    Config,
}
