//! synergy - Card synergy pipeline
//!
//! Reads a trading-card database, extracts effect tokens from card text,
//! merges them with manual corrections into a tag store, indexes the tokens
//! and builds a scored directed graph of card-to-card synergies.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::SynergyError;
