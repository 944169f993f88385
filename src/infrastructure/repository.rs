//! File system artifact repository
//!
//! Every pipeline stage reads and writes JSON files; this module owns the
//! paths, the error mapping and the on-disk formatting.

use crate::domain::card::CardDatabase;
use crate::domain::tags::{ManualOverride, TagStore};
use crate::error::{Result, SynergyError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Abstract repository for pipeline artifacts
pub trait ArtifactRepository {
    /// Load the card database, filling in ids from the map keys
    fn load_cards(&self, path: &Path) -> Result<CardDatabase>;

    /// Load a tag store of any supported schema
    fn load_tag_store(&self, path: &Path) -> Result<TagStore>;

    /// Save a tag store in the current schema
    fn save_tag_store(&self, path: &Path, store: &TagStore) -> Result<()>;

    /// Load a manual overrides file
    fn load_overrides(&self, path: &Path) -> Result<Vec<ManualOverride>>;

    /// Save any serializable artifact as pretty JSON
    fn save_artifact<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<()>;
}

/// File system implementation of ArtifactRepository
#[derive(Debug, Clone, Default)]
pub struct FileSystemRepository;

impl FileSystemRepository {
    pub fn new() -> Self {
        FileSystemRepository
    }

    fn read_text(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| SynergyError::ReadArtifact {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let contents = Self::read_text(path)?;
        serde_json::from_str(&contents).map_err(|source| SynergyError::ParseArtifact {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_text(path: &Path, contents: &str) -> Result<()> {
        let write_error = |source| SynergyError::WriteArtifact {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }
        fs::write(path, contents).map_err(write_error)
    }
}

impl ArtifactRepository for FileSystemRepository {
    fn load_cards(&self, path: &Path) -> Result<CardDatabase> {
        let mut cards: CardDatabase = Self::read_json(path)?;
        cards.normalize_ids();
        log::debug!("Loaded {} cards from {}", cards.len(), path.display());
        Ok(cards)
    }

    fn load_tag_store(&self, path: &Path) -> Result<TagStore> {
        let value: serde_json::Value = Self::read_json(path)?;
        let store = TagStore::from_value(value)?;
        log::debug!(
            "Loaded tag store v{} with {} entries from {}",
            store.version,
            store.len(),
            path.display()
        );
        Ok(store)
    }

    fn save_tag_store(&self, path: &Path, store: &TagStore) -> Result<()> {
        let value = store.to_value()?;
        self.save_artifact(path, &value)
    }

    fn load_overrides(&self, path: &Path) -> Result<Vec<ManualOverride>> {
        Self::read_json(path)
    }

    fn save_artifact<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(artifact)?;
        contents.push('\n');
        Self::write_text(path, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tags::CURRENT_SCHEMA;
    use tempfile::TempDir;

    #[test]
    fn test_load_cards_normalizes_ids() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cards.json");
        fs::write(
            &path,
            r#"{"OP01-001": {"name": "Zoro", "cardType": "LEADER", "color": ["Red"]}}"#,
        )
        .unwrap();

        let cards = FileSystemRepository::new().load_cards(&path).unwrap();
        assert_eq!(cards.get("OP01-001").unwrap().id, "OP01-001");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = FileSystemRepository::new().load_cards(&temp.path().join("nope.json"));
        match result.unwrap_err() {
            SynergyError::ReadArtifact { path, .. } => assert!(path.ends_with("nope.json")),
            other => panic!("Expected ReadArtifact error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cards.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileSystemRepository::new().load_cards(&path).unwrap_err();
        assert!(matches!(err, SynergyError::ParseArtifact { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("nested").join("tags.json");
        let repo = FileSystemRepository::new();

        repo.save_tag_store(&path, &TagStore::new()).unwrap();
        let loaded = repo.load_tag_store(&path).unwrap();
        assert_eq!(loaded.version, CURRENT_SCHEMA);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("overrides.json");
        fs::write(
            &path,
            r#"[{"cardId": "OP01-016", "add": {"outbound": ["KO:Cost<=4"]}}]"#,
        )
        .unwrap();

        let overrides = FileSystemRepository::new().load_overrides(&path).unwrap();
        assert_eq!(overrides.len(), 1);
        assert!(overrides[0].add.produces.contains("KO:Cost<=4"));
        assert!(overrides[0].remove.is_empty());
    }
}
