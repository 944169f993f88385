//! Manual tag editing use case
//!
//! An edit adds and removes tokens on one card's manual delta. Every added
//! produces/requires token must be a valid tag expression and is stored in
//! canonical form; added mechanics must be bare identifiers. Removals accept
//! any token so that stray automatic tags can be suppressed. An edit with any
//! invalid part changes nothing.

use crate::domain::card::is_alt_art;
use crate::domain::effects::{EffectCategory, EffectsDelta};
use crate::domain::tags::{TagExpr, TagStore};
use crate::error::{Result, SynergyError};
use crate::infrastructure::{ArtifactRepository, FileSystemRepository};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn mechanic_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap())
}

/// One requested change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChange {
    pub category: EffectCategory,
    pub token: String,
}

impl TagChange {
    pub fn new(category: EffectCategory, token: &str) -> Self {
        TagChange {
            category,
            token: token.to_string(),
        }
    }

    /// Parse `category=token` as given on the command line
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        let (category, token) = raw
            .split_once('=')
            .ok_or_else(|| format!("Expected CATEGORY=TOKEN, got '{}'", raw))?;
        Ok(TagChange {
            category: category.parse()?,
            token: token.trim().to_string(),
        })
    }
}

/// A full edit of one card
#[derive(Debug, Clone, Default)]
pub struct TagEdit {
    pub add: Vec<TagChange>,
    pub remove: Vec<TagChange>,
    pub reviewed: Option<bool>,
    pub note: Option<String>,
}

/// Validate an added token, returning its canonical form
fn canonical_addition(change: &TagChange) -> std::result::Result<String, Vec<String>> {
    if change.category == EffectCategory::Mechanics {
        return if mechanic_regex().is_match(&change.token) {
            Ok(change.token.clone())
        } else {
            Err(vec![format!(
                "Mechanic '{}' must be a bare identifier",
                change.token
            )])
        };
    }

    let expr = TagExpr::parse(&change.token).map_err(|e| e.into_messages())?;
    if expr.side() != change.category {
        return Err(vec![format!(
            "'{}' is a {} tag, not {}",
            expr,
            expr.side(),
            change.category
        )]);
    }
    Ok(expr.to_string())
}

/// Apply an edit to a store; nothing changes unless every part is valid
pub fn apply_edit(
    store: &mut TagStore,
    card_id: &str,
    edit: &TagEdit,
    now: DateTime<Utc>,
) -> Result<()> {
    if is_alt_art(card_id) || store.get(card_id).is_none() {
        return Err(SynergyError::CardNotFound(card_id.to_string()));
    }

    let mut errors = Vec::new();
    let mut delta = EffectsDelta::default();

    for change in &edit.add {
        match canonical_addition(change) {
            Ok(token) => {
                delta.add.insert(change.category, token);
            }
            Err(messages) => errors.extend(messages),
        }
    }
    for change in &edit.remove {
        if change.token.is_empty() {
            errors.push(format!("Empty {} token to remove", change.category));
        } else {
            delta.remove.insert(change.category, change.token.clone());
        }
    }

    if !errors.is_empty() {
        let input = edit
            .add
            .iter()
            .chain(&edit.remove)
            .map(|c| format!("{}={}", c.category, c.token))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(SynergyError::InvalidExpression { input, errors });
    }

    let Some(entry) = store.get_mut(card_id) else {
        return Err(SynergyError::CardNotFound(card_id.to_string()));
    };
    entry.update_delta(|current| {
        for category in EffectCategory::ALL {
            for token in delta.add.get(category) {
                current.remove.get_mut(category).remove(token);
                current.add.insert(category, token.clone());
            }
            for token in delta.remove.get(category) {
                current.add.get_mut(category).remove(token);
                current.remove.insert(category, token.clone());
            }
        }
    });
    if let Some(reviewed) = edit.reviewed {
        entry.reviewed = reviewed;
    }
    if let Some(note) = &edit.note {
        entry.notes = Some(note.clone()).filter(|n| !n.trim().is_empty());
    }
    entry.touch(now);
    Ok(())
}

/// Service for editing a stored card's manual tags
pub struct EditTagsService {
    repository: FileSystemRepository,
}

impl EditTagsService {
    pub fn new(repository: FileSystemRepository) -> Self {
        EditTagsService { repository }
    }

    /// Load the store, apply the edit, save it back
    pub fn execute(&self, path: &Path, card_id: &str, edit: &TagEdit) -> Result<()> {
        let mut store = self.repository.load_tag_store(path)?.into_current();
        apply_edit(&mut store, card_id, edit, Utc::now())?;
        self.repository.save_tag_store(path, &store)?;
        log::info!("Updated manual tags of {}", card_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::effects::Effects;
    use crate::domain::extract::Extraction;

    fn store() -> TagStore {
        let mut auto = Effects::new();
        auto.insert(EffectCategory::Produces, "KO:Cost<=3");
        let mut store = TagStore::new();
        store.upsert_extraction(
            "OP01-016",
            Extraction {
                blocks: Vec::new(),
                auto,
            },
        );
        store
    }

    fn edit(add: &[&str], remove: &[&str]) -> TagEdit {
        TagEdit {
            add: add.iter().map(|raw| TagChange::parse(raw).unwrap()).collect(),
            remove: remove.iter().map(|raw| TagChange::parse(raw).unwrap()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_change_parse() {
        let change = TagChange::parse("requires=NeedsDON:2").unwrap();
        assert_eq!(change, TagChange::new(EffectCategory::Requires, "NeedsDON:2"));
        assert!(TagChange::parse("NeedsDON:2").is_err());
        assert!(TagChange::parse("sideways=X").is_err());
    }

    #[test]
    fn test_added_expression_is_canonical() {
        let mut store = store();
        apply_edit(
            &mut store,
            "OP01-016",
            &edit(&["requires=NeedsDON:2", "mechanics=Blocker"], &[]),
            Utc::now(),
        )
        .unwrap();

        let entry = store.get("OP01-016").unwrap();
        let effective = entry.effective();
        assert!(effective.requires.contains("NeedsDON:>=2"));
        assert!(effective.mechanics.contains("Blocker"));
        assert!(entry.last_edited_at.is_some());
    }

    #[test]
    fn test_invalid_edit_changes_nothing() {
        let mut store = store();
        let before = store.clone();
        let result = apply_edit(
            &mut store,
            "OP01-016",
            &edit(
                &["requires=NeedsDON:abc", "produces=Draw:1", "mechanics=On Play"],
                &["produces=KO:Cost<=3"],
            ),
            Utc::now(),
        );

        match result.unwrap_err() {
            SynergyError::InvalidExpression { errors, .. } => assert_eq!(errors.len(), 3),
            other => panic!("Expected InvalidExpression, got {:?}", other),
        }
        assert_eq!(store, before);
    }

    #[test]
    fn test_wrong_side_is_rejected() {
        let mut store = store();
        let result = apply_edit(
            &mut store,
            "OP01-016",
            &edit(&["produces=NeedsDON:>=2"], &[]),
            Utc::now(),
        );
        assert!(matches!(result, Err(SynergyError::InvalidExpression { .. })));
    }

    #[test]
    fn test_remove_suppresses_auto_token() {
        let mut store = store();
        apply_edit(
            &mut store,
            "OP01-016",
            &edit(&[], &["produces=KO:Cost<=3"]),
            Utc::now(),
        )
        .unwrap();
        assert!(store.get("OP01-016").unwrap().effective().produces.is_empty());

        // adding it back clears the removal
        apply_edit(
            &mut store,
            "OP01-016",
            &edit(&["produces=KO:Cost<=3"], &[]),
            Utc::now(),
        )
        .unwrap();
        assert!(store
            .get("OP01-016")
            .unwrap()
            .effective()
            .produces
            .contains("KO:Cost<=3"));
    }

    #[test]
    fn test_unknown_and_alt_art_cards() {
        let mut store = store();
        for id in ["OP01-016_p1", "ZZ99-001"] {
            let err = apply_edit(&mut store, id, &TagEdit::default(), Utc::now()).unwrap_err();
            assert_eq!(err.exit_code(), 4);
        }
    }

    #[test]
    fn test_review_and_note() {
        let mut store = store();
        let edit = TagEdit {
            reviewed: Some(true),
            note: Some("checked against errata".to_string()),
            ..Default::default()
        };
        apply_edit(&mut store, "OP01-016", &edit, Utc::now()).unwrap();
        let entry = store.get("OP01-016").unwrap();
        assert!(entry.reviewed);
        assert_eq!(entry.notes.as_deref(), Some("checked against errata"));
    }
}
