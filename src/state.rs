//! State Store
//!
//! JSON file mapping resource names to their persisted [`ResourceState`].

use crate::resource::ResourceState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StateStore {
    #[serde(default)]
    resources: BTreeMap<String, ResourceState>,
    #[serde(skip)]
    path: PathBuf,
}

impl StateStore {
    /// Load the store at `path`; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                resources: BTreeMap::new(),
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        let mut store: Self = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt state file {}", path.display()))?;
        store.path = path.to_path_buf();

        Ok(store)
    }

    /// Save the store back to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file {}", self.path.display()))?;

        tracing::debug!("Saved {} resource(s) to {}", self.resources.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&ResourceState> {
        self.resources.get(name)
    }

    pub fn insert(&mut self, name: &str, state: ResourceState) {
        self.resources.insert(name.to_string(), state);
    }

    pub fn remove(&mut self, name: &str) -> Option<ResourceState> {
        self.resources.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn temp_state_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("restcall-test-{}", uuid::Uuid::new_v4()))
            .join("state.json")
    }

    fn sample_state(id: &str) -> ResourceState {
        ResourceState {
            id: id.to_string(),
            create_output: r#"{"name":"test"}"#.to_string(),
            raw_output: r#"{"name":"test"}"#.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let path = temp_state_path();
        let store = StateStore::load(&path).unwrap();
        assert!(store.get("anything").is_none());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_state_path();
        let mut store = StateStore::load(&path).unwrap();
        let state = sample_state("5678");
        store.insert("objects", state.clone());
        store.save().unwrap();

        let reloaded = StateStore::load(&path).unwrap();
        assert_eq!(reloaded.get("objects"), Some(&state));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_remove() {
        let mut store = StateStore::default();
        store.insert("a", sample_state("1"));
        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let path = temp_state_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let err = StateStore::load(&path).unwrap_err();
        assert!(err.to_string().contains("Corrupt state file"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
