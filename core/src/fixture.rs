//! Named static payloads stored as JSON files.
//!
//! `fixtures/<name>.json` holds an object of named payloads, e.g.
//! `users.json` → `{"validUser": {...}}`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::HarnessConfig;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct FixtureLoader {
    root: PathBuf,
}

impl FixtureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loader rooted at `config.fixtures_dir` (`API_FIXTURES_DIR`).
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(&config.fixtures_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load and parse `<root>/<name>.json`.
    pub fn load(&self, name: &str) -> Result<Value, ApiError> {
        let path = self.root.join(format!("{name}.json"));
        let raw = fs::read_to_string(&path).map_err(|e| ApiError::Fixture {
            name: name.to_string(),
            message: format!("{}: {e}", path.display()),
        })?;
        serde_json::from_str(&raw).map_err(|e| ApiError::Fixture {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    /// One named entry of a fixture file.
    pub fn entry(&self, name: &str, key: &str) -> Result<Value, ApiError> {
        let mut fixture = self.load(name)?;
        fixture
            .get_mut(key)
            .map(Value::take)
            .ok_or_else(|| ApiError::Fixture {
                name: name.to_string(),
                message: format!("no entry `{key}`"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> FixtureLoader {
        FixtureLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures"))
    }

    #[test]
    fn loads_named_entry() {
        let user = loader().entry("users", "validUser").unwrap();
        assert_eq!(user["username"], "fixture_user");
    }

    #[test]
    fn loader_follows_configured_dir() {
        let config = HarnessConfig::from_lookup(|name| {
            (name == "API_FIXTURES_DIR").then(|| concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures").to_string())
        })
        .unwrap();
        let loader = FixtureLoader::from_config(&config);
        assert_eq!(loader.root(), config.fixtures_dir.as_path());
        assert_eq!(loader.entry("users", "validUser").unwrap()["username"], "fixture_user");
    }

    #[test]
    fn missing_file_is_fixture_error() {
        let err = loader().load("does-not-exist").unwrap_err();
        assert!(matches!(err, ApiError::Fixture { ref name, .. } if name == "does-not-exist"));
    }

    #[test]
    fn missing_entry_is_fixture_error() {
        let err = loader().entry("posts", "nope").unwrap_err();
        assert_eq!(err.to_string(), "fixture `posts`: no entry `nope`");
    }
}
