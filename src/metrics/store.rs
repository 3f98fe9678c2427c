//! Small string-keyed store persisted as a JSON object.
//!
//! Values are kept as strings so that the file stays readable and other
//! keys written by other tools survive a round trip untouched.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key the best score is recorded under
pub const BEST_SCORE_KEY: &str = "2048_best_score";

#[derive(Debug)]
pub struct ScoreStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ScoreStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read score store {:?}", path))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse score store {:?}", path))?
        } else {
            debug!(path = ?path, "no score store yet");
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set `key` and write the whole store back to disk
    pub fn set(&mut self, key: &str, value: impl ToString) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save()
    }

    /// Best score on record; unreadable values count as zero
    pub fn best_score(&self) -> u64 {
        match self.get(BEST_SCORE_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(raw, "ignoring malformed best score");
                0
            }),
            None => 0,
        }
    }

    pub fn set_best_score(&mut self, best: u64) -> Result<()> {
        self.set(BEST_SCORE_KEY, best)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize score store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write score store to {:?}", self.path))?;
        Ok(())
    }
}
