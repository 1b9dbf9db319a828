//! Best score persisted as a small JSON file.

use derive_more::{Display, Error};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use strictly_2048::{BEST_SCORE_KEY, BestScoreStore};
use tracing::{debug, instrument};

/// Key of the sound preference.
pub const SOUND_KEY: &str = "SfxOn";

/// Stores `{ "BestScore": n, "SfxOn": b }` in a JSON file.
///
/// A missing file reads as zero. Other keys in the file are preserved.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    /// Creates a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            StoreError::new(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::new(format!(
                "Expected a JSON object in {}, found {}",
                self.path.display(),
                other
            ))),
            Err(e) => Err(StoreError::new(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl JsonScoreStore {
    /// Reads the saved sound preference, `None` when it was never saved.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load_sound(&self) -> Result<Option<bool>, StoreError> {
        match self.read_map()?.get(SOUND_KEY) {
            None => Ok(None),
            Some(Value::Bool(on)) => Ok(Some(*on)),
            Some(other) => Err(StoreError::new(format!(
                "{} is not a boolean: {}",
                SOUND_KEY, other
            ))),
        }
    }

    /// Saves the sound preference next to the best score.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save_sound(&self, on: bool) -> Result<(), StoreError> {
        self.write_key(SOUND_KEY, Value::Bool(on))?;
        debug!(on, "Saved sound preference");
        Ok(())
    }

    /// Sets one key, keeping the others. A corrupt file is overwritten.
    fn write_key(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), value);
        let content = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| StoreError::new(format!("Failed to encode {}: {}", key, e)))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::new(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        std::fs::write(&self.path, content).map_err(|e| {
            StoreError::new(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl BestScoreStore for JsonScoreStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<u64, strictly_2048::StoreError> {
        let map = self.read_map()?;
        let best = match map.get(BEST_SCORE_KEY) {
            None => 0,
            Some(value) => value.as_u64().ok_or_else(|| {
                StoreError::new(format!(
                    "{} is not a non-negative integer: {}",
                    BEST_SCORE_KEY, value
                ))
            })?,
        };
        debug!(best, "Read best score");
        Ok(best)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn save(&mut self, best: u64) -> Result<(), strictly_2048::StoreError> {
        self.write_key(BEST_SCORE_KEY, Value::from(best))?;
        debug!(best, "Saved best score");
        Ok(())
    }
}

/// Best-score file error.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
