use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::matrix::DecisionMatrixWeights;
use crate::models::DocStatusMap;
use crate::notify::ReminderMarkers;

pub const WEIGHTS_KEY: &str = "ui_decision_matrix_weights";
pub const DOC_STATUS_KEY: &str = "ui_doc_status_by_application";
pub const DISMISSED_KEY: &str = "ui_dismissed_notifications";
pub const REMINDER_DAYS_KEY: &str = "reminder_days";

/// Key/value preference file. Loading never fails: a missing file or
/// malformed JSON simply yields defaults, mirroring how the app treats its
/// stored preferences as best-effort.
#[derive(Debug)]
pub struct PrefsStore {
    path: PathBuf,
    values: serde_json::Map<String, Value>,
}

impl PrefsStore {
    pub fn open(path: &Path) -> Self {
        let values = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        PrefsStore { path: path.to_path_buf(), values }
    }

    /// Reads one key, falling back to the type's default when the key is
    /// absent or its stored value does not deserialize.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.values
            .get(key)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> anyhow::Result<()> {
        let encoded = serde_json::to_value(value)
            .with_context(|| format!("failed to encode preference {key}"))?;
        self.values.insert(key.to_string(), encoded);
        let raw = serde_json::to_string_pretty(&Value::Object(self.values.clone()))?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    pub fn weights(&self) -> DecisionMatrixWeights {
        self.values
            .get(WEIGHTS_KEY)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn reminder_markers(&self) -> ReminderMarkers {
        match self.values.get(REMINDER_DAYS_KEY).and_then(Value::as_str) {
            Some(raw) => ReminderMarkers::parse(raw),
            None => ReminderMarkers::default(),
        }
    }

    pub fn doc_status(&self) -> DocStatusMap {
        self.load_or_default(DOC_STATUS_KEY)
    }

    pub fn dismissed(&self) -> HashMap<String, bool> {
        self.load_or_default(DISMISSED_KEY)
    }
}
