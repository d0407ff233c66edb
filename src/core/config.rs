//! Flat JSON settings document: tool preferences, paths, histories, and
//! named profile registries.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::core::paths;

/// History lists (wallpapers) keep at most this many entries.
pub const HISTORY_CAP: usize = 10;

/// Persistent key/value store backed by `~/.config/i3ctl/config.json`.
///
/// The document is a flat JSON object; unknown keys written by other
/// versions are preserved verbatim and key order survives round-trips.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl ConfigStore {
    /// Baseline document created on first run and merged into partial files.
    #[must_use]
    pub fn defaults() -> Map<String, Value> {
        let editor = env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());
        let mut doc = Map::new();
        doc.insert(
            "i3_config_path".into(),
            json!(paths::home_dir().join(".config/i3/config").display().to_string()),
        );
        doc.insert("editor".into(), json!(editor));
        doc.insert("brightness_tool".into(), json!("auto"));
        doc.insert("volume_tool".into(), json!("auto"));
        doc.insert("wallpaper_tool".into(), json!("auto"));
        doc.insert(
            "wallpaper_directory".into(),
            json!(paths::home_dir().join("Pictures").display().to_string()),
        );
        doc.insert("log_level".into(), json!("INFO"));
        doc.insert(
            "log_file".into(),
            json!(paths::config_dir().join("i3ctl.log").display().to_string()),
        );
        doc
    }

    /// Load the store, creating the file with defaults when absent and
    /// merging in any default keys a hand-edited file dropped.
    ///
    /// Never fails: an unreadable or corrupt file logs an error and yields
    /// an in-memory default document (the broken file is left untouched).
    #[must_use]
    pub fn open(explicit: Option<&Path>) -> Self {
        let path = explicit.map_or_else(paths::config_file, Path::to_path_buf);

        if !path.exists() {
            log::info!("config file not found, creating default at {}", path.display());
            let store = Self {
                path,
                doc: Self::defaults(),
            };
            store.save();
            return store;
        }

        let doc = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => Some(map),
                Ok(_) => {
                    log::error!("config file {} is not a JSON object", path.display());
                    None
                }
                Err(err) => {
                    log::error!("failed to parse {}: {err}", path.display());
                    None
                }
            },
            Err(err) => {
                log::error!("failed to read {}: {err}", path.display());
                None
            }
        };

        let Some(mut doc) = doc else {
            log::info!("using default configuration");
            return Self {
                path,
                doc: Self::defaults(),
            };
        };

        // Hand-edited files may miss newer keys; merge and persist once.
        let mut merged = false;
        for (key, value) in Self::defaults() {
            if !doc.contains_key(&key) {
                doc.insert(key, value);
                merged = true;
            }
        }

        let store = Self { path, doc };
        if merged {
            store.save();
        }
        store
    }

    /// Build an in-memory store over an explicit path without touching disk.
    #[must_use]
    pub fn in_memory(path: PathBuf) -> Self {
        Self {
            path,
            doc: Self::defaults(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.doc.get(key).and_then(Value::as_str)
    }

    /// Set a key. Last write wins; callers persist via [`Self::save`].
    pub fn set(&mut self, key: &str, value: Value) {
        self.doc.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.doc.remove(key)
    }

    /// Persist the document. Reports failure by logging and returning
    /// `false`; callers treat a failed save as non-fatal.
    pub fn save(&self) -> bool {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::error!("failed to create {}: {err}", parent.display());
                return false;
            }
        }
        let mut rendered = match serde_json::to_string_pretty(&self.doc) {
            Ok(s) => s,
            Err(err) => {
                log::error!("failed to serialize config: {err}");
                return false;
            }
        };
        rendered.push('\n');
        match fs::write(&self.path, rendered) {
            Ok(()) => true,
            Err(err) => {
                log::error!("failed to save {}: {err}", self.path.display());
                false
            }
        }
    }

    /// Read a history list (most recent first).
    #[must_use]
    pub fn history(&self, key: &str) -> Vec<String> {
        self.doc
            .get(key)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Push onto a history list: duplicates of `entry` are removed first,
    /// the entry goes to the front, and the list is capped at
    /// [`HISTORY_CAP`] (oldest dropped).
    pub fn push_history(&mut self, key: &str, entry: &str) {
        let mut entries = self.history(key);
        entries.retain(|existing| existing != entry);
        entries.insert(0, entry.to_string());
        entries.truncate(HISTORY_CAP);
        self.set(key, json!(entries));
    }

    /// Names registered under a profile registry key, sorted.
    #[must_use]
    pub fn profile_names(&self, registry: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .doc
            .get(registry)
            .and_then(Value::as_object)
            .map(|profiles| profiles.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    #[must_use]
    pub fn get_profile(&self, registry: &str, name: &str) -> Option<&Value> {
        self.doc
            .get(registry)
            .and_then(Value::as_object)
            .and_then(|profiles| profiles.get(name))
    }

    /// Register a named entry. Saving under an existing name overwrites it.
    pub fn insert_profile(&mut self, registry: &str, name: &str, entry: Value) {
        if !self.doc.get(registry).is_some_and(Value::is_object) {
            self.doc.insert(registry.to_string(), json!({}));
        }
        if let Some(profiles) = self.doc.get_mut(registry).and_then(Value::as_object_mut) {
            profiles.insert(name.to_string(), entry);
        }
    }

    /// Remove a named entry, returning it when present.
    pub fn remove_profile(&mut self, registry: &str, name: &str) -> Option<Value> {
        self.doc
            .get_mut(registry)
            .and_then(Value::as_object_mut)
            .and_then(|profiles| profiles.shift_remove(name))
    }
}
