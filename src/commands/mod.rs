//! Command handlers.
//!
//! Every handler follows the same template: resolve the backend tool
//! (explicit flag, then config preference, then detection), build argv
//! through the backend adapter, execute through the runner, and report.
//! State that must survive the process (histories, presets) goes through
//! the config store.

pub mod bar;
pub mod bluetooth;
pub mod brightness;
pub mod config;
pub mod keybind;
pub mod layout;
pub mod network;
pub mod power;
pub mod startup;
pub mod volume;
pub mod wallpaper;
pub mod workspace;

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::cli::CliError;
use crate::core::config::ConfigStore;
use crate::core::errors::I3cError;
use crate::core::paths;
use crate::exec::detect::ToolDetector;
use crate::exec::runner::{ExecResult, Runner, SystemRunner};

/// Everything a handler needs: the process seam, tool availability, and
/// persistent settings. Tests construct it with scripted parts.
pub struct App {
    pub runner: Box<dyn Runner>,
    pub detector: ToolDetector,
    pub store: ConfigStore,
    data_dir: PathBuf,
}

impl App {
    /// Production context: real subprocesses, PATH probing, on-disk store.
    #[must_use]
    pub fn from_env(config: Option<&Path>) -> Self {
        Self {
            runner: Box::new(SystemRunner),
            detector: ToolDetector::new(),
            store: ConfigStore::open(config),
            data_dir: paths::data_dir(),
        }
    }

    /// Context from explicit parts.
    #[must_use]
    pub fn with_parts(
        runner: Box<dyn Runner>,
        detector: ToolDetector,
        store: ConfigStore,
    ) -> Self {
        Self {
            runner,
            detector,
            store,
            data_dir: paths::data_dir(),
        }
    }

    /// Redirect profile and layout storage to another directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = dir;
        self
    }

    /// Directory holding saved keybinding profiles (`<name>.conf`).
    #[must_use]
    pub fn keybindings_dir(&self) -> PathBuf {
        self.data_dir.join("keybindings")
    }

    /// Directory holding saved workspace layout snapshots (`<name>.json`).
    #[must_use]
    pub fn layouts_dir(&self) -> PathBuf {
        self.data_dir.join("layouts")
    }
}

/// Resolve the i3 config path and read its contents.
pub fn read_i3_config(store: &ConfigStore) -> Result<(PathBuf, String), CliError> {
    let path = paths::resolve_i3_config(store.get_str("i3_config_path"));
    let content = fs::read_to_string(&path).map_err(|err| I3cError::io(&path, err))?;
    Ok((path, content))
}

/// Write the i3 config back in place.
pub fn write_i3_config(path: &Path, content: &str) -> Result<(), CliError> {
    fs::write(path, content).map_err(|err| I3cError::io(path, err))?;
    Ok(())
}

/// Editor resolution: explicit flag, then config, then $EDITOR, then nano.
#[must_use]
pub fn resolve_editor(store: &ConfigStore, explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| store.get_str("editor").map(str::to_string))
        .or_else(|| env::var("EDITOR").ok())
        .unwrap_or_else(|| "nano".to_string())
}

/// y/n confirmation on stdin; anything but y/yes declines.
#[must_use]
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt} (y/n) ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Turn a failed [`ExecResult`] into a [`CliError::Backend`] carrying
/// whichever stream has the diagnostic.
pub fn check(result: ExecResult, tool: &str) -> Result<ExecResult, CliError> {
    if result.success() {
        Ok(result)
    } else {
        let detail = if result.stderr_trimmed().is_empty() {
            result.stdout_trimmed()
        } else {
            result.stderr_trimmed()
        };
        Err(CliError::Backend(format!("{tool} failed: {detail}")))
    }
}

/// Clamp a percentage argument to the 0-100 range.
#[must_use]
pub const fn clamp_percent(value: u8) -> u8 {
    if value > 100 { 100 } else { value }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn clamp_caps_at_one_hundred() {
        assert_eq!(clamp_percent(0), 0);
        assert_eq!(clamp_percent(100), 100);
        assert_eq!(clamp_percent(250), 100);
    }

    #[test]
    fn editor_resolution_order() {
        let dir = TempDir::new().unwrap();
        let mut store = ConfigStore::open(Some(&dir.path().join("config.json")));
        store.set("editor", json!("vim"));
        assert_eq!(resolve_editor(&store, Some("emacs")), "emacs");
        assert_eq!(resolve_editor(&store, None), "vim");
    }

    #[test]
    fn check_prefers_stderr_detail() {
        let result = ExecResult {
            code: 1,
            stdout: Some("partial".to_string()),
            stderr: Some("device busy".to_string()),
        };
        let err = check(result, "pactl").unwrap_err();
        assert!(err.to_string().contains("device busy"));

        let quiet = ExecResult {
            code: 1,
            stdout: Some("Failed to connect".to_string()),
            stderr: Some(String::new()),
        };
        let err = check(quiet, "bluetoothctl").unwrap_err();
        assert!(err.to_string().contains("Failed to connect"));
    }
}
