//! Per-user filesystem locations and i3/i3status config discovery.

use std::env;
use std::path::{Path, PathBuf};

/// Home directory, falling back to `/tmp` when `HOME` is unset.
#[must_use]
pub fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[I3C-PATHS] WARNING: HOME not set, falling back to /tmp for user paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

/// `~/.config/i3ctl`
#[must_use]
pub fn config_dir() -> PathBuf {
    home_dir().join(".config").join("i3ctl")
}

/// `~/.config/i3ctl/config.json` — the flat JSON settings document.
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.json")
}

/// `~/.local/share/i3ctl` — saved profiles and layout snapshots.
#[must_use]
pub fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("i3ctl")
}

/// Candidate i3 config locations, in lookup order.
#[must_use]
pub fn i3_config_candidates() -> Vec<PathBuf> {
    let home = home_dir();
    vec![
        home.join(".config").join("i3").join("config"),
        home.join(".i3").join("config"),
        PathBuf::from("/etc/i3/config"),
    ]
}

/// Resolve the i3 config path: a configured override wins, otherwise the
/// first existing candidate, otherwise the primary candidate (which the
/// caller will report as missing).
#[must_use]
pub fn resolve_i3_config(configured: Option<&str>) -> PathBuf {
    if let Some(path) = configured {
        if !path.is_empty() {
            return expand_tilde(path);
        }
    }
    let candidates = i3_config_candidates();
    candidates
        .iter()
        .find(|p| p.exists())
        .cloned()
        .unwrap_or_else(|| candidates[0].clone())
}

/// Candidate i3status config locations, in lookup order.
#[must_use]
pub fn i3status_config_candidates() -> Vec<PathBuf> {
    let home = home_dir();
    vec![
        home.join(".config").join("i3status").join("config"),
        home.join(".i3status.conf"),
        PathBuf::from("/etc/i3status.conf"),
    ]
}

/// Expand a leading `~/` to the home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    path.strip_prefix("~/").map_or_else(
        || PathBuf::from(path),
        |rest| home_dir().join(rest),
    )
}

/// Render a path with the home directory collapsed back to `~` for display.
#[must_use]
pub fn display_with_tilde(path: &Path) -> String {
    let home = home_dir();
    path.strip_prefix(&home).map_or_else(
        |_| path.display().to_string(),
        |rest| format!("~/{}", rest.display()),
    )
}
