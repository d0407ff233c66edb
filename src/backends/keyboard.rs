//! Keyboard layout backend built on `setxkbmap`, with `localectl`
//! (or the xkb rules file) for layout enumeration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::exec::runner::argv;

/// Path of the xkb rules registry used when `localectl` is unavailable.
pub const XKB_RULES_FILE: &str = "/usr/share/X11/xkb/rules/base.lst";

/// Common layouts printed when no enumeration source works.
pub const FALLBACK_LAYOUTS: &[(&str, &str)] = &[
    ("us", "English (US)"),
    ("de", "German"),
    ("fr", "French"),
    ("gb", "English (UK)"),
    ("it", "Italian"),
    ("es", "Spanish"),
    ("ru", "Russian"),
    ("jp", "Japanese"),
    ("cn", "Chinese"),
];

/// A `setxkbmap -query` reading; also the stored shape of layout presets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XkbState {
    pub layout: Option<String>,
    pub variant: Option<String>,
    pub options: Option<String>,
}

#[must_use]
pub fn switch_argv(layout: &str, variant: Option<&str>, options: Option<&str>) -> Vec<String> {
    let mut cmd = argv(&["setxkbmap", layout]);
    if let Some(variant) = variant {
        cmd.push("-variant".to_string());
        cmd.push(variant.to_string());
    }
    if let Some(options) = options {
        cmd.push("-option".to_string());
        cmd.push(options.to_string());
    }
    cmd
}

#[must_use]
pub fn query_argv() -> Vec<String> {
    argv(&["setxkbmap", "-query"])
}

#[must_use]
pub fn list_layouts_argv() -> Vec<String> {
    argv(&["localectl", "list-x11-keymap-layouts"])
}

/// Parse `setxkbmap -query` output (`key: value` lines).
#[must_use]
pub fn parse_query(output: &str) -> XkbState {
    let mut state = XkbState::default();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "layout" => state.layout = Some(value.to_string()),
                "variant" => state.variant = Some(value.to_string()),
                "options" => state.options = Some(value.to_string()),
                _ => {}
            }
        }
    }
    state
}

/// Extract layout codes and names from the `! layout` section of the
/// xkb rules registry.
#[must_use]
pub fn parse_rules_layouts(rules: &str) -> Vec<(String, String)> {
    let mut layouts = Vec::new();
    let mut in_section = false;
    for line in rules.lines() {
        if line.starts_with("! layout") {
            in_section = true;
            continue;
        }
        if line.starts_with('!') {
            in_section = false;
            continue;
        }
        if in_section && !line.trim().is_empty() {
            let mut parts = line.split_whitespace();
            if let Some(code) = parts.next() {
                let name = parts.collect::<Vec<_>>().join(" ");
                if !name.is_empty() {
                    layouts.push((code.to_string(), name));
                }
            }
        }
    }
    layouts
}

/// Whether the fallback rules registry can be consulted on this host.
#[must_use]
pub fn rules_file_available() -> bool {
    Path::new(XKB_RULES_FILE).exists()
}
