//! Text surgery on the i3 config file.
//!
//! Everything here is a pure function from config text to config text (or
//! extracted data), so the edit logic is testable without touching disk.
//! Callers read the file, transform, and write back.

use regex::Regex;

/// A parsed `bindsym`/`bindcode` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// `bindsym` or `bindcode`.
    pub kind: String,
    /// Key chord, e.g. `$mod+Shift+a`.
    pub keys: String,
    /// Bound command text.
    pub command: String,
    /// 1-based line number in the config.
    pub line: usize,
}

fn parse_binding_line(line: &str, number: usize) -> Option<Binding> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let kind = if trimmed.starts_with("bindsym ") {
        "bindsym"
    } else if trimmed.starts_with("bindcode ") {
        "bindcode"
    } else {
        return None;
    };
    let rest = trimmed[kind.len()..].trim_start();
    let (keys, command) = rest.split_once(char::is_whitespace)?;
    Some(Binding {
        kind: kind.to_string(),
        keys: keys.to_string(),
        command: command.trim().to_string(),
        line: number,
    })
}

/// All bindings, optionally filtered by keyword (case-insensitive, matches
/// the whole line) and/or restricted to chords using `$mod`.
#[must_use]
pub fn list_bindings(content: &str, filter: Option<&str>, mod_only: bool) -> Vec<Binding> {
    let filter_lower = filter.map(str::to_lowercase);
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_binding_line(line, idx + 1))
        .filter(|binding| !mod_only || binding.keys.contains("$mod"))
        .filter(|binding| {
            filter_lower.as_ref().is_none_or(|keyword| {
                format!("{} {} {}", binding.kind, binding.keys, binding.command)
                    .to_lowercase()
                    .contains(keyword)
            })
        })
        .collect()
}

/// Bindings matching an exact key chord.
#[must_use]
pub fn find_bindings(content: &str, keys: &str) -> Vec<Binding> {
    list_bindings(content, None, false)
        .into_iter()
        .filter(|binding| binding.keys == keys)
        .collect()
}

/// Outcome of [`add_binding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    AlreadyPresent,
}

/// Insert `bindsym <keys> <command>` after the last existing binding, or
/// at the end of the file when the config has none. An identical line is
/// left alone.
#[must_use]
pub fn add_binding(content: &str, keys: &str, command: &str) -> (String, AddOutcome) {
    let new_line = format!("bindsym {keys} {command}");
    if content.lines().any(|line| line.trim() == new_line) {
        return (content.to_string(), AddOutcome::AlreadyPresent);
    }

    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let last_binding = lines
        .iter()
        .rposition(|line| line.trim_start().starts_with("bindsym "));

    match last_binding {
        Some(idx) => lines.insert(idx + 1, new_line),
        None => {
            lines.push(String::new());
            lines.push("# Custom keybinding".to_string());
            lines.push(new_line);
        }
    }
    (rejoin(lines, content), AddOutcome::Inserted)
}

/// Remove every `bindsym` for a key chord. `None` when nothing matched.
#[must_use]
pub fn remove_binding(content: &str, keys: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"^\s*bindsym\s+{}\s+", regex::escape(keys)))
        .expect("escaped chord is a valid pattern");
    let mut found = false;
    let lines: Vec<String> = content
        .lines()
        .filter(|line| {
            if pattern.is_match(line) {
                found = true;
                false
            } else {
                true
            }
        })
        .map(str::to_string)
        .collect();
    found.then(|| rejoin(lines, content))
}

/// Key chords bound more than once (`bindsym` only), with all their
/// bindings in file order.
#[must_use]
pub fn find_conflicts(content: &str) -> Vec<(String, Vec<Binding>)> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: std::collections::HashMap<String, Vec<Binding>> =
        std::collections::HashMap::new();

    for binding in list_bindings(content, None, false) {
        if binding.kind != "bindsym" {
            continue;
        }
        if !by_key.contains_key(&binding.keys) {
            order.push(binding.keys.clone());
        }
        by_key.entry(binding.keys.clone()).or_default().push(binding);
    }

    order
        .into_iter()
        .filter_map(|keys| {
            let bindings = by_key.remove(&keys)?;
            (bindings.len() > 1).then_some((keys, bindings))
        })
        .collect()
}

/// Raw binding lines (trimmed) for saving a profile.
#[must_use]
pub fn extract_binding_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("bindsym ") || line.starts_with("bindcode "))
        .map(str::to_string)
        .collect()
}

/// Replace every binding in the config with the profile's lines, inserted
/// after the `set $mod` definition (or appended when there is none).
#[must_use]
pub fn replace_bindings(content: &str, profile_name: &str, bindings: &[String]) -> String {
    let mut lines: Vec<String> = content
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with("bindsym ") && !trimmed.starts_with("bindcode ")
        })
        .map(str::to_string)
        .collect();

    let insert_at = lines
        .iter()
        .position(|line| line.contains("set $mod "))
        .map_or(lines.len(), |idx| idx + 1);

    let mut block = Vec::with_capacity(bindings.len() + 2);
    block.push(String::new());
    block.push(format!("# Keybindings from profile: {profile_name}"));
    block.extend(bindings.iter().cloned());
    lines.splice(insert_at..insert_at, block);
    rejoin(lines, content)
}

/// `bar { ... }` sections, each returned as its full text (brace-counted,
/// so nested `colors { }` blocks stay inside their section).
#[must_use]
pub fn bar_sections(content: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut depth = 0usize;

    for line in content.lines() {
        let trimmed = line.trim();
        if depth == 0 {
            if trimmed.starts_with("bar {") || trimmed == "bar" || trimmed.starts_with("bar{") {
                depth = trimmed.matches('{').count();
                current = vec![trimmed.to_string()];
                if depth == 0 {
                    // `bar` with the brace on the next line.
                    depth = 1;
                }
            }
            continue;
        }
        current.push(trimmed.to_string());
        depth += trimmed.matches('{').count();
        depth = depth.saturating_sub(trimmed.matches('}').count());
        if depth == 0 {
            sections.push(current.join("\n"));
            current = Vec::new();
        }
    }
    sections
}

/// Key/value pairs scraped from one bar section (first-word split;
/// comments and everything inside nested blocks skipped).
#[must_use]
pub fn bar_properties(section: &str) -> Vec<(String, String)> {
    let mut props = Vec::new();
    let mut depth = 0usize;
    for line in section.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let opens = trimmed.matches('{').count();
        let closes = trimmed.matches('}').count();
        // Only lines directly inside the bar block are properties; block
        // openers/closers and nested content (colors { ... }) are not.
        if depth == 1 && opens == 0 && closes == 0 {
            if let Some((key, value)) = trimmed.split_once(' ') {
                props.push((key.to_string(), value.trim().to_string()));
            }
        }
        depth += opens;
        depth = depth.saturating_sub(closes);
    }
    props
}

/// The `-c <path>` argument of a `status_command` line, unexpanded.
#[must_use]
pub fn status_command_config_path(content: &str) -> Option<String> {
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || !trimmed.contains("status_command") {
            continue;
        }
        if let Some((_, after)) = trimmed.split_once("-c") {
            let path = after.split_whitespace().next()?;
            return Some(path.trim_matches(['"', '\'']).to_string());
        }
    }
    None
}

/// One startup entry (`exec` / `exec_always`) with an optional preceding
/// comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupEntry {
    pub command: String,
    pub comment: Option<String>,
}

/// Startup entries grouped by kind, plus commented-out ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupEntries {
    pub always: Vec<StartupEntry>,
    pub once: Vec<StartupEntry>,
    pub disabled: Vec<String>,
}

/// Scrape `exec`/`exec_always` lines. A comment line directly above an
/// entry is attached to it; `# exec ...` lines are reported as disabled.
#[must_use]
pub fn startup_entries(content: &str) -> StartupEntries {
    let mut entries = StartupEntries::default();
    let mut pending_comment: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(comment) = trimmed.strip_prefix('#') {
            let comment = comment.trim();
            if comment.starts_with("exec") {
                entries.disabled.push(comment.to_string());
            } else if pending_comment.is_none() {
                pending_comment = Some(comment.to_string());
            }
            continue;
        }
        if trimmed.is_empty() {
            pending_comment = None;
            continue;
        }
        if let Some(command) = trimmed.strip_prefix("exec_always ") {
            entries.always.push(StartupEntry {
                command: command.trim().to_string(),
                comment: pending_comment.take(),
            });
        } else if let Some(command) = trimmed.strip_prefix("exec ") {
            entries.once.push(StartupEntry {
                command: command.trim().to_string(),
                comment: pending_comment.take(),
            });
        } else {
            pending_comment = None;
        }
    }
    entries
}

/// Add a startup command after the last exec line (or at the end under a
/// new heading). Duplicate commands are left alone.
#[must_use]
pub fn add_startup(
    content: &str,
    command: &str,
    always: bool,
    comment: Option<&str>,
) -> (String, AddOutcome) {
    if startup_line_pattern(command)
        .map(|pattern| content.lines().any(|line| pattern.is_match(line.trim())))
        .unwrap_or(false)
    {
        return (content.to_string(), AddOutcome::AlreadyPresent);
    }

    let exec_kind = if always { "exec_always" } else { "exec" };
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let last_exec = lines.iter().rposition(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with("exec") || trimmed.starts_with("# exec")
    });

    let mut block = Vec::new();
    if let Some(comment) = comment {
        block.push(format!("# {comment}"));
    }
    block.push(format!("{exec_kind} {command}"));

    match last_exec {
        Some(idx) => {
            lines.splice(idx + 1..idx + 1, block);
        }
        None => {
            lines.push(String::new());
            lines.push("# Startup applications".to_string());
            lines.extend(block);
        }
    }
    (rejoin(lines, content), AddOutcome::Inserted)
}

/// Remove a startup command and its attached comment line. `None` when
/// the command is not in the config.
#[must_use]
pub fn remove_startup(content: &str, command: &str) -> Option<String> {
    let pattern = startup_line_pattern(command)?;
    let lines: Vec<&str> = content.lines().collect();
    let matches: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| pattern.is_match(line.trim()))
        .map(|(idx, _)| idx)
        .collect();
    if matches.is_empty() {
        return None;
    }

    let mut kept: Vec<String> = lines.iter().map(ToString::to_string).collect();
    for idx in matches.into_iter().rev() {
        kept.remove(idx);
        // Drop a single attached comment, but not a comment block.
        if idx > 0
            && kept[idx - 1].trim_start().starts_with('#')
            && (idx == 1 || !kept[idx - 2].trim_start().starts_with('#'))
        {
            kept.remove(idx - 1);
        }
    }
    Some(rejoin(kept, content))
}

fn startup_line_pattern(command: &str) -> Option<Regex> {
    Regex::new(&format!(r"^(exec(_always)?) {}$", regex::escape(command))).ok()
}

/// Append an `assign` rule after the last existing one (or at the end
/// under a new heading). Numeric workspaces become `number N` targets.
#[must_use]
pub fn add_assign(content: &str, criteria: &str, workspace: &str) -> String {
    let target = if workspace.chars().all(|c| c.is_ascii_digit()) {
        format!("number {workspace}")
    } else {
        workspace.to_string()
    };
    let assign_line = format!("assign [{criteria}] {target}");

    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let last_assign = lines
        .iter()
        .rposition(|line| line.trim_start().starts_with("assign "));
    match last_assign {
        Some(idx) => lines.insert(idx + 1, assign_line),
        None => {
            lines.push(String::new());
            lines.push("# Window assignments".to_string());
            lines.push(assign_line);
        }
    }
    rejoin(lines, content)
}

/// Strip the `//` comment lines `i3-save-tree` emits so the snapshot is
/// valid JSON for `append_layout`.
#[must_use]
pub fn strip_layout_comments(raw: &str) -> String {
    let mut cleaned: String = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");
    cleaned.push('\n');
    cleaned
}

fn rejoin(lines: Vec<String>, original: &str) -> String {
    let mut joined = lines.join("\n");
    if original.ends_with('\n') || original.is_empty() {
        joined.push('\n');
    }
    joined
}

/// Default i3status config written when editing and none exists yet.
pub const DEFAULT_I3STATUS_CONFIG: &str = r#"# i3status configuration file
# see "man i3status" for documentation

general {
        colors = true
        interval = 5
}

order += "cpu_usage"
order += "memory"
order += "disk /"
order += "wireless _first_"
order += "ethernet _first_"
order += "battery all"
order += "tztime local"

wireless _first_ {
        format_up = "W: (%quality at %essid) %ip"
        format_down = "W: down"
}

ethernet _first_ {
        format_up = "E: %ip"
        format_down = "E: down"
}

battery all {
        format = "%status %percentage %remaining"
}

disk "/" {
        format = "%avail"
}

memory {
        format = "%used | %available"
        threshold_degraded = "1G"
        format_degraded = "MEMORY < %available"
}

cpu_usage {
        format = "CPU: %usage"
}

tztime local {
        format = "%Y-%m-%d %H:%M:%S"
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# i3 config
set $mod Mod4

bindsym $mod+Return exec i3-sensible-terminal
bindsym $mod+Shift+q kill
bindcode 121 exec pactl set-sink-mute @DEFAULT_SINK@ toggle

# launcher
exec_always nm-applet
exec feh --bg-fill /tmp/wall.png
# exec picom

bar {
    status_command i3status -c ~/.config/i3status/config
    position top
    colors {
        background #000000
    }
}
";

    #[test]
    fn lists_both_binding_kinds() {
        let bindings = list_bindings(SAMPLE, None, false);
        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings[0].keys, "$mod+Return");
        assert_eq!(bindings[2].kind, "bindcode");
    }

    #[test]
    fn mod_filter_drops_bindcode_chords() {
        let bindings = list_bindings(SAMPLE, None, true);
        assert_eq!(bindings.len(), 2);
        assert!(bindings.iter().all(|b| b.keys.contains("$mod")));
    }

    #[test]
    fn keyword_filter_is_case_insensitive() {
        let bindings = list_bindings(SAMPLE, Some("KILL"), false);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].keys, "$mod+Shift+q");
    }

    #[test]
    fn add_binding_inserts_after_last_bindsym() {
        let (updated, outcome) = add_binding(SAMPLE, "$mod+d", "exec dmenu_run");
        assert_eq!(outcome, AddOutcome::Inserted);
        let lines: Vec<&str> = updated.lines().collect();
        let kill = lines
            .iter()
            .position(|l| l.contains("Shift+q kill"))
            .unwrap();
        assert_eq!(lines[kill + 1], "bindsym $mod+d exec dmenu_run");
    }

    #[test]
    fn add_binding_is_idempotent_for_identical_lines() {
        let (updated, outcome) = add_binding(SAMPLE, "$mod+Shift+q", "kill");
        assert_eq!(outcome, AddOutcome::AlreadyPresent);
        assert_eq!(updated, SAMPLE);
    }

    #[test]
    fn add_binding_to_config_without_bindings_appends() {
        let (updated, outcome) = add_binding("set $mod Mod4\n", "$mod+d", "exec dmenu_run");
        assert_eq!(outcome, AddOutcome::Inserted);
        assert!(updated.contains("# Custom keybinding\nbindsym $mod+d exec dmenu_run"));
    }

    #[test]
    fn remove_binding_drops_matching_lines_only() {
        let updated = remove_binding(SAMPLE, "$mod+Shift+q").unwrap();
        assert!(!updated.contains("kill"));
        assert!(updated.contains("$mod+Return"));
    }

    #[test]
    fn remove_binding_does_not_match_chord_prefixes() {
        // "$mod+Return" must not be removed when asked for "$mod+R".
        assert!(remove_binding(SAMPLE, "$mod+R").is_none());
    }

    #[test]
    fn remove_missing_binding_reports_none() {
        assert!(remove_binding(SAMPLE, "$mod+x").is_none());
    }

    #[test]
    fn conflicts_detects_double_bound_chords() {
        let content = "bindsym $mod+p exec a\nbindsym $mod+q exec b\nbindsym $mod+p exec c\n";
        let conflicts = find_conflicts(content);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0, "$mod+p");
        assert_eq!(conflicts[0].1.len(), 2);
        assert!(find_conflicts(SAMPLE).is_empty());
    }

    #[test]
    fn profile_round_trip_replaces_bindings() {
        let saved = extract_binding_lines(SAMPLE);
        assert_eq!(saved.len(), 3);

        let profile = vec!["bindsym $mod+t exec thunar".to_string()];
        let updated = replace_bindings(SAMPLE, "minimal", &profile);
        assert!(updated.contains("# Keybindings from profile: minimal"));
        assert!(updated.contains("bindsym $mod+t exec thunar"));
        assert!(!updated.contains("$mod+Return"));
        // Inserted right after the mod definition.
        let mod_idx = updated.lines().position(|l| l.contains("set $mod")).unwrap();
        let profile_idx = updated
            .lines()
            .position(|l| l.contains("profile: minimal"))
            .unwrap();
        assert!(profile_idx > mod_idx && profile_idx <= mod_idx + 2);
    }

    #[test]
    fn bar_section_extraction_handles_nested_braces() {
        let sections = bar_sections(SAMPLE);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].contains("position top"));
        assert!(sections[0].contains("background #000000"));
    }

    #[test]
    fn bar_properties_skip_nested_blocks() {
        let sections = bar_sections(SAMPLE);
        let props = bar_properties(&sections[0]);
        assert!(props.iter().any(|(k, v)| k == "position" && v == "top"));
        assert!(!props.iter().any(|(k, _)| k == "background"));
    }

    #[test]
    fn status_command_path_is_extracted_and_unquoted() {
        assert_eq!(
            status_command_config_path(SAMPLE).as_deref(),
            Some("~/.config/i3status/config")
        );
        assert!(status_command_config_path("bar {\n}\n").is_none());
    }

    #[test]
    fn startup_entries_group_by_kind_and_attach_comments() {
        let entries = startup_entries(SAMPLE);
        assert_eq!(entries.always.len(), 1);
        assert_eq!(entries.always[0].command, "nm-applet");
        assert_eq!(entries.always[0].comment.as_deref(), Some("launcher"));
        assert_eq!(entries.once.len(), 1);
        assert_eq!(entries.disabled, vec!["exec picom"]);
    }

    #[test]
    fn add_startup_inserts_after_last_exec() {
        let (updated, outcome) = add_startup(SAMPLE, "dunst", true, Some("notifications"));
        assert_eq!(outcome, AddOutcome::Inserted);
        assert!(updated.contains("# notifications\nexec_always dunst"));
    }

    #[test]
    fn add_startup_detects_duplicates_across_exec_kinds() {
        let (updated, outcome) = add_startup(SAMPLE, "nm-applet", false, None);
        assert_eq!(outcome, AddOutcome::AlreadyPresent);
        assert_eq!(updated, SAMPLE);
    }

    #[test]
    fn remove_startup_takes_attached_comment_along() {
        let updated = remove_startup(SAMPLE, "nm-applet").unwrap();
        assert!(!updated.contains("nm-applet"));
        assert!(!updated.contains("# launcher"));
        assert!(updated.contains("feh --bg-fill"));
        assert!(remove_startup(SAMPLE, "not-there").is_none());
    }

    #[test]
    fn add_assign_uses_number_target_for_digits() {
        let updated = add_assign(SAMPLE, "class=Firefox", "3");
        assert!(updated.contains("assign [class=Firefox] number 3"));

        let named = add_assign(SAMPLE, "class=Spotify", "music");
        assert!(named.contains("assign [class=Spotify] music"));
    }

    #[test]
    fn add_assign_appends_after_existing_rules() {
        let content = "assign [class=A] 1\nset $mod Mod4\n";
        let updated = add_assign(content, "class=B", "2");
        let lines: Vec<&str> = updated.lines().collect();
        assert_eq!(lines[1], "assign [class=B] number 2");
    }

    #[test]
    fn layout_comment_stripping_leaves_json() {
        let raw = "// vim:ts=4\n{\n    // swallows\n    \"name\": \"x\"\n}\n";
        let cleaned = strip_layout_comments(raw);
        assert!(serde_json::from_str::<serde_json::Value>(&cleaned).is_ok());
    }
}
