//! Thin wrapper over `i3-msg`.
//!
//! `i3-msg` replies with a JSON array of result objects; a reply item with
//! `"success": false` means i3 rejected the command even though the
//! process exited zero.

use serde_json::Value;

use crate::core::errors::{I3cError, Result};
use crate::exec::detect::{Category, ToolDetector};
use crate::exec::runner::{RunOptions, Runner};

/// Fail early with an actionable message when `i3-msg` is absent.
pub fn ensure_available(detector: &ToolDetector) -> Result<()> {
    if detector.first_available(Category::WindowManager).is_some() {
        Ok(())
    } else {
        Err(I3cError::I3Unavailable)
    }
}

/// Send a command to i3 and parse the JSON reply array.
pub fn command(runner: &dyn Runner, args: &[&str]) -> Result<Vec<Value>> {
    let mut argv = vec!["i3-msg".to_string()];
    argv.extend(args.iter().map(ToString::to_string));

    let result = runner.run(&argv, RunOptions::default());
    if !result.success() {
        return Err(I3cError::backend("i3-msg", result.stderr_trimmed()));
    }

    let raw = result.stdout_trimmed();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    parse_reply(raw)
}

/// Parse a reply array, checking per-item `success` flags.
pub fn parse_reply(raw: &str) -> Result<Vec<Value>> {
    let parsed: Value = serde_json::from_str(raw).map_err(|err| I3cError::OutputParse {
        tool: "i3-msg",
        details: err.to_string(),
    })?;
    let Value::Array(items) = parsed else {
        return Err(I3cError::OutputParse {
            tool: "i3-msg",
            details: format!("expected a JSON array, got: {parsed}"),
        });
    };
    Ok(items)
}

/// Whether every reply item reports success.
#[must_use]
pub fn all_succeeded(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| item.get("success").and_then(Value::as_bool).unwrap_or(false))
}

/// Run a command and fold the reply into a pass/fail result.
pub fn run_checked(runner: &dyn Runner, args: &[&str]) -> Result<()> {
    let items = command(runner, args)?;
    if all_succeeded(&items) {
        Ok(())
    } else {
        let detail = items
            .iter()
            .find_map(|item| item.get("error").and_then(Value::as_str))
            .unwrap_or("command rejected by i3");
        Err(I3cError::backend("i3-msg", detail))
    }
}

pub fn reload(runner: &dyn Runner) -> Result<()> {
    run_checked(runner, &["reload"])
}

pub fn restart(runner: &dyn Runner) -> Result<()> {
    run_checked(runner, &["restart"])
}

/// i3 version string.
pub fn version(runner: &dyn Runner) -> Result<String> {
    let result = runner.run(
        &crate::exec::runner::argv(&["i3-msg", "-v"]),
        RunOptions::default(),
    );
    if result.success() {
        Ok(result.stdout_trimmed().to_string())
    } else {
        Err(I3cError::backend("i3-msg", result.stderr_trimmed()))
    }
}

/// Workspace list as raw JSON objects.
pub fn get_workspaces(runner: &dyn Runner) -> Result<Vec<Value>> {
    command(runner, &["-t", "get_workspaces"])
}

/// Output (monitor) list as raw JSON objects.
pub fn get_outputs(runner: &dyn Runner) -> Result<Vec<Value>> {
    command(runner, &["-t", "get_outputs"])
}

/// Name of the currently focused workspace.
pub fn focused_workspace(runner: &dyn Runner) -> Result<String> {
    let workspaces = get_workspaces(runner)?;
    workspaces
        .iter()
        .find(|ws| ws.get("focused").and_then(Value::as_bool).unwrap_or(false))
        .and_then(|ws| ws.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| I3cError::OutputParse {
            tool: "i3-msg",
            details: "no focused workspace in get_workspaces reply".to_string(),
        })
}
