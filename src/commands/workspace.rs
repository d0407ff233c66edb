//! Workspace handler: live workspace control through `i3-msg` and layout
//! snapshots through `i3-save-tree`.

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use crate::cli::{CliError, WorkspaceArgs, WorkspaceCommand};
use crate::commands::{App, check, read_i3_config, write_i3_config};
use crate::core::errors::I3cError;
use crate::exec::runner::{RunOptions, argv};
use crate::i3::config_file::{add_assign, strip_layout_comments};
use crate::i3::msg;

const LAYOUTS_KEY: &str = "workspace_layouts";

pub fn run(app: &mut App, args: &WorkspaceArgs) -> Result<(), CliError> {
    msg::ensure_available(&app.detector)?;

    match &args.command {
        WorkspaceCommand::List => list(app),
        WorkspaceCommand::Create { name } | WorkspaceCommand::Goto { workspace: name } => {
            msg::run_checked(app.runner.as_ref(), &["workspace", &target_of(name)])?;
            println!("Switched to workspace {name}.");
            Ok(())
        }
        WorkspaceCommand::Rename { new_name, number } => rename(app, new_name, number.as_deref()),
        WorkspaceCommand::Move { workspace } => {
            msg::run_checked(
                app.runner.as_ref(),
                &["move", "container", "to", "workspace", &target_of(workspace)],
            )?;
            println!("Moved container to workspace {workspace}.");
            Ok(())
        }
        WorkspaceCommand::Output { output, workspace } => to_output(app, output, workspace.as_deref()),
        WorkspaceCommand::Assign {
            criteria,
            workspace,
            add,
        } => assign(app, criteria, workspace, *add),
        WorkspaceCommand::Save { name, workspace } => save_layout(app, name, workspace.as_deref()),
        WorkspaceCommand::Load { name } => load_layout(app, name),
        WorkspaceCommand::Layouts => list_layouts(app),
        WorkspaceCommand::Delete { name } => delete_layout(app, name),
    }
}

/// Digit-only workspace names address by number so "9" matches
/// "9: mail" and friends.
fn target_of(workspace: &str) -> String {
    if workspace.chars().all(|c| c.is_ascii_digit()) && !workspace.is_empty() {
        format!("number {workspace}")
    } else {
        workspace.to_string()
    }
}

fn list(app: &App) -> Result<(), CliError> {
    let workspaces = msg::get_workspaces(app.runner.as_ref())?;
    if workspaces.is_empty() {
        println!("No workspaces found.");
        return Ok(());
    }
    for workspace in workspaces {
        let name = workspace.get("name").and_then(Value::as_str).unwrap_or("?");
        let output = workspace
            .get("output")
            .and_then(Value::as_str)
            .unwrap_or("?");
        let mut flags = Vec::new();
        for flag in ["focused", "visible", "urgent"] {
            if workspace.get(flag).and_then(Value::as_bool).unwrap_or(false) {
                flags.push(flag);
            }
        }
        if flags.is_empty() {
            println!("{name} (on {output})");
        } else {
            println!("{name} [{}] (on {output})", flags.join(", "));
        }
    }
    Ok(())
}

fn rename(app: &App, new_name: &str, number: Option<&str>) -> Result<(), CliError> {
    let old_name = match number {
        Some(number) => {
            let workspaces = msg::get_workspaces(app.runner.as_ref())?;
            workspaces
                .iter()
                .find(|ws| {
                    ws.get("num")
                        .and_then(Value::as_i64)
                        .is_some_and(|num| num.to_string() == number)
                        || ws.get("name").and_then(Value::as_str) == Some(number)
                })
                .and_then(|ws| ws.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .ok_or_else(|| CliError::NotFound {
                    kind: "workspace",
                    name: number.to_string(),
                })?
        }
        None => msg::focused_workspace(app.runner.as_ref())?,
    };

    msg::run_checked(
        app.runner.as_ref(),
        &["rename", "workspace", &old_name, "to", new_name],
    )?;
    println!("Renamed workspace {old_name} to {new_name}.");
    Ok(())
}

fn to_output(app: &App, output: &str, workspace: Option<&str>) -> Result<(), CliError> {
    match workspace {
        Some(workspace) => {
            msg::run_checked(
                app.runner.as_ref(),
                &["workspace", &target_of(workspace), "output", output],
            )?;
            println!("Moved workspace {workspace} to output {output}.");
        }
        None => {
            msg::run_checked(
                app.runner.as_ref(),
                &["move", "workspace", "to", "output", output],
            )?;
            println!("Moved current workspace to output {output}.");
        }
    }
    Ok(())
}

fn assign(app: &App, criteria: &str, workspace: &str, add: bool) -> Result<(), CliError> {
    if add {
        let (path, content) = read_i3_config(&app.store)?;
        let updated = add_assign(&content, criteria, workspace);
        write_i3_config(&path, &updated)?;
        println!("Added assignment to the i3 config: [{criteria}] -> {workspace}");
        println!("Reload i3 to apply (i3ctl config reload).");
        return Ok(());
    }

    let target = format!("workspace {}", target_of(workspace));
    msg::run_checked(
        app.runner.as_ref(),
        &["assign", &format!("[{criteria}]"), &target],
    )?;
    println!("Assigned [{criteria}] to workspace {workspace} for this session.");
    Ok(())
}

fn layout_path(app: &App, name: &str) -> PathBuf {
    app.layouts_dir().join(format!("{name}.json"))
}

fn save_layout(app: &mut App, name: &str, workspace: Option<&str>) -> Result<(), CliError> {
    if !app.detector.is_available("i3-save-tree") {
        return Err(CliError::Tool {
            category: "workspace layout",
            hint: "i3-save-tree (i3)",
        });
    }

    let workspace = match workspace {
        Some(workspace) => workspace.to_string(),
        None => msg::focused_workspace(app.runner.as_ref())?,
    };

    let snapshot = check(
        app.runner.run(
            &argv(&["i3-save-tree", &format!("--workspace={workspace}")]),
            RunOptions::default(),
        ),
        "i3-save-tree",
    )?;
    let cleaned = strip_layout_comments(snapshot.stdout_trimmed());

    let path = layout_path(app, name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| I3cError::io(parent, err))?;
    }
    fs::write(&path, cleaned).map_err(|err| I3cError::io(&path, err))?;

    app.store.insert_profile(
        LAYOUTS_KEY,
        name,
        json!({
            "path": path.display().to_string(),
            "workspace": workspace,
        }),
    );
    app.store.save();
    println!("Saved workspace {workspace} layout as '{name}'.");
    Ok(())
}

fn load_layout(app: &App, name: &str) -> Result<(), CliError> {
    let path = app
        .store
        .get_profile(LAYOUTS_KEY, name)
        .and_then(|layout| layout.get("path"))
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .ok_or_else(|| CliError::NotFound {
            kind: "workspace layout",
            name: name.to_string(),
        })?;
    if !path.exists() {
        return Err(CliError::NotFound {
            kind: "workspace layout file",
            name: path.display().to_string(),
        });
    }

    msg::run_checked(
        app.runner.as_ref(),
        &["append_layout", &path.display().to_string()],
    )?;
    println!("Loaded layout '{name}'.");
    println!("Start the applications the layout expects; placeholders fill as windows appear.");
    Ok(())
}

fn list_layouts(app: &App) -> Result<(), CliError> {
    let names = app.store.profile_names(LAYOUTS_KEY);
    if names.is_empty() {
        println!("No saved workspace layouts.");
        return Ok(());
    }
    println!("Saved workspace layouts:");
    for name in names {
        let workspace = app
            .store
            .get_profile(LAYOUTS_KEY, &name)
            .and_then(|layout| layout.get("workspace"))
            .and_then(Value::as_str)
            .unwrap_or("?");
        println!("- {name} (workspace {workspace})");
    }
    Ok(())
}

fn delete_layout(app: &mut App, name: &str) -> Result<(), CliError> {
    let Some(removed) = app.store.remove_profile(LAYOUTS_KEY, name) else {
        return Err(CliError::NotFound {
            kind: "workspace layout",
            name: name.to_string(),
        });
    };
    app.store.save();
    if let Some(path) = removed.get("path").and_then(Value::as_str) {
        if let Err(err) = fs::remove_file(path) {
            log::warn!("failed to remove layout file {path}: {err}");
        }
    }
    println!("Deleted workspace layout '{name}'.");
    Ok(())
}
