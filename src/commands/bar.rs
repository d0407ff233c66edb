//! Bar handler: bar mode through `i3-msg`, i3status reload via SIGUSR1,
//! and bar/i3status config editing.

use std::fs;
use std::path::PathBuf;

use crate::cli::{BarArgs, BarCommand, BarConfigCommand, BarMode, CliError, I3statusCommand};
use crate::commands::{App, check, read_i3_config, resolve_editor};
use crate::core::errors::I3cError;
use crate::core::paths;
use crate::exec::runner::{RunOptions, argv};
use crate::i3::config_file::{
    DEFAULT_I3STATUS_CONFIG, bar_properties, bar_sections, status_command_config_path,
};
use crate::i3::msg;

pub fn run(app: &mut App, args: &BarArgs) -> Result<(), CliError> {
    msg::ensure_available(&app.detector)?;

    match &args.command {
        BarCommand::Show => {
            set_mode(app, BarMode::Dock)?;
            println!("i3 bar is now visible.");
            Ok(())
        }
        BarCommand::Hide => {
            set_mode(app, BarMode::Hide)?;
            println!("i3 bar is now hidden (press the Mod key to show it).");
            Ok(())
        }
        BarCommand::Toggle => toggle(app),
        BarCommand::Mode { mode } => {
            set_mode(app, *mode)?;
            let description = match mode {
                BarMode::Dock => "always visible",
                BarMode::Hide => "hidden until the Mod key is pressed",
                BarMode::Invisible => "never shown",
            };
            println!("i3 bar mode set to '{}' ({description}).", mode.as_str());
            Ok(())
        }
        BarCommand::Status => status(app),
        BarCommand::I3status { command } => match command {
            I3statusCommand::Reload => reload_i3status(app),
            I3statusCommand::Edit { editor } => edit_i3status(app, editor.as_deref()),
        },
        BarCommand::Config { command } => match command {
            BarConfigCommand::Edit { editor } => edit_bar_config(app, editor.as_deref()),
            BarConfigCommand::List => list_bar_configs(app),
        },
    }
}

fn set_mode(app: &App, mode: BarMode) -> Result<(), CliError> {
    log::info!("setting bar mode to {}", mode.as_str());
    msg::run_checked(app.runner.as_ref(), &["bar", "mode", mode.as_str()])?;
    Ok(())
}

fn toggle(app: &App) -> Result<(), CliError> {
    // i3 reports the current mode when `bar mode` is queried without an
    // argument; an unparseable reply counts as dock.
    let current = msg::command(app.runner.as_ref(), &["bar", "mode"])
        .ok()
        .and_then(|items| {
            items.iter().find_map(|item| {
                item.get("mode")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| "dock".to_string());

    let next = if current == "dock" {
        BarMode::Hide
    } else {
        BarMode::Dock
    };
    set_mode(app, next)?;
    println!("i3 bar mode changed from '{current}' to '{}'.", next.as_str());
    Ok(())
}

fn status(app: &App) -> Result<(), CliError> {
    let (path, content) = read_i3_config(&app.store)?;
    println!("i3 bar status:");
    println!("  Config file: {}", paths::display_with_tilde(&path));

    let sections = bar_sections(&content);
    if sections.is_empty() {
        println!("  No bar sections found in the i3 config.");
        return Ok(());
    }
    for (index, section) in sections.iter().enumerate() {
        println!("  Bar #{}:", index + 1);
        for (key, value) in bar_properties(section) {
            println!("    {key}: {value}");
        }
    }
    Ok(())
}

fn reload_i3status(app: &App) -> Result<(), CliError> {
    if !app.detector.is_available("killall") || !app.detector.is_available("i3status") {
        return Err(CliError::Tool {
            category: "status bar",
            hint: "i3status (and psmisc for killall)",
        });
    }

    let result = app.runner.run(
        &argv(&["killall", "-USR1", "i3status"]),
        RunOptions::default(),
    );
    if !result.success() {
        return Err(CliError::Backend(
            "failed to signal i3status; it may not be running".to_string(),
        ));
    }
    println!("i3status configuration reloaded.");
    Ok(())
}

/// Existing i3status config, preferring the path named by the bar's
/// status_command over the default candidates.
fn find_i3status_config(app: &App) -> Option<PathBuf> {
    if let Ok((_, content)) = read_i3_config(&app.store) {
        if let Some(configured) = status_command_config_path(&content) {
            let path = paths::expand_tilde(&configured);
            if path.exists() {
                return Some(path);
            }
        }
    }
    paths::i3status_config_candidates()
        .into_iter()
        .find(|path| path.exists())
}

fn edit_i3status(app: &App, editor: Option<&str>) -> Result<(), CliError> {
    let path = match find_i3status_config(app) {
        Some(path) => path,
        None => {
            // ~/.config/i3status/config is the primary candidate.
            let path = paths::i3status_config_candidates().remove(0);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|err| I3cError::io(parent, err))?;
            }
            fs::write(&path, DEFAULT_I3STATUS_CONFIG).map_err(|err| I3cError::io(&path, err))?;
            println!(
                "Created a default i3status config at {}",
                paths::display_with_tilde(&path)
            );
            path
        }
    };

    open_editor(app, editor, &path)?;
    println!("Run 'i3ctl bar i3status reload' to apply changes.");
    Ok(())
}

fn edit_bar_config(app: &App, editor: Option<&str>) -> Result<(), CliError> {
    let (path, _) = read_i3_config(&app.store)?;
    println!("Look for the 'bar {{' section.");
    open_editor(app, editor, &path)?;
    println!("Reload i3 to apply (i3ctl config reload).");
    Ok(())
}

fn open_editor(app: &App, explicit: Option<&str>, path: &std::path::Path) -> Result<(), CliError> {
    let editor = resolve_editor(&app.store, explicit);
    if !app.detector.is_available(&editor) {
        return Err(CliError::User(format!(
            "editor '{editor}' not found; set $EDITOR or pass --editor"
        )));
    }
    let path_str = path.display().to_string();
    check(
        app.runner
            .run(&argv(&[&editor, &path_str]), RunOptions::passthrough()),
        &editor,
    )?;
    Ok(())
}

fn list_bar_configs(app: &App) -> Result<(), CliError> {
    let (_, content) = read_i3_config(&app.store)?;
    let sections = bar_sections(&content);
    if sections.is_empty() {
        println!("No bar sections found in the i3 config.");
        return Ok(());
    }
    println!("Found {} bar section(s):", sections.len());
    for (index, section) in sections.iter().enumerate() {
        println!("\nBar #{}:", index + 1);
        for (key, value) in bar_properties(section) {
            println!("  {key}: {value}");
        }
    }
    Ok(())
}
