//! i3 config handler: edit, reload, locate, print.

use crate::cli::{CliError, ConfigArgs, ConfigCommand};
use crate::commands::{App, check, confirm, read_i3_config, resolve_editor};
use crate::core::paths;
use crate::exec::runner::{RunOptions, argv};
use crate::i3::msg;

pub fn run(app: &mut App, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        ConfigCommand::Edit { editor } => edit(app, editor.as_deref()),
        ConfigCommand::Reload => reload(app),
        ConfigCommand::Path => {
            let (path, _) = read_i3_config(&app.store)?;
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::Show { lines } => show(app, *lines),
    }
}

fn edit(app: &App, editor: Option<&str>) -> Result<(), CliError> {
    let (path, _) = read_i3_config(&app.store)?;
    let editor = resolve_editor(&app.store, editor);
    if !app.detector.is_available(&editor) {
        return Err(CliError::User(format!(
            "editor '{editor}' not found; set $EDITOR or pass --editor"
        )));
    }

    log::info!("editing {} with {editor}", path.display());
    let path_str = path.display().to_string();
    check(
        app.runner
            .run(&argv(&[&editor, &path_str]), RunOptions::passthrough()),
        &editor,
    )?;

    if confirm("Reload i3 now?") {
        reload(app)?;
    } else {
        println!("Reload i3 to apply (i3ctl config reload).");
    }
    Ok(())
}

fn reload(app: &App) -> Result<(), CliError> {
    msg::ensure_available(&app.detector)?;
    msg::reload(app.runner.as_ref())?;
    println!("i3 configuration reloaded.");
    Ok(())
}

fn show(app: &App, lines: Option<usize>) -> Result<(), CliError> {
    let (path, content) = read_i3_config(&app.store)?;
    println!("# {}", paths::display_with_tilde(&path));
    match lines {
        Some(count) => {
            for line in content.lines().take(count) {
                println!("{line}");
            }
        }
        None => print!("{content}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::ScriptedRunner;
    use crate::core::config::ConfigStore;
    use crate::exec::detect::ToolDetector;
    use serde_json::json;
    use tempfile::TempDir;

    fn app_over_config(content: &str, probe: fn(&str) -> bool) -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let i3_config = dir.path().join("i3config");
        std::fs::write(&i3_config, content).unwrap();
        let mut store = ConfigStore::open(Some(&dir.path().join("config.json")));
        store.set("i3_config_path", json!(i3_config.display().to_string()));
        (
            App::with_parts(
                Box::new(ScriptedRunner::new()),
                ToolDetector::with_probe(probe),
                store,
            ),
            dir,
        )
    }

    #[test]
    fn reload_issues_i3_msg_reload() {
        let runner = ScriptedRunner::new();
        runner.push_stdout(r#"[{"success": true}]"#);
        let calls = runner.call_log();
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::open(Some(&dir.path().join("config.json")));
        let mut app = App::with_parts(
            Box::new(runner),
            ToolDetector::with_probe(|t| t == "i3-msg"),
            store,
        );
        run(
            &mut app,
            &ConfigArgs {
                command: ConfigCommand::Reload,
            },
        )
        .unwrap();
        assert_eq!(calls.borrow()[0], argv(&["i3-msg", "reload"]));
    }

    #[test]
    fn reload_without_i3_msg_fails() {
        let (mut app, _dir) = app_over_config("", |_| false);
        let err = run(
            &mut app,
            &ConfigArgs {
                command: ConfigCommand::Reload,
            },
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn show_and_path_read_the_configured_file() {
        let (mut app, _dir) = app_over_config("set $mod Mod4\nfont pango:monospace 8\n", |_| true);
        run(
            &mut app,
            &ConfigArgs {
                command: ConfigCommand::Path,
            },
        )
        .unwrap();
        run(
            &mut app,
            &ConfigArgs {
                command: ConfigCommand::Show { lines: Some(1) },
            },
        )
        .unwrap();
    }

    #[test]
    fn edit_with_missing_editor_is_a_user_error() {
        let (mut app, _dir) = app_over_config("set $mod Mod4\n", |_| false);
        let err = run(
            &mut app,
            &ConfigArgs {
                command: ConfigCommand::Edit {
                    editor: Some("definitely-not-an-editor".to_string()),
                },
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::User(_)));
    }
}
