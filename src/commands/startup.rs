//! Startup handler: exec/exec_always entries in the i3 config.

use crate::cli::{CliError, StartupArgs, StartupCommand};
use crate::commands::{App, read_i3_config, write_i3_config};
use crate::i3::config_file::{AddOutcome, add_startup, remove_startup, startup_entries};

pub fn run(app: &mut App, args: &StartupArgs) -> Result<(), CliError> {
    match &args.command {
        StartupCommand::Add {
            command,
            once,
            comment,
        } => add(app, &command.join(" "), *once, comment.as_deref()),
        StartupCommand::Remove { command } => remove(app, &command.join(" ")),
        StartupCommand::List { all } => list(app, *all),
    }
}

fn add(app: &App, command: &str, once: bool, comment: Option<&str>) -> Result<(), CliError> {
    if command.trim().is_empty() {
        return Err(CliError::User("no startup command given".to_string()));
    }
    let (path, content) = read_i3_config(&app.store)?;
    let (updated, outcome) = add_startup(&content, command, !once, comment);
    match outcome {
        AddOutcome::AlreadyPresent => {
            println!("Startup entry already present: {command}");
            Ok(())
        }
        AddOutcome::Inserted => {
            write_i3_config(&path, &updated)?;
            let directive = if once { "exec" } else { "exec_always" };
            println!("Added: {directive} {command}");
            println!("Reload i3 to apply (i3ctl config reload).");
            Ok(())
        }
    }
}

fn remove(app: &App, command: &str) -> Result<(), CliError> {
    let (path, content) = read_i3_config(&app.store)?;
    match remove_startup(&content, command) {
        Some(updated) => {
            write_i3_config(&path, &updated)?;
            println!("Removed startup entry: {command}");
            println!("Reload i3 to apply (i3ctl config reload).");
            Ok(())
        }
        None => Err(CliError::NotFound {
            kind: "startup entry",
            name: command.to_string(),
        }),
    }
}

fn list(app: &App, all: bool) -> Result<(), CliError> {
    let (_, content) = read_i3_config(&app.store)?;
    let entries = startup_entries(&content);

    if entries.always.is_empty() && entries.once.is_empty() {
        println!("No startup entries in the i3 config.");
    }
    if !entries.always.is_empty() {
        println!("Run on every (re)start (exec_always):");
        for entry in &entries.always {
            match &entry.comment {
                Some(comment) => println!("- {} # {comment}", entry.command),
                None => println!("- {}", entry.command),
            }
        }
    }
    if !entries.once.is_empty() {
        println!("Run once at startup (exec):");
        for entry in &entries.once {
            match &entry.comment {
                Some(comment) => println!("- {} # {comment}", entry.command),
                None => println!("- {}", entry.command),
            }
        }
    }
    if all && !entries.disabled.is_empty() {
        println!("Commented out:");
        for line in &entries.disabled {
            println!("- {line}");
        }
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

    fn app_over_config(content: &str) -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let i3_config = dir.path().join("i3config");
        std::fs::write(&i3_config, content).unwrap();
        let mut store = ConfigStore::open(Some(&dir.path().join("config.json")));
        store.set("i3_config_path", json!(i3_config.display().to_string()));
        (
            App::with_parts(
                Box::new(ScriptedRunner::new()),
                ToolDetector::with_probe(|_| true),
                store,
            ),
            dir,
        )
    }

    fn config_of(app: &App) -> String {
        read_i3_config(&app.store).unwrap().1
    }

    #[test]
    fn add_writes_exec_always_by_default() {
        let (mut app, _dir) = app_over_config("set $mod Mod4\n");
        run(
            &mut app,
            &StartupArgs {
                command: StartupCommand::Add {
                    command: vec!["nm-applet".to_string()],
                    once: false,
                    comment: None,
                },
            },
        )
        .unwrap();
        assert!(config_of(&app).contains("exec_always nm-applet"));
    }

    #[test]
    fn add_once_writes_plain_exec() {
        let (mut app, _dir) = app_over_config("set $mod Mod4\n");
        run(
            &mut app,
            &StartupArgs {
                command: StartupCommand::Add {
                    command: vec!["firefox".to_string()],
                    once: true,
                    comment: Some("browser".to_string()),
                },
            },
        )
        .unwrap();
        let content = config_of(&app);
        assert!(content.contains("exec firefox"));
        assert!(!content.contains("exec_always firefox"));
        assert!(content.contains("# browser"));
    }

    #[test]
    fn duplicate_add_leaves_config_unchanged() {
        let (mut app, _dir) = app_over_config("exec_always nm-applet\n");
        let before = config_of(&app);
        run(
            &mut app,
            &StartupArgs {
                command: StartupCommand::Add {
                    command: vec!["nm-applet".to_string()],
                    once: false,
                    comment: None,
                },
            },
        )
        .unwrap();
        assert_eq!(config_of(&app), before);
    }

    #[test]
    fn list_all_reports_commented_entries() {
        let (mut app, _dir) = app_over_config("# exec picom\nexec_always nm-applet\n");
        let entries = startup_entries(&config_of(&app));
        assert_eq!(entries.disabled, vec!["exec picom".to_string()]);
        run(
            &mut app,
            &StartupArgs {
                command: StartupCommand::List { all: true },
            },
        )
        .unwrap();
    }

    #[test]
    fn remove_missing_entry_is_not_found() {
        let (mut app, _dir) = app_over_config("exec_always nm-applet\n");
        let err = run(
            &mut app,
            &StartupArgs {
                command: StartupCommand::Remove {
                    command: vec!["picom".to_string()],
                },
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::NotFound {
                kind: "startup entry",
                ..
            }
        ));
    }

    #[test]
    fn remove_deletes_the_entry() {
        let (mut app, _dir) = app_over_config("exec_always nm-applet\nexec firefox\n");
        run(
            &mut app,
            &StartupArgs {
                command: StartupCommand::Remove {
                    command: vec!["nm-applet".to_string()],
                },
            },
        )
        .unwrap();
        assert!(!config_of(&app).contains("nm-applet"));
        assert!(config_of(&app).contains("exec firefox"));
    }
}
