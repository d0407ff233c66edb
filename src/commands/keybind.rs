//! Keybinding handler: reads and rewrites bind lines in the i3 config,
//! with named profiles stored as `.conf` files under the data dir.

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use crate::cli::{CliError, KeybindArgs, KeybindCommand};
use crate::commands::{App, read_i3_config, write_i3_config};
use crate::core::errors::I3cError;
use crate::i3::config_file::{
    self, AddOutcome, extract_binding_lines, find_bindings, find_conflicts, list_bindings,
    replace_bindings,
};

const PROFILES_KEY: &str = "keybinding_profiles";

pub fn run(app: &mut App, args: &KeybindArgs) -> Result<(), CliError> {
    match &args.command {
        KeybindCommand::List { filter, mod_only } => list(app, filter.as_deref(), *mod_only),
        KeybindCommand::Add { keys, command } => add(app, keys, &command.join(" ")),
        KeybindCommand::Remove { keys } => remove(app, keys),
        KeybindCommand::Show { keys } => show(app, keys),
        KeybindCommand::Conflicts => conflicts(app),
        KeybindCommand::Save { name } => save_profile(app, name),
        KeybindCommand::Load { name } => load_profile(app, name),
        KeybindCommand::Profiles => list_profiles(app),
        KeybindCommand::Delete { name } => delete_profile(app, name),
    }
}

fn list(app: &App, filter: Option<&str>, mod_only: bool) -> Result<(), CliError> {
    let (_, content) = read_i3_config(&app.store)?;
    let bindings = list_bindings(&content, filter, mod_only);
    if bindings.is_empty() {
        println!("No matching keybindings.");
        return Ok(());
    }
    for binding in bindings {
        println!("{:<28} {}", binding.keys, binding.command);
    }
    Ok(())
}

fn add(app: &App, keys: &str, command: &str) -> Result<(), CliError> {
    let (path, content) = read_i3_config(&app.store)?;
    let (updated, outcome) = config_file::add_binding(&content, keys, command);
    match outcome {
        AddOutcome::AlreadyPresent => {
            println!("Binding for {keys} already exists; use remove first to replace it.");
            Ok(())
        }
        AddOutcome::Inserted => {
            write_i3_config(&path, &updated)?;
            println!("Added: bindsym {keys} {command}");
            println!("Reload i3 to apply (i3ctl config reload).");
            Ok(())
        }
    }
}

fn remove(app: &App, keys: &str) -> Result<(), CliError> {
    let (path, content) = read_i3_config(&app.store)?;
    match config_file::remove_binding(&content, keys) {
        Some(updated) => {
            write_i3_config(&path, &updated)?;
            println!("Removed binding for {keys}.");
            println!("Reload i3 to apply (i3ctl config reload).");
            Ok(())
        }
        None => Err(CliError::NotFound {
            kind: "keybinding",
            name: keys.to_string(),
        }),
    }
}

fn show(app: &App, keys: &str) -> Result<(), CliError> {
    let (_, content) = read_i3_config(&app.store)?;
    let matches = find_bindings(&content, keys);
    if matches.is_empty() {
        return Err(CliError::NotFound {
            kind: "keybinding",
            name: keys.to_string(),
        });
    }
    for binding in matches {
        println!("line {}: {} {} {}", binding.line, binding.kind, binding.keys, binding.command);
    }
    Ok(())
}

fn conflicts(app: &App) -> Result<(), CliError> {
    let (_, content) = read_i3_config(&app.store)?;
    let duplicated = find_conflicts(&content);
    if duplicated.is_empty() {
        println!("No conflicting keybindings.");
        return Ok(());
    }
    for (keys, bindings) in duplicated {
        println!("{keys}:");
        for binding in bindings {
            println!("  line {}: {}", binding.line, binding.command);
        }
    }
    Ok(())
}

fn profile_path(app: &App, name: &str) -> PathBuf {
    app.keybindings_dir().join(format!("{name}.conf"))
}

fn save_profile(app: &mut App, name: &str) -> Result<(), CliError> {
    let (_, content) = read_i3_config(&app.store)?;
    let bindings = extract_binding_lines(&content);
    if bindings.is_empty() {
        return Err(CliError::User(
            "no keybindings found in the i3 config".to_string(),
        ));
    }

    let path = profile_path(app, name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| I3cError::io(parent, err))?;
    }
    let mut rendered = bindings.join("\n");
    rendered.push('\n');
    fs::write(&path, rendered).map_err(|err| I3cError::io(&path, err))?;

    app.store.insert_profile(
        PROFILES_KEY,
        name,
        json!({
            "path": path.display().to_string(),
            "count": bindings.len(),
        }),
    );
    app.store.save();
    println!("Saved {} keybindings as profile '{name}'", bindings.len());
    Ok(())
}

fn load_profile(app: &mut App, name: &str) -> Result<(), CliError> {
    let registered = app
        .store
        .get_profile(PROFILES_KEY, name)
        .and_then(|profile| profile.get("path"))
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .ok_or_else(|| CliError::NotFound {
            kind: "keybinding profile",
            name: name.to_string(),
        })?;
    let saved = fs::read_to_string(&registered).map_err(|err| I3cError::io(&registered, err))?;
    let bindings: Vec<String> = saved
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let (path, content) = read_i3_config(&app.store)?;
    let updated = replace_bindings(&content, name, &bindings);
    write_i3_config(&path, &updated)?;
    println!("Loaded {} keybindings from profile '{name}'", bindings.len());
    println!("Reload i3 to apply (i3ctl config reload).");
    Ok(())
}

fn list_profiles(app: &App) -> Result<(), CliError> {
    let names = app.store.profile_names(PROFILES_KEY);
    if names.is_empty() {
        println!("No keybinding profiles saved.");
        return Ok(());
    }
    println!("Saved keybinding profiles:");
    for name in names {
        let count = app
            .store
            .get_profile(PROFILES_KEY, &name)
            .and_then(|profile| profile.get("count"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        println!("- {name} ({count} bindings)");
    }
    Ok(())
}

fn delete_profile(app: &mut App, name: &str) -> Result<(), CliError> {
    let Some(removed) = app.store.remove_profile(PROFILES_KEY, name) else {
        return Err(CliError::NotFound {
            kind: "keybinding profile",
            name: name.to_string(),
        });
    };
    app.store.save();

    // Best effort: the registry entry is authoritative, the file is cache.
    if let Some(path) = removed.get("path").and_then(Value::as_str) {
        if let Err(err) = fs::remove_file(path) {
            log::warn!("failed to remove profile file {path}: {err}");
        }
    }
    println!("Deleted keybinding profile '{name}'.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::ScriptedRunner;
    use crate::core::config::ConfigStore;
    use crate::exec::detect::ToolDetector;
    use tempfile::TempDir;

    const SAMPLE: &str = "set $mod Mod4\n\nbindsym $mod+Return exec i3-sensible-terminal\nbindsym $mod+d exec dmenu_run\n";

    fn app_over_config(content: &str) -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let i3_config = dir.path().join("i3config");
        fs::write(&i3_config, content).unwrap();

        let mut store = ConfigStore::open(Some(&dir.path().join("config.json")));
        store.set(
            "i3_config_path",
            json!(i3_config.display().to_string()),
        );
        let app = App::with_parts(
            Box::new(ScriptedRunner::new()),
            ToolDetector::with_probe(|_| true),
            store,
        )
        .with_data_dir(dir.path().join("data"));
        (app, dir)
    }

    fn i3_config_of(app: &App) -> String {
        let (_, content) = read_i3_config(&app.store).unwrap();
        content
    }

    #[test]
    fn add_then_remove_round_trips_the_config() {
        let (mut app, _dir) = app_over_config(SAMPLE);
        run(
            &mut app,
            &KeybindArgs {
                command: KeybindCommand::Add {
                    keys: "$mod+b".to_string(),
                    command: vec!["exec".to_string(), "firefox".to_string()],
                },
            },
        )
        .unwrap();
        assert!(i3_config_of(&app).contains("bindsym $mod+b exec firefox"));

        run(
            &mut app,
            &KeybindArgs {
                command: KeybindCommand::Remove {
                    keys: "$mod+b".to_string(),
                },
            },
        )
        .unwrap();
        assert!(!i3_config_of(&app).contains("$mod+b"));
    }

    #[test]
    fn removing_unknown_binding_is_not_found() {
        let (mut app, _dir) = app_over_config(SAMPLE);
        let err = run(
            &mut app,
            &KeybindArgs {
                command: KeybindCommand::Remove {
                    keys: "$mod+z".to_string(),
                },
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::NotFound { kind: "keybinding", .. }));
    }

    #[test]
    fn profile_save_load_delete_lifecycle() {
        let (mut app, dir) = app_over_config(SAMPLE);

        run(
            &mut app,
            &KeybindArgs {
                command: KeybindCommand::Save {
                    name: "default".to_string(),
                },
            },
        )
        .unwrap();
        assert_eq!(app.store.profile_names(PROFILES_KEY), vec!["default"]);

        // The backing file lands in the redirected data dir, not $HOME.
        let backing = PathBuf::from(
            app.store
                .get_profile(PROFILES_KEY, "default")
                .unwrap()
                .get("path")
                .and_then(Value::as_str)
                .unwrap(),
        );
        assert!(backing.starts_with(dir.path()));
        assert!(backing.exists());

        run(
            &mut app,
            &KeybindArgs {
                command: KeybindCommand::Load {
                    name: "default".to_string(),
                },
            },
        )
        .unwrap();
        assert!(i3_config_of(&app).contains("Keybindings from profile: default"));

        run(
            &mut app,
            &KeybindArgs {
                command: KeybindCommand::Delete {
                    name: "default".to_string(),
                },
            },
        )
        .unwrap();
        assert!(app.store.profile_names(PROFILES_KEY).is_empty());
        assert!(!backing.exists());
    }

    #[test]
    fn loading_missing_profile_is_not_found() {
        let (mut app, _dir) = app_over_config(SAMPLE);
        let err = run(
            &mut app,
            &KeybindArgs {
                command: KeybindCommand::Load {
                    name: "ghost".to_string(),
                },
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::NotFound {
                kind: "keybinding profile",
                ..
            }
        ));
    }
}
