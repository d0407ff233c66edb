//! Wallpaper handler.

use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use walkdir::WalkDir;

use crate::backends::wallpaper::{WallpaperTool, is_image_file};
use crate::cli::{CliError, WallpaperArgs};
use crate::commands::{App, check};
use crate::core::paths;
use crate::exec::detect::Category;
use crate::exec::runner::RunOptions;

const HISTORY_KEY: &str = "wallpaper_history";

pub fn run(app: &mut App, args: &WallpaperArgs) -> Result<(), CliError> {
    if args.list {
        return list(app);
    }
    if args.restore {
        return restore(app, args);
    }
    if let Some(dir) = &args.random {
        let dir = if dir.is_empty() {
            wallpaper_directory(app)
        } else {
            paths::expand_tilde(dir)
        };
        return random(app, args, &dir);
    }
    match &args.path {
        Some(path) => set(app, args, path.clone()),
        None => Err(CliError::User(
            "specify an image path, --list, --random, or --restore".to_string(),
        )),
    }
}

fn wallpaper_directory(app: &App) -> PathBuf {
    app.store
        .get_str("wallpaper_directory")
        .map_or_else(|| paths::home_dir().join("Pictures"), paths::expand_tilde)
}

fn resolve_tool(app: &App, explicit: Option<WallpaperTool>) -> Result<WallpaperTool, CliError> {
    if let Some(tool) = explicit {
        return Ok(tool);
    }
    if let Some(configured) = app.store.get_str("wallpaper_tool").filter(|t| *t != "auto") {
        if let Some(tool) = WallpaperTool::from_name(configured) {
            if app.detector.is_available(tool.name()) {
                return Ok(tool);
            }
            log::warn!(
                "configured wallpaper tool {configured} is not installed, falling back to detection"
            );
        } else {
            log::warn!("unknown configured wallpaper tool {configured}, falling back to detection");
        }
    }
    app.detector.require(Category::Wallpaper)?;
    WallpaperTool::detect(&app.detector).ok_or(CliError::Backend(
        "wallpaper tool detection failed".to_string(),
    ))
}

fn set(app: &mut App, args: &WallpaperArgs, path: PathBuf) -> Result<(), CliError> {
    let path = if path.is_absolute() {
        path
    } else {
        paths::expand_tilde(&path.to_string_lossy())
    };
    if !path.is_file() {
        return Err(CliError::User(format!("no such file: {}", path.display())));
    }
    if !is_image_file(&path) {
        return Err(CliError::User(format!(
            "not a recognized image file: {}",
            path.display()
        )));
    }

    let tool = resolve_tool(app, args.tool)?;
    log::info!("setting wallpaper {} via {}", path.display(), tool.name());
    check(
        app.runner.run(
            &tool.set_argv(&path.to_string_lossy(), args.mode),
            RunOptions::default(),
        ),
        tool.name(),
    )?;

    app.store.push_history(HISTORY_KEY, &path.to_string_lossy());
    app.store.save();
    println!("Wallpaper set: {}", paths::display_with_tilde(&path));
    Ok(())
}

fn restore(app: &mut App, args: &WallpaperArgs) -> Result<(), CliError> {
    let history = app.store.history(HISTORY_KEY);
    let Some(last) = history.first() else {
        return Err(CliError::NotFound {
            kind: "wallpaper history entry",
            name: "latest".to_string(),
        });
    };
    set(app, args, PathBuf::from(last))
}

fn random(app: &mut App, args: &WallpaperArgs, dir: &Path) -> Result<(), CliError> {
    let images = collect_images(dir);
    if images.is_empty() {
        return Err(CliError::User(format!(
            "no images found under {}",
            dir.display()
        )));
    }
    let picked = images
        .choose(&mut rand::rng())
        .cloned()
        .ok_or_else(|| CliError::Backend("random selection failed".to_string()))?;
    set(app, args, picked)
}

fn list(app: &App) -> Result<(), CliError> {
    let history = app.store.history(HISTORY_KEY);
    if history.is_empty() {
        println!("No wallpaper history.");
    } else {
        println!("Recent wallpapers:");
        for (index, entry) in history.iter().enumerate() {
            println!("{:2}. {entry}", index + 1);
        }
    }

    let dir = wallpaper_directory(app);
    let images = collect_images(&dir);
    println!();
    if images.is_empty() {
        println!("No images in {}", dir.display());
    } else {
        println!("Images in {}:", dir.display());
        for image in images {
            println!("- {}", paths::display_with_tilde(&image));
        }
    }
    Ok(())
}

fn collect_images(dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_image_file(path))
        .collect();
    images.sort();
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::wallpaper::WallpaperMode;
    use crate::commands::testing::ScriptedRunner;
    use crate::core::config::ConfigStore;
    use crate::exec::detect::ToolDetector;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn app_with_images(probe: fn(&str) -> bool) -> (App, TempDir, ScriptedRunnerHandle) {
        let dir = TempDir::new().unwrap();
        let pictures = dir.path().join("pics");
        fs::create_dir(&pictures).unwrap();
        fs::write(pictures.join("a.png"), b"x").unwrap();
        fs::write(pictures.join("b.jpg"), b"x").unwrap();
        fs::write(pictures.join("notes.txt"), b"x").unwrap();

        let mut store = ConfigStore::open(Some(&dir.path().join("config.json")));
        store.set(
            "wallpaper_directory",
            json!(pictures.display().to_string()),
        );
        let runner = ScriptedRunner::new();
        let calls = runner.call_log();
        let app = App::with_parts(Box::new(runner), ToolDetector::with_probe(probe), store);
        (app, dir, calls)
    }

    type ScriptedRunnerHandle = crate::commands::testing::CallLog;

    fn flat_args() -> WallpaperArgs {
        WallpaperArgs {
            path: None,
            list: false,
            random: None,
            restore: false,
            tool: None,
            mode: WallpaperMode::Fill,
        }
    }

    #[test]
    fn set_validates_extension_and_records_history() {
        let (mut app, dir, calls) = app_with_images(|t| t == "feh");
        let image = dir.path().join("pics/a.png");

        let mut args = flat_args();
        args.path = Some(image.clone());
        run(&mut app, &args).unwrap();

        let image_str = image.display().to_string();
        assert_eq!(
            calls.borrow()[0],
            crate::exec::runner::argv(&["feh", "--bg-fill", &image_str])
        );
        assert_eq!(
            app.store.history("wallpaper_history"),
            vec![image.display().to_string()]
        );
    }

    #[test]
    fn set_rejects_non_image_files() {
        let (mut app, dir, _calls) = app_with_images(|t| t == "feh");
        let mut args = flat_args();
        args.path = Some(dir.path().join("pics/notes.txt"));
        let err = run(&mut app, &args).unwrap_err();
        assert!(matches!(err, CliError::User(_)));
        assert!(app.store.history("wallpaper_history").is_empty());
    }

    #[test]
    fn set_rejects_missing_files() {
        let (mut app, dir, _calls) = app_with_images(|t| t == "feh");
        let mut args = flat_args();
        args.path = Some(dir.path().join("pics/ghost.png"));
        assert!(run(&mut app, &args).is_err());
    }

    #[test]
    fn random_picks_only_images_from_directory() {
        let (mut app, _dir, calls) = app_with_images(|t| t == "feh");
        let mut args = flat_args();
        args.random = Some(String::new());
        run(&mut app, &args).unwrap();

        let argv = &calls.borrow()[0];
        assert_eq!(argv[0], "feh");
        assert!(argv[2].ends_with(".png") || argv[2].ends_with(".jpg"));
    }

    #[test]
    fn restore_without_history_is_not_found() {
        let (mut app, _dir, _calls) = app_with_images(|t| t == "feh");
        let mut args = flat_args();
        args.restore = true;
        let err = run(&mut app, &args).unwrap_err();
        assert!(matches!(err, CliError::NotFound { .. }));
    }

    #[test]
    fn restore_replays_most_recent_entry() {
        let (mut app, dir, calls) = app_with_images(|t| t == "nitrogen");
        let image = dir.path().join("pics/b.jpg");
        app.store
            .push_history("wallpaper_history", &image.display().to_string());

        let mut args = flat_args();
        args.restore = true;
        run(&mut app, &args).unwrap();
        assert_eq!(calls.borrow()[0][0], "nitrogen");
        assert!(calls.borrow()[0].contains(&image.display().to_string()));
    }
}
