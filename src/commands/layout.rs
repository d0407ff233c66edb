//! Keyboard layout handler.

use serde_json::{Value, json};

use crate::backends::keyboard::{
    self, FALLBACK_LAYOUTS, XKB_RULES_FILE, XkbState, parse_query, parse_rules_layouts,
    rules_file_available,
};
use crate::cli::{CliError, LayoutArgs, LayoutCommand};
use crate::commands::{App, check};
use crate::exec::runner::RunOptions;

const PRESETS_KEY: &str = "layout_presets";
const CURRENT_KEY: &str = "current_layout";
const TOGGLE_KEY: &str = "toggle_layouts";

pub fn run(app: &mut App, args: &LayoutArgs) -> Result<(), CliError> {
    if !app.detector.is_available("setxkbmap") {
        return Err(CliError::Tool {
            category: "keyboard layout",
            hint: "setxkbmap (x11-xkb-utils)",
        });
    }

    match &args.command {
        LayoutCommand::Switch { layout, variant } => {
            switch(app, layout, variant.as_deref(), None)
        }
        LayoutCommand::List => list(app),
        LayoutCommand::Current => current(app),
        LayoutCommand::Save { name } => save_preset(app, name),
        LayoutCommand::Load { name } => load_preset(app, name),
        LayoutCommand::Delete { name } => delete_preset(app, name),
        LayoutCommand::Presets => list_presets(app),
        LayoutCommand::Toggle { layout1, layout2 } => {
            toggle(app, layout1.as_deref(), layout2.as_deref())
        }
    }
}

fn switch(
    app: &mut App,
    layout: &str,
    variant: Option<&str>,
    options: Option<&str>,
) -> Result<(), CliError> {
    log::info!("switching keyboard layout to {layout}");
    check(
        app.runner.run(
            &keyboard::switch_argv(layout, variant, options),
            RunOptions::default(),
        ),
        "setxkbmap",
    )?;

    app.store.set(
        CURRENT_KEY,
        json!({ "layout": layout, "variant": variant }),
    );
    app.store.save();

    match variant {
        Some(variant) => println!("Keyboard layout switched to {layout} (variant: {variant})"),
        None => println!("Keyboard layout switched to {layout}"),
    }
    Ok(())
}

fn list(app: &App) -> Result<(), CliError> {
    let result = app
        .runner
        .run(&keyboard::list_layouts_argv(), RunOptions::default());
    if result.success() && !result.stdout_trimmed().is_empty() {
        println!("Available keyboard layouts:");
        for layout in result.stdout_trimmed().lines() {
            println!("- {layout}");
        }
        return Ok(());
    }

    if rules_file_available() {
        if let Ok(rules) = std::fs::read_to_string(XKB_RULES_FILE) {
            let layouts = parse_rules_layouts(&rules);
            if !layouts.is_empty() {
                println!("Available keyboard layouts:");
                for (code, name) in layouts {
                    println!("{code}: {name}");
                }
                return Ok(());
            }
        }
    }

    println!("Could not enumerate layouts; common ones:");
    for (code, name) in FALLBACK_LAYOUTS {
        println!("{code}: {name}");
    }
    Ok(())
}

fn query_state(app: &App) -> Result<XkbState, CliError> {
    let result = check(
        app.runner.run(&keyboard::query_argv(), RunOptions::default()),
        "setxkbmap",
    )?;
    Ok(parse_query(result.stdout_trimmed()))
}

fn current(app: &App) -> Result<(), CliError> {
    let state = query_state(app)?;
    if let Some(layout) = &state.layout {
        match &state.variant {
            Some(variant) => println!("Current keyboard layout: {layout} (variant: {variant})"),
            None => println!("Current keyboard layout: {layout}"),
        }
        return Ok(());
    }

    // X query failed; the config remembers the last switch.
    if let Some(Value::Object(saved)) = app.store.get(CURRENT_KEY) {
        if let Some(layout) = saved.get("layout").and_then(Value::as_str) {
            println!("Current keyboard layout: {layout} (from config)");
            return Ok(());
        }
    }
    Err(CliError::Backend(
        "could not determine current keyboard layout".to_string(),
    ))
}

fn save_preset(app: &mut App, name: &str) -> Result<(), CliError> {
    let state = query_state(app)?;
    let Some(layout) = state.layout.clone() else {
        return Err(CliError::Backend(
            "could not determine current layout".to_string(),
        ));
    };
    let preset = serde_json::to_value(&state)
        .map_err(|err| CliError::Backend(format!("could not encode preset: {err}")))?;
    app.store.insert_profile(PRESETS_KEY, name, preset);
    app.store.save();
    println!("Layout preset '{name}' saved: {layout}");
    Ok(())
}

fn load_preset(app: &mut App, name: &str) -> Result<(), CliError> {
    let preset = app
        .store
        .get_profile(PRESETS_KEY, name)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            kind: "layout preset",
            name: name.to_string(),
        })?;
    let state: XkbState = serde_json::from_value(preset)
        .map_err(|_| CliError::Backend(format!("invalid layout preset: {name}")))?;
    let layout = state
        .layout
        .ok_or_else(|| CliError::Backend(format!("invalid layout preset: {name}")))?;
    switch(app, &layout, state.variant.as_deref(), state.options.as_deref())
}

fn delete_preset(app: &mut App, name: &str) -> Result<(), CliError> {
    if app.store.remove_profile(PRESETS_KEY, name).is_none() {
        return Err(CliError::NotFound {
            kind: "layout preset",
            name: name.to_string(),
        });
    }
    app.store.save();
    println!("Layout preset '{name}' deleted.");
    Ok(())
}

fn list_presets(app: &App) -> Result<(), CliError> {
    let names = app.store.profile_names(PRESETS_KEY);
    if names.is_empty() {
        println!("No layout presets saved.");
        return Ok(());
    }
    println!("Saved layout presets:");
    for name in names {
        let layout = app
            .store
            .get_profile(PRESETS_KEY, &name)
            .and_then(|preset| preset.get("layout"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        println!("- {name}: {layout}");
    }
    Ok(())
}

fn toggle(
    app: &mut App,
    layout1: Option<&str>,
    layout2: Option<&str>,
) -> Result<(), CliError> {
    let (first, second) = match (layout1, layout2) {
        (Some(a), Some(b)) => (a.to_string(), b.to_string()),
        _ => {
            let remembered = app.store.history(TOGGLE_KEY);
            if remembered.len() >= 2 {
                (remembered[0].clone(), remembered[1].clone())
            } else {
                (
                    layout1.unwrap_or("us").to_string(),
                    layout2.unwrap_or("de").to_string(),
                )
            }
        }
    };

    // Remember the pair for bare `layout toggle`.
    app.store.set(TOGGLE_KEY, json!([first, second]));

    let active = query_state(app)?.layout;
    let next = if active.as_deref() == Some(first.as_str()) {
        second
    } else {
        first
    };
    switch(app, &next, None, None)
}
