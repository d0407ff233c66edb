//! Brightness handler.

use crate::backends::brightness::{BrightnessTool, parse_percent, percent_from_raw};
use crate::cli::{BrightnessArgs, BrightnessCommand, CliError};
use crate::commands::{App, check, clamp_percent};
use crate::exec::detect::Category;
use crate::exec::runner::RunOptions;

pub fn run(app: &mut App, args: &BrightnessArgs) -> Result<(), CliError> {
    let tool = resolve_tool(app, args.tool.as_deref())?;
    log::info!("using brightness tool: {}", tool.name());

    match &args.command {
        BrightnessCommand::Set { percent } => {
            let percent = clamp_percent(*percent);
            check(
                app.runner.run(&tool.set_argv(percent), RunOptions::default()),
                tool.name(),
            )?;
            report(app, tool)
        }
        BrightnessCommand::Up { step } => {
            check(
                app.runner.run(&tool.up_argv(*step), RunOptions::default()),
                tool.name(),
            )?;
            report(app, tool)
        }
        BrightnessCommand::Down { step } => {
            check(
                app.runner.run(&tool.down_argv(*step), RunOptions::default()),
                tool.name(),
            )?;
            report(app, tool)
        }
        BrightnessCommand::Get => report(app, tool),
    }
}

fn resolve_tool(app: &App, explicit: Option<&str>) -> Result<BrightnessTool, CliError> {
    if let Some(name) = explicit {
        return BrightnessTool::from_name(name)
            .ok_or_else(|| CliError::User(format!("unknown brightness tool: {name}")));
    }
    if let Some(configured) = app.store.get_str("brightness_tool").filter(|t| *t != "auto") {
        if let Some(tool) = BrightnessTool::from_name(configured) {
            if app.detector.is_available(tool.name()) {
                return Ok(tool);
            }
            log::warn!(
                "configured brightness tool {configured} is not installed, falling back to detection"
            );
        } else {
            log::warn!("unknown configured brightness tool {configured}, falling back to detection");
        }
    }
    app.detector.require(Category::Brightness)?;
    BrightnessTool::detect(&app.detector).ok_or(CliError::Backend(
        "brightness tool detection failed".to_string(),
    ))
}

fn report(app: &App, tool: BrightnessTool) -> Result<(), CliError> {
    let current = check(
        app.runner.run(&tool.get_argv(), RunOptions::default()),
        tool.name(),
    )?;

    // brightnessctl reports a raw device value and needs the max to scale.
    let percent = match tool.max_argv() {
        Some(max_query) => {
            let max = check(app.runner.run(&max_query, RunOptions::default()), tool.name())?;
            percent_from_raw(current.stdout_trimmed(), max.stdout_trimmed())
        }
        None => parse_percent(current.stdout_trimmed()),
    };

    match percent {
        Some(value) => println!("Brightness: {:.0}%", value.round()),
        None => println!("Brightness: {}", current.stdout_trimmed()),
    }
    Ok(())
}
