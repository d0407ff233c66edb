//! Volume handler.

use crate::backends::volume::{
    VolumeTool, default_sink_argv, pactl_info_argv, parse_amixer_mute, parse_default_sink,
    parse_pactl_mute, parse_percent,
};
use crate::cli::{CliError, VolumeArgs, VolumeCommand};
use crate::commands::{App, check, clamp_percent};
use crate::exec::detect::Category;
use crate::exec::runner::RunOptions;

pub fn run(app: &mut App, args: &VolumeArgs) -> Result<(), CliError> {
    let tool = resolve_tool(app, args.tool.as_deref())?;
    log::info!("using volume tool: {}", tool.name());
    let sink = default_sink(app, tool);

    match &args.command {
        VolumeCommand::Set { percent } => {
            let percent = clamp_percent(*percent);
            check(
                app.runner.run(&tool.set_argv(&sink, percent), RunOptions::default()),
                tool.executable(),
            )?;
            report(app, tool, &sink)
        }
        VolumeCommand::Up { step } => {
            check(
                app.runner.run(&tool.up_argv(&sink, *step), RunOptions::default()),
                tool.executable(),
            )?;
            report(app, tool, &sink)
        }
        VolumeCommand::Down { step } => {
            check(
                app.runner.run(&tool.down_argv(&sink, *step), RunOptions::default()),
                tool.executable(),
            )?;
            report(app, tool, &sink)
        }
        VolumeCommand::Get => report(app, tool, &sink),
        VolumeCommand::Mute { state } => {
            check(
                app.runner.run(&tool.mute_argv(&sink, *state), RunOptions::default()),
                tool.executable(),
            )?;
            report(app, tool, &sink)
        }
    }
}

fn resolve_tool(app: &App, explicit: Option<&str>) -> Result<VolumeTool, CliError> {
    if let Some(name) = explicit {
        return VolumeTool::from_name(name)
            .ok_or_else(|| CliError::User(format!("unknown volume tool: {name}")));
    }
    if let Some(configured) = app.store.get_str("volume_tool").filter(|t| *t != "auto") {
        if let Some(tool) = VolumeTool::from_name(configured) {
            if app.detector.is_available(tool.executable()) {
                return Ok(tool);
            }
            log::warn!(
                "configured volume tool {configured} is not installed, falling back to detection"
            );
        } else {
            log::warn!("unknown configured volume tool {configured}, falling back to detection");
        }
    }
    app.detector.require(Category::Volume)?;
    VolumeTool::detect(&app.detector).ok_or(CliError::Backend(
        "volume tool detection failed".to_string(),
    ))
}

/// Resolve the PulseAudio default sink, falling back to the magic name
/// when neither query works. ALSA always drives Master.
fn default_sink(app: &App, tool: VolumeTool) -> String {
    if tool != VolumeTool::PulseAudio {
        return String::new();
    }
    let direct = app.runner.run(&default_sink_argv(), RunOptions::default());
    if direct.success() && !direct.stdout_trimmed().is_empty() {
        return direct.stdout_trimmed().to_string();
    }
    let info = app.runner.run(&pactl_info_argv(), RunOptions::default());
    if info.success() {
        if let Some(sink) = parse_default_sink(info.stdout_trimmed()) {
            return sink;
        }
    }
    "@DEFAULT_SINK@".to_string()
}

/// Print the current volume and mute state.
fn report(app: &App, tool: VolumeTool, sink: &str) -> Result<(), CliError> {
    let result = check(
        app.runner.run(&tool.get_argv(sink), RunOptions::default()),
        tool.executable(),
    )?;
    let output = result.stdout_trimmed();
    let volume = parse_percent(output);

    let muted = match tool.mute_query_argv(sink) {
        Some(query) => {
            let mute = app.runner.run(&query, RunOptions::default());
            mute.success().then(|| parse_pactl_mute(mute.stdout_trimmed()))
        }
        None => parse_amixer_mute(output),
    };

    match volume {
        Some(percent) => println!("Volume: {percent}%"),
        None => println!("Volume: {output}"),
    }
    if let Some(muted) = muted {
        println!("Muted: {}", if muted { "yes" } else { "no" });
    }
    Ok(())
}
