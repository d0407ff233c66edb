//! Network handler.

use crate::backends::network::{NetworkTool, wpa_add_network_argv, wpa_connect_sequence};
use crate::cli::{CliError, NetworkArgs, NetworkCommand};
use crate::commands::{App, check};
use crate::exec::detect::Category;
use crate::exec::runner::RunOptions;

pub fn run(app: &mut App, args: &NetworkArgs) -> Result<(), CliError> {
    let tool = resolve_tool(app, args.tool.as_deref())?;
    log::info!("using network tool: {}", tool.name());

    match &args.command {
        NetworkCommand::List { rescan, saved } => {
            if *rescan {
                let _ = app.runner.run(&tool.rescan_argv(), RunOptions::default());
            }
            let argv = if *saved { tool.saved_argv() } else { tool.list_argv() };
            let result = check(app.runner.run(&argv, RunOptions::default()), tool.name())?;
            if result.stdout_trimmed().is_empty() {
                println!("No networks found.");
            } else {
                println!("{}", result.stdout_trimmed());
            }
            Ok(())
        }
        NetworkCommand::Connect { ssid, password } => connect(app, tool, ssid, password.as_deref()),
        NetworkCommand::Disconnect => {
            check(
                app.runner.run(&tool.disconnect_argv(), RunOptions::default()),
                tool.name(),
            )?;
            println!("Disconnected.");
            Ok(())
        }
        NetworkCommand::Status => {
            let result = check(
                app.runner.run(&tool.status_argv(), RunOptions::default()),
                tool.name(),
            )?;
            println!("{}", result.stdout_trimmed());
            Ok(())
        }
        NetworkCommand::Wifi { state } => {
            check(
                app.runner
                    .run(&tool.wifi_argv(state.enabled()), RunOptions::default()),
                tool.name(),
            )?;
            println!(
                "Wifi turned {}.",
                if state.enabled() { "on" } else { "off" }
            );
            Ok(())
        }
        NetworkCommand::Rescan => {
            check(
                app.runner.run(&tool.rescan_argv(), RunOptions::default()),
                tool.name(),
            )?;
            println!("Rescan triggered.");
            Ok(())
        }
    }
}

fn resolve_tool(app: &App, explicit: Option<&str>) -> Result<NetworkTool, CliError> {
    if let Some(name) = explicit {
        return NetworkTool::from_name(name)
            .ok_or_else(|| CliError::User(format!("unknown network tool: {name}")));
    }
    app.detector.require(Category::Network)?;
    NetworkTool::detect(&app.detector).ok_or(CliError::Backend(
        "network tool detection failed".to_string(),
    ))
}

fn connect(
    app: &App,
    tool: NetworkTool,
    ssid: &str,
    password: Option<&str>,
) -> Result<(), CliError> {
    log::info!("connecting to {ssid} via {}", tool.name());

    if let Some(argv) = tool.connect_argv(ssid, password) {
        check(app.runner.run(&argv, RunOptions::default()), tool.name())?;
        println!("Connected to {ssid}.");
        return Ok(());
    }

    // wpa_cli has no single connect verb: register a network block,
    // configure it, enable it, persist.
    let Some(password) = password else {
        return Err(CliError::User(
            "wpa_cli connections require --password".to_string(),
        ));
    };
    let added = check(
        app.runner.run(&wpa_add_network_argv(), RunOptions::default()),
        tool.name(),
    )?;
    let network_id = added
        .stdout_trimmed()
        .lines()
        .last()
        .unwrap_or("")
        .trim()
        .to_string();
    if network_id.is_empty() || !network_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(CliError::Backend(format!(
            "wpa_cli add_network returned no network id: {}",
            added.stdout_trimmed()
        )));
    }
    for argv in wpa_connect_sequence(&network_id, ssid, password) {
        check(app.runner.run(&argv, RunOptions::default()), tool.name())?;
    }
    println!("Connected to {ssid}.");
    Ok(())
}
