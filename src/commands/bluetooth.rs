//! Bluetooth handler.
//!
//! All device operations resolve a MAC first: names are looked up in
//! `bluetoothctl devices`, and anything already MAC-shaped passes
//! through untouched.

use std::thread;
use std::time::Duration;

use crate::backends::bluetooth::{
    self, BluetoothTool, find_device_mac, is_mac_address, reports_failure,
};
use crate::cli::{BluetoothArgs, BluetoothCommand, CliError};
use crate::commands::{App, check};
use crate::exec::detect::Category;
use crate::exec::runner::RunOptions;

/// Bluetooth connections are slow to establish.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

pub fn run(app: &mut App, args: &BluetoothArgs) -> Result<(), CliError> {
    let tool = resolve_tool(app)?;
    log::info!("using bluetooth tool: {}", tool.name());
    let bluez = app.detector.is_available("bluetoothctl");
    if !bluez {
        // Without bluez only the rfkill radio switch is scriptable.
        if !matches!(args.command, BluetoothCommand::Power { .. }) {
            return Err(CliError::Backend(
                "blueman has no scriptable CLI; install bluez (bluetoothctl)".to_string(),
            ));
        }
    }

    match &args.command {
        BluetoothCommand::List { scan, paired } => {
            if *scan {
                scan_window(app, 5)?;
            }
            let result = check(
                app.runner
                    .run(&bluetooth::list_argv(*paired), RunOptions::default()),
                "bluetoothctl",
            )?;
            if result.stdout_trimmed().is_empty() {
                println!("No devices found.");
            } else {
                println!("{}", result.stdout_trimmed());
            }
            Ok(())
        }
        BluetoothCommand::Connect { device } => {
            let mac = resolve_mac(app, device);
            let result = check(
                app.runner.run(
                    &bluetooth::connect_argv(&mac),
                    RunOptions::with_timeout(CONNECT_TIMEOUT),
                ),
                "bluetoothctl",
            )?;
            if reports_failure(result.stdout_trimmed(), "connect") {
                return Err(CliError::Backend(result.stdout_trimmed().to_string()));
            }
            println!("Connected to {mac}.");
            Ok(())
        }
        BluetoothCommand::Disconnect { device } => {
            let mac = resolve_mac(app, device);
            let result = check(
                app.runner
                    .run(&bluetooth::disconnect_argv(&mac), RunOptions::default()),
                "bluetoothctl",
            )?;
            if reports_failure(result.stdout_trimmed(), "disconnect") {
                return Err(CliError::Backend(result.stdout_trimmed().to_string()));
            }
            println!("Disconnected from {mac}.");
            Ok(())
        }
        BluetoothCommand::Pair { device } => {
            let mac = resolve_mac(app, device);
            println!("Pairing with {mac}; confirm on both devices if prompted.");
            // Interactive: pairing may prompt for a PIN on the terminal.
            check(
                app.runner
                    .run(&bluetooth::pair_argv(&mac), RunOptions::passthrough()),
                "bluetoothctl",
            )?;
            Ok(())
        }
        BluetoothCommand::Remove { device } => {
            let mac = resolve_mac(app, device);
            let result = check(
                app.runner
                    .run(&bluetooth::remove_argv(&mac), RunOptions::default()),
                "bluetoothctl",
            )?;
            if reports_failure(result.stdout_trimmed(), "remove") {
                return Err(CliError::Backend(result.stdout_trimmed().to_string()));
            }
            println!("Removed {mac}.");
            Ok(())
        }
        BluetoothCommand::Status => {
            let show = check(
                app.runner
                    .run(&bluetooth::status_argv(), RunOptions::default()),
                "bluetoothctl",
            )?;
            println!("{}", show.stdout_trimmed());
            let paired = app
                .runner
                .run(&bluetooth::list_argv(true), RunOptions::default());
            if paired.success() && !paired.stdout_trimmed().is_empty() {
                println!("\nPaired devices:\n{}", paired.stdout_trimmed());
            }
            Ok(())
        }
        BluetoothCommand::Power { state } => {
            check(
                app.runner.run(
                    &bluetooth::power_argv(state.enabled(), !bluez),
                    RunOptions::default(),
                ),
                "bluetooth power",
            )?;
            println!(
                "Bluetooth turned {}.",
                if state.enabled() { "on" } else { "off" }
            );
            Ok(())
        }
        BluetoothCommand::Scan {
            timeout,
            continuous,
        } => {
            if *continuous {
                println!("Scanning; press Ctrl+C to stop.");
                check(
                    app.runner
                        .run(&bluetooth::scan_argv(true), RunOptions::passthrough()),
                    "bluetoothctl",
                )?;
                let _ = app
                    .runner
                    .run(&bluetooth::scan_argv(false), RunOptions::default());
                Ok(())
            } else {
                scan_window(app, *timeout)
            }
        }
    }
}

fn resolve_tool(app: &App) -> Result<BluetoothTool, CliError> {
    app.detector.require(Category::Bluetooth)?;
    BluetoothTool::detect(&app.detector).ok_or(CliError::Backend(
        "bluetooth tool detection failed".to_string(),
    ))
}

fn resolve_mac(app: &App, device: &str) -> String {
    if is_mac_address(device) {
        return device.to_string();
    }
    let listed = app
        .runner
        .run(&bluetooth::list_argv(false), RunOptions::default());
    if listed.success() {
        if let Some(mac) = find_device_mac(listed.stdout_trimmed(), device) {
            return mac;
        }
    }
    log::warn!("could not resolve {device} to a MAC, passing it through");
    device.to_string()
}

/// Timed scan: start discovery, wait, stop.
fn scan_window(app: &App, seconds: u64) -> Result<(), CliError> {
    println!("Scanning for {seconds} seconds...");
    check(
        app.runner
            .run(&bluetooth::scan_argv(true), RunOptions::default()),
        "bluetoothctl",
    )?;
    thread::sleep(Duration::from_secs(seconds));
    let _ = app
        .runner
        .run(&bluetooth::scan_argv(false), RunOptions::default());
    println!("Scan complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::ScriptedRunner;
    use crate::core::config::ConfigStore;
    use crate::exec::detect::ToolDetector;
    use crate::exec::runner::{ExecResult, argv};
    use tempfile::TempDir;

    fn app_with(runner: ScriptedRunner, probe: fn(&str) -> bool) -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::open(Some(&dir.path().join("config.json")));
        (
            App::with_parts(Box::new(runner), ToolDetector::with_probe(probe), store),
            dir,
        )
    }

    #[test]
    fn connect_resolves_name_to_mac() {
        let runner = ScriptedRunner::new();
        runner.push_stdout("Device AA:BB:CC:DD:EE:FF Headphones\n"); // devices
        runner.push_stdout("Connection successful\n"); // connect
        let calls = runner.call_log();
        let (mut app, _dir) = app_with(runner, |t| t == "bluetoothctl");
        let args = BluetoothArgs {
            command: BluetoothCommand::Connect {
                device: "Headphones".to_string(),
            },
        };
        run(&mut app, &args).unwrap();
        assert_eq!(
            calls.borrow()[1],
            argv(&["bluetoothctl", "connect", "AA:BB:CC:DD:EE:FF"])
        );
    }

    #[test]
    fn connect_surfaces_stdout_failure_despite_exit_zero() {
        let runner = ScriptedRunner::new();
        runner.push_stdout("Failed to connect: org.bluez.Error.Failed\n");
        let (mut app, _dir) = app_with(runner, |t| t == "bluetoothctl");
        let args = BluetoothArgs {
            command: BluetoothCommand::Connect {
                device: "AA:BB:CC:DD:EE:FF".to_string(),
            },
        };
        let err = run(&mut app, &args).unwrap_err();
        assert!(err.to_string().contains("Failed to connect"));
    }

    #[test]
    fn blueman_only_rejects_device_operations() {
        let (mut app, _dir) = app_with(ScriptedRunner::new(), |t| t == "blueman-manager");
        let args = BluetoothArgs {
            command: BluetoothCommand::Status,
        };
        let err = run(&mut app, &args).unwrap_err();
        assert!(err.to_string().contains("bluez"));
    }

    #[test]
    fn blueman_only_power_goes_through_rfkill() {
        let runner = ScriptedRunner::new();
        let calls = runner.call_log();
        let (mut app, _dir) = app_with(runner, |t| t == "blueman-manager");
        let args = BluetoothArgs {
            command: BluetoothCommand::Power {
                state: crate::cli::Switch::Off,
            },
        };
        run(&mut app, &args).unwrap();
        assert_eq!(calls.borrow()[0], argv(&["rfkill", "block", "bluetooth"]));
    }

    #[test]
    fn remove_propagates_backend_failure() {
        let runner = ScriptedRunner::new();
        runner.push_result(ExecResult {
            code: 1,
            stdout: Some(String::new()),
            stderr: Some("Device not available".to_string()),
        });
        let (mut app, _dir) = app_with(runner, |t| t == "bluetoothctl");
        let args = BluetoothArgs {
            command: BluetoothCommand::Remove {
                device: "AA:BB:CC:DD:EE:FF".to_string(),
            },
        };
        let err = run(&mut app, &args).unwrap_err();
        assert!(err.to_string().contains("Device not available"));
    }
}
