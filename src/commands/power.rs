//! Power handler.

use std::path::Path;

use crate::backends::power::{
    self, PowerAction, battery_status, cpu_info, lock_argv, parse_scheduled_shutdown,
    shutdown_time,
};
use crate::cli::{CliError, PowerArgs, PowerCommand};
use crate::commands::{App, check, confirm};
use crate::exec::runner::RunOptions;

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";
const CPUFREQ_DIR: &str = "/sys/devices/system/cpu/cpu0/cpufreq";

pub fn run(app: &mut App, args: &PowerArgs) -> Result<(), CliError> {
    match &args.command {
        PowerCommand::Off { now, time } => {
            if *time > 0 {
                return schedule(app, *time);
            }
            transition(app, PowerAction::PowerOff, *now)
        }
        PowerCommand::Reboot { now } => transition(app, PowerAction::Reboot, *now),
        PowerCommand::Suspend { now } => transition(app, PowerAction::Suspend, *now),
        PowerCommand::Hibernate { now } => transition(app, PowerAction::Hibernate, *now),
        PowerCommand::HybridSleep { now } => transition(app, PowerAction::HybridSleep, *now),
        PowerCommand::Lock => lock(app),
        PowerCommand::Status => status(app),
        PowerCommand::Cancel => {
            check(
                app.runner.run(&power::cancel_argv(), RunOptions::default()),
                "shutdown",
            )?;
            println!("Scheduled power off cancelled.");
            Ok(())
        }
    }
}

fn transition(app: &App, action: PowerAction, now: bool) -> Result<(), CliError> {
    if !now && !confirm(&format!("Really {} the system?", action.label())) {
        println!("Cancelled.");
        return Ok(());
    }
    log::info!("power transition: {}", action.label());
    check(
        app.runner
            .run(&action.argv_for(&app.detector), RunOptions::default()),
        action.label(),
    )?;
    Ok(())
}

fn schedule(app: &App, minutes: u32) -> Result<(), CliError> {
    check(
        app.runner
            .run(&power::schedule_argv(minutes), RunOptions::default()),
        "shutdown",
    )?;
    println!("System will power off at {}.", shutdown_time(minutes));
    println!("Run 'i3ctl power cancel' to cancel.");
    Ok(())
}

fn lock(app: &App) -> Result<(), CliError> {
    let Some(argv) = lock_argv(&app.detector) else {
        return Err(CliError::Tool {
            category: "screen lock",
            hint: "i3lock, xscreensaver, gnome-screensaver, loginctl",
        });
    };
    log::info!("locking screen via {}", argv[0]);
    check(app.runner.run(&argv, RunOptions::default()), "screen lock")?;
    Ok(())
}

fn status(app: &App) -> Result<(), CliError> {
    println!("Power status:");

    match battery_status(Path::new(POWER_SUPPLY_DIR)) {
        Some(battery) => println!("  Battery: {}% ({})", battery.capacity, battery.state),
        None => println!("  Battery: not found"),
    }

    let shown = app
        .runner
        .run(&power::show_schedule_argv(), RunOptions::default());
    let schedule = parse_scheduled_shutdown(shown.stderr_trimmed())
        .or_else(|| parse_scheduled_shutdown(shown.stdout_trimmed()));
    match schedule {
        Some(when) => println!("  Scheduled shutdown: {when}"),
        None => println!("  Scheduled shutdown: none"),
    }

    match cpu_info(Path::new(CPUFREQ_DIR)) {
        Some((governor, mhz)) => {
            println!("  CPU governor: {governor}");
            println!("  CPU frequency: {mhz} MHz");
        }
        None => println!("  CPU governor: unknown"),
    }
    Ok(())
}
