//! Power backend: `systemctl` with a sudo `shutdown`/`pm-utils`
//! fallback, plus screen locking and battery/CPU status read from
//! sysfs.

use std::fs;
use std::path::Path;

use chrono::{Duration, Local};

use crate::exec::detect::{Category, ToolDetector};
use crate::exec::runner::argv;

/// Screen lockers tried in preference order.
pub const LOCK_CANDIDATES: &[&[&str]] = &[
    &["i3lock"],
    &["xscreensaver-command", "-lock"],
    &["gnome-screensaver-command", "--lock"],
    &["loginctl", "lock-session"],
    &["xdg-screensaver", "lock"],
];

/// Power state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    PowerOff,
    Reboot,
    Suspend,
    Hibernate,
    HybridSleep,
}

impl PowerAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PowerOff => "power off",
            Self::Reboot => "reboot",
            Self::Suspend => "suspend",
            Self::Hibernate => "hibernate",
            Self::HybridSleep => "hybrid sleep",
        }
    }

    /// systemd path.
    #[must_use]
    pub fn systemctl_argv(self) -> Vec<String> {
        let verb = match self {
            Self::PowerOff => "poweroff",
            Self::Reboot => "reboot",
            Self::Suspend => "suspend",
            Self::Hibernate => "hibernate",
            Self::HybridSleep => "hybrid-sleep",
        };
        argv(&["systemctl", verb])
    }

    /// Non-systemd fallback (sudo shutdown / pm-utils).
    #[must_use]
    pub fn fallback_argv(self) -> Vec<String> {
        match self {
            Self::PowerOff => argv(&["sudo", "shutdown", "-h", "now"]),
            Self::Reboot => argv(&["sudo", "shutdown", "-r", "now"]),
            Self::Suspend => argv(&["sudo", "pm-suspend"]),
            Self::Hibernate => argv(&["sudo", "pm-hibernate"]),
            Self::HybridSleep => argv(&["sudo", "pm-suspend-hybrid"]),
        }
    }

    /// Pick the command for whatever is installed.
    #[must_use]
    pub fn argv_for(self, detector: &ToolDetector) -> Vec<String> {
        if detector.first_available(Category::Power) == Some("systemctl") {
            self.systemctl_argv()
        } else {
            self.fallback_argv()
        }
    }
}

/// `shutdown -h +N` schedule.
#[must_use]
pub fn schedule_argv(minutes: u32) -> Vec<String> {
    argv(&["sudo", "shutdown", "-h", &format!("+{minutes}")])
}

#[must_use]
pub fn cancel_argv() -> Vec<String> {
    argv(&["sudo", "shutdown", "-c"])
}

/// `shutdown --show` prints any pending schedule on stderr.
#[must_use]
pub fn show_schedule_argv() -> Vec<String> {
    argv(&["shutdown", "--show"])
}

/// Wall-clock time a shutdown scheduled `minutes` from now will fire.
#[must_use]
pub fn shutdown_time(minutes: u32) -> String {
    (Local::now() + Duration::minutes(i64::from(minutes)))
        .format("%H:%M")
        .to_string()
}

/// First installed locker from [`LOCK_CANDIDATES`].
#[must_use]
pub fn lock_argv(detector: &ToolDetector) -> Option<Vec<String>> {
    LOCK_CANDIDATES
        .iter()
        .find(|cmd| detector.is_available(cmd[0]))
        .map(|cmd| argv(cmd))
}

/// Battery reading from `/sys/class/power_supply/BAT{0,1}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryStatus {
    pub capacity: u8,
    pub state: String,
}

/// Read battery status from a sysfs root (`/sys/class/power_supply`).
#[must_use]
pub fn battery_status(sysfs_root: &Path) -> Option<BatteryStatus> {
    let battery = ["BAT0", "BAT1"]
        .iter()
        .map(|name| sysfs_root.join(name))
        .find(|path| path.exists())?;
    let state = fs::read_to_string(battery.join("status")).ok()?.trim().to_string();
    let capacity = fs::read_to_string(battery.join("capacity"))
        .ok()?
        .trim()
        .parse::<u8>()
        .ok()?;
    Some(BatteryStatus { capacity, state })
}

/// CPU governor and frequency from a cpufreq sysfs directory.
#[must_use]
pub fn cpu_info(cpufreq_dir: &Path) -> Option<(String, u64)> {
    let governor = fs::read_to_string(cpufreq_dir.join("scaling_governor"))
        .ok()?
        .trim()
        .to_string();
    let khz = fs::read_to_string(cpufreq_dir.join("scaling_cur_freq"))
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;
    Some((governor, khz / 1000))
}

/// Pull the scheduled time out of `shutdown -c` stderr chatter.
#[must_use]
pub fn parse_scheduled_shutdown(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .find_map(|line| line.split_once("Shutdown scheduled for "))
        .map(|(_, rest)| rest.trim().to_string())
}
