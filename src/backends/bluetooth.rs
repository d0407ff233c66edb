//! Bluetooth backend built on `bluetoothctl`.
//!
//! blueman installs no usable CLI, so when only `blueman-manager` is
//! present every operation still goes through `bluetoothctl` (and
//! `rfkill` for the radio switch when bluez is absent entirely).

use regex::Regex;

use crate::exec::detect::{Category, ToolDetector};
use crate::exec::runner::argv;

/// Default scan window, in seconds.
pub const DEFAULT_SCAN_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BluetoothTool {
    Bluetoothctl,
    Blueman,
}

impl BluetoothTool {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bluetoothctl => "bluetoothctl",
            Self::Blueman => "blueman",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bluetoothctl" => Some(Self::Bluetoothctl),
            "blueman" | "blueman-manager" => Some(Self::Blueman),
            _ => None,
        }
    }

    #[must_use]
    pub fn detect(detector: &ToolDetector) -> Option<Self> {
        detector
            .first_available(Category::Bluetooth)
            .and_then(Self::from_name)
    }
}

/// List devices; `paired_only` narrows to the paired set.
#[must_use]
pub fn list_argv(paired_only: bool) -> Vec<String> {
    if paired_only {
        argv(&["bluetoothctl", "paired-devices"])
    } else {
        argv(&["bluetoothctl", "devices"])
    }
}

#[must_use]
pub fn connect_argv(mac: &str) -> Vec<String> {
    argv(&["bluetoothctl", "connect", mac])
}

#[must_use]
pub fn disconnect_argv(mac: &str) -> Vec<String> {
    argv(&["bluetoothctl", "disconnect", mac])
}

#[must_use]
pub fn pair_argv(mac: &str) -> Vec<String> {
    argv(&["bluetoothctl", "pair", mac])
}

#[must_use]
pub fn remove_argv(mac: &str) -> Vec<String> {
    argv(&["bluetoothctl", "remove", mac])
}

#[must_use]
pub fn status_argv() -> Vec<String> {
    argv(&["bluetoothctl", "show"])
}

/// Radio switch; `via_rfkill` when bluez is not installed.
#[must_use]
pub fn power_argv(enable: bool, via_rfkill: bool) -> Vec<String> {
    if via_rfkill {
        argv(&["rfkill", if enable { "unblock" } else { "block" }, "bluetooth"])
    } else {
        argv(&["bluetoothctl", "power", if enable { "on" } else { "off" }])
    }
}

#[must_use]
pub fn scan_argv(enable: bool) -> Vec<String> {
    argv(&["bluetoothctl", "scan", if enable { "on" } else { "off" }])
}

/// Whether the argument already looks like a MAC address.
#[must_use]
pub fn is_mac_address(device: &str) -> bool {
    let re = Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("static pattern");
    re.is_match(device)
}

/// Resolve a device name to its MAC from `bluetoothctl devices` output.
///
/// Lines look like `Device AA:BB:CC:DD:EE:FF My Headphones`; the match
/// on the name part is case-insensitive substring, first hit wins.
#[must_use]
pub fn find_device_mac(devices_output: &str, name: &str) -> Option<String> {
    let needle = name.to_lowercase();
    devices_output
        .lines()
        .find(|line| line.to_lowercase().contains(&needle))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}

/// `bluetoothctl connect` can exit 0 and still report failure in stdout.
#[must_use]
pub fn reports_failure(stdout: &str, verb: &str) -> bool {
    stdout.contains(&format!("Failed to {verb}"))
}
