//! Network backend: NetworkManager (`nmcli`), iwd (`iwctl`), or
//! `wpa_cli`.
//!
//! iwd and wpa_supplicant have no radio switch of their own, so the
//! wifi on/off argv falls back to `rfkill` for those tools.

use crate::exec::detect::{Category, ToolDetector};
use crate::exec::runner::argv;

/// Wireless station device assumed for tools that need one named.
pub const DEFAULT_STATION: &str = "wlan0";

/// Supported network tools, in detection preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkTool {
    NetworkManager,
    Iwd,
    WpaSupplicant,
}

impl NetworkTool {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NetworkManager => "nmcli",
            Self::Iwd => "iwctl",
            Self::WpaSupplicant => "wpa_cli",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nmcli" => Some(Self::NetworkManager),
            "iwctl" => Some(Self::Iwd),
            "wpa_cli" => Some(Self::WpaSupplicant),
            _ => None,
        }
    }

    #[must_use]
    pub fn detect(detector: &ToolDetector) -> Option<Self> {
        detector
            .first_available(Category::Network)
            .and_then(Self::from_name)
    }

    /// Visible networks listing.
    #[must_use]
    pub fn list_argv(self) -> Vec<String> {
        match self {
            Self::NetworkManager => argv(&[
                "nmcli",
                "--colors",
                "no",
                "--fields",
                "IN-USE,BARS,SIGNAL,SECURITY,SSID",
                "device",
                "wifi",
                "list",
            ]),
            Self::Iwd => argv(&["iwctl", "station", DEFAULT_STATION, "get-networks"]),
            Self::WpaSupplicant => argv(&["wpa_cli", "scan_results"]),
        }
    }

    /// Saved/known connections listing.
    #[must_use]
    pub fn saved_argv(self) -> Vec<String> {
        match self {
            Self::NetworkManager => argv(&["nmcli", "connection", "show"]),
            Self::Iwd => argv(&["iwctl", "known-networks", "list"]),
            Self::WpaSupplicant => argv(&["wpa_cli", "list_networks"]),
        }
    }

    /// Single-shot connect argv. `None` for wpa_cli, whose connect flow
    /// is a command sequence (see [`wpa_connect_sequence`]).
    #[must_use]
    pub fn connect_argv(self, ssid: &str, password: Option<&str>) -> Option<Vec<String>> {
        match self {
            Self::NetworkManager => Some(password.map_or_else(
                || argv(&["nmcli", "device", "wifi", "connect", ssid]),
                |pass| argv(&["nmcli", "device", "wifi", "connect", ssid, "password", pass]),
            )),
            Self::Iwd => Some(password.map_or_else(
                || argv(&["iwctl", "station", DEFAULT_STATION, "connect", ssid]),
                |pass| {
                    argv(&[
                        "iwctl",
                        "station",
                        DEFAULT_STATION,
                        "connect",
                        ssid,
                        "--passphrase",
                        pass,
                    ])
                },
            )),
            Self::WpaSupplicant => None,
        }
    }

    #[must_use]
    pub fn disconnect_argv(self) -> Vec<String> {
        match self {
            Self::NetworkManager => argv(&["nmcli", "device", "disconnect", DEFAULT_STATION]),
            Self::Iwd => argv(&["iwctl", "station", DEFAULT_STATION, "disconnect"]),
            Self::WpaSupplicant => argv(&["wpa_cli", "disconnect"]),
        }
    }

    #[must_use]
    pub fn status_argv(self) -> Vec<String> {
        match self {
            Self::NetworkManager => argv(&["nmcli", "device", "status"]),
            Self::Iwd => argv(&["iwctl", "station", DEFAULT_STATION, "show"]),
            Self::WpaSupplicant => argv(&["wpa_cli", "status"]),
        }
    }

    /// Radio on/off; rfkill for tools without their own switch.
    #[must_use]
    pub fn wifi_argv(self, enable: bool) -> Vec<String> {
        match self {
            Self::NetworkManager => {
                argv(&["nmcli", "radio", "wifi", if enable { "on" } else { "off" }])
            }
            Self::Iwd | Self::WpaSupplicant => {
                argv(&["rfkill", if enable { "unblock" } else { "block" }, "wifi"])
            }
        }
    }

    #[must_use]
    pub fn rescan_argv(self) -> Vec<String> {
        match self {
            Self::NetworkManager => argv(&["nmcli", "device", "wifi", "rescan"]),
            Self::Iwd => argv(&["iwctl", "station", DEFAULT_STATION, "scan"]),
            Self::WpaSupplicant => argv(&["wpa_cli", "scan"]),
        }
    }
}

/// The wpa_cli connect sequence for a network id obtained from
/// `wpa_cli add_network`: set ssid and psk, enable, persist.
#[must_use]
pub fn wpa_connect_sequence(network_id: &str, ssid: &str, password: &str) -> Vec<Vec<String>> {
    vec![
        argv(&[
            "wpa_cli",
            "set_network",
            network_id,
            "ssid",
            &format!("\"{ssid}\""),
        ]),
        argv(&[
            "wpa_cli",
            "set_network",
            network_id,
            "psk",
            &format!("\"{password}\""),
        ]),
        argv(&["wpa_cli", "enable_network", network_id]),
        argv(&["wpa_cli", "save_config"]),
    ]
}

/// `wpa_cli add_network` argv; its stdout is the new network id.
#[must_use]
pub fn wpa_add_network_argv() -> Vec<String> {
    argv(&["wpa_cli", "add_network"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_preference_order() {
        let all = ToolDetector::with_probe(|_| true);
        assert_eq!(NetworkTool::detect(&all), Some(NetworkTool::NetworkManager));
        let iwd = ToolDetector::with_probe(|t| t == "iwctl");
        assert_eq!(NetworkTool::detect(&iwd), Some(NetworkTool::Iwd));
    }

    #[test]
    fn nmcli_connect_with_and_without_password() {
        let tool = NetworkTool::NetworkManager;
        assert_eq!(
            tool.connect_argv("home", None).unwrap(),
            argv(&["nmcli", "device", "wifi", "connect", "home"])
        );
        assert_eq!(
            tool.connect_argv("home", Some("s3cret")).unwrap(),
            argv(&["nmcli", "device", "wifi", "connect", "home", "password", "s3cret"])
        );
    }

    #[test]
    fn iwctl_passphrase_flag() {
        let cmd = NetworkTool::Iwd.connect_argv("home", Some("s3cret")).unwrap();
        assert_eq!(cmd[cmd.len() - 2], "--passphrase");
        assert_eq!(cmd[cmd.len() - 1], "s3cret");
    }

    #[test]
    fn wpa_cli_connect_is_a_sequence() {
        assert!(NetworkTool::WpaSupplicant.connect_argv("x", Some("y")).is_none());
        let seq = wpa_connect_sequence("0", "home", "s3cret");
        assert_eq!(seq.len(), 4);
        assert_eq!(seq[0][4], "\"home\"");
        assert_eq!(seq[1][4], "\"s3cret\"");
        assert_eq!(seq[3], argv(&["wpa_cli", "save_config"]));
    }

    #[test]
    fn radio_switch_falls_back_to_rfkill() {
        assert_eq!(
            NetworkTool::NetworkManager.wifi_argv(true),
            argv(&["nmcli", "radio", "wifi", "on"])
        );
        assert_eq!(
            NetworkTool::Iwd.wifi_argv(false),
            argv(&["rfkill", "block", "wifi"])
        );
        assert_eq!(
            NetworkTool::WpaSupplicant.wifi_argv(true),
            argv(&["rfkill", "unblock", "wifi"])
        );
    }

    #[test]
    fn nmcli_list_disables_colors_for_parsing() {
        let cmd = NetworkTool::NetworkManager.list_argv();
        assert!(cmd.contains(&"--colors".to_string()));
        assert!(cmd.contains(&"no".to_string()));
    }
}
