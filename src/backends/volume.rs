//! Volume backend: PulseAudio (`pactl`) or ALSA (`amixer`).

use clap::ValueEnum;
use regex::Regex;

use crate::exec::detect::{Category, ToolDetector};
use crate::exec::runner::argv;

/// Mute switch positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MuteState {
    On,
    Off,
    #[default]
    Toggle,
}

/// Supported volume tools, in detection preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTool {
    PulseAudio,
    Alsa,
}

impl VolumeTool {
    /// Name used in the config document (`volume_tool`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PulseAudio => "pulseaudio",
            Self::Alsa => "alsa",
        }
    }

    #[must_use]
    pub const fn executable(self) -> &'static str {
        match self {
            Self::PulseAudio => "pactl",
            Self::Alsa => "amixer",
        }
    }

    /// Accepts both the config name and the executable name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pulseaudio" | "pactl" => Some(Self::PulseAudio),
            "alsa" | "amixer" => Some(Self::Alsa),
            _ => None,
        }
    }

    /// First installed tool, in preference order.
    #[must_use]
    pub fn detect(detector: &ToolDetector) -> Option<Self> {
        detector
            .first_available(Category::Volume)
            .and_then(Self::from_name)
    }

    /// Absolute set. `sink` is ignored by ALSA (it always drives Master).
    #[must_use]
    pub fn set_argv(self, sink: &str, percent: u8) -> Vec<String> {
        match self {
            Self::PulseAudio => argv(&["pactl", "set-sink-volume", sink, &format!("{percent}%")]),
            Self::Alsa => argv(&["amixer", "sset", "Master", &format!("{percent}%")]),
        }
    }

    /// Relative step up, delegated to the tool's own relative syntax.
    #[must_use]
    pub fn up_argv(self, sink: &str, step: u8) -> Vec<String> {
        match self {
            Self::PulseAudio => argv(&["pactl", "set-sink-volume", sink, &format!("+{step}%")]),
            Self::Alsa => argv(&["amixer", "sset", "Master", &format!("{step}%+")]),
        }
    }

    /// Relative step down.
    #[must_use]
    pub fn down_argv(self, sink: &str, step: u8) -> Vec<String> {
        match self {
            Self::PulseAudio => argv(&["pactl", "set-sink-volume", sink, &format!("-{step}%")]),
            Self::Alsa => argv(&["amixer", "sset", "Master", &format!("{step}%-")]),
        }
    }

    #[must_use]
    pub fn mute_argv(self, sink: &str, state: MuteState) -> Vec<String> {
        match self {
            Self::PulseAudio => {
                let arg = match state {
                    MuteState::On => "1",
                    MuteState::Off => "0",
                    MuteState::Toggle => "toggle",
                };
                argv(&["pactl", "set-sink-mute", sink, arg])
            }
            Self::Alsa => {
                let arg = match state {
                    MuteState::On => "mute",
                    MuteState::Off => "unmute",
                    MuteState::Toggle => "toggle",
                };
                argv(&["amixer", "sset", "Master", arg])
            }
        }
    }

    /// Query that reports the current level (and, for ALSA, mute state).
    #[must_use]
    pub fn get_argv(self, sink: &str) -> Vec<String> {
        match self {
            Self::PulseAudio => argv(&["pactl", "get-sink-volume", sink]),
            Self::Alsa => argv(&["amixer", "sget", "Master"]),
        }
    }

    /// Mute query; ALSA reports mute in the same `sget` output.
    #[must_use]
    pub fn mute_query_argv(self, sink: &str) -> Option<Vec<String>> {
        match self {
            Self::PulseAudio => Some(argv(&["pactl", "get-sink-mute", sink])),
            Self::Alsa => None,
        }
    }
}

/// Default-sink query for newer PulseAudio.
#[must_use]
pub fn default_sink_argv() -> Vec<String> {
    argv(&["pactl", "get-default-sink"])
}

/// Fallback default-sink query (`pactl info`) for older PulseAudio.
#[must_use]
pub fn pactl_info_argv() -> Vec<String> {
    argv(&["pactl", "info"])
}

/// Extract `Default Sink: <name>` from `pactl info` output.
#[must_use]
pub fn parse_default_sink(info_output: &str) -> Option<String> {
    info_output
        .lines()
        .find_map(|line| line.strip_prefix("Default Sink:"))
        .map(|sink| sink.trim().to_string())
        .filter(|sink| !sink.is_empty())
}

/// First `NN%` in tool output.
#[must_use]
pub fn parse_percent(output: &str) -> Option<u8> {
    let re = Regex::new(r"(\d+)%").expect("static pattern");
    re.captures(output)?
        .get(1)?
        .as_str()
        .parse::<u16>()
        .ok()
        .map(|value| u8::try_from(value.min(255)).unwrap_or(u8::MAX))
}

/// `pactl get-sink-mute` prints `Mute: yes|no`.
#[must_use]
pub fn parse_pactl_mute(output: &str) -> bool {
    output.to_lowercase().contains("yes")
}

/// `amixer sget` lines carry `[on]`/`[off]`; `[off]` means muted.
#[must_use]
pub fn parse_amixer_mute(output: &str) -> Option<bool> {
    let re = Regex::new(r"\[(on|off)\]").expect("static pattern");
    re.captures(output)
        .map(|caps| caps.get(1).is_some_and(|m| m.as_str() == "off"))
}
