//! Brightness backend: `xbacklight`, `brightnessctl`, or `light`.

use crate::exec::detect::{Category, ToolDetector};
use crate::exec::runner::argv;

/// Supported brightness tools, in detection preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessTool {
    Xbacklight,
    Brightnessctl,
    Light,
}

impl BrightnessTool {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Xbacklight => "xbacklight",
            Self::Brightnessctl => "brightnessctl",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "xbacklight" => Some(Self::Xbacklight),
            "brightnessctl" => Some(Self::Brightnessctl),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    #[must_use]
    pub fn detect(detector: &ToolDetector) -> Option<Self> {
        detector
            .first_available(Category::Brightness)
            .and_then(Self::from_name)
    }

    #[must_use]
    pub fn set_argv(self, percent: u8) -> Vec<String> {
        match self {
            Self::Xbacklight => argv(&["xbacklight", "-set", &percent.to_string()]),
            Self::Brightnessctl => argv(&["brightnessctl", "set", &format!("{percent}%")]),
            Self::Light => argv(&["light", "-S", &percent.to_string()]),
        }
    }

    #[must_use]
    pub fn up_argv(self, step: u8) -> Vec<String> {
        match self {
            Self::Xbacklight => argv(&["xbacklight", "-inc", &step.to_string()]),
            Self::Brightnessctl => argv(&["brightnessctl", "set", &format!("{step}%+")]),
            Self::Light => argv(&["light", "-A", &step.to_string()]),
        }
    }

    #[must_use]
    pub fn down_argv(self, step: u8) -> Vec<String> {
        match self {
            Self::Xbacklight => argv(&["xbacklight", "-dec", &step.to_string()]),
            Self::Brightnessctl => argv(&["brightnessctl", "set", &format!("{step}%-")]),
            Self::Light => argv(&["light", "-U", &step.to_string()]),
        }
    }

    #[must_use]
    pub fn get_argv(self) -> Vec<String> {
        match self {
            Self::Xbacklight => argv(&["xbacklight", "-get"]),
            Self::Brightnessctl => argv(&["brightnessctl", "get"]),
            Self::Light => argv(&["light", "-G"]),
        }
    }

    /// Extra query needed to turn the raw reading into a percentage.
    /// Only `brightnessctl get` reports a raw device value.
    #[must_use]
    pub fn max_argv(self) -> Option<Vec<String>> {
        match self {
            Self::Brightnessctl => Some(argv(&["brightnessctl", "max"])),
            Self::Xbacklight | Self::Light => None,
        }
    }
}

/// Parse a percentage reading (`xbacklight`/`light` print a float).
#[must_use]
pub fn parse_percent(output: &str) -> Option<f64> {
    output.trim().parse::<f64>().ok()
}

/// Convert a raw `brightnessctl` reading into a percentage.
#[must_use]
pub fn percent_from_raw(current: &str, max: &str) -> Option<f64> {
    let current: f64 = current.trim().parse().ok()?;
    let max: f64 = max.trim().parse().ok()?;
    (max > 0.0).then(|| (current / max) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xbacklight_uses_dash_flags() {
        let tool = BrightnessTool::Xbacklight;
        assert_eq!(tool.set_argv(70), argv(&["xbacklight", "-set", "70"]));
        assert_eq!(tool.up_argv(5), argv(&["xbacklight", "-inc", "5"]));
        assert_eq!(tool.down_argv(5), argv(&["xbacklight", "-dec", "5"]));
        assert_eq!(tool.get_argv(), argv(&["xbacklight", "-get"]));
        assert!(tool.max_argv().is_none());
    }

    #[test]
    fn brightnessctl_uses_percent_suffixes() {
        let tool = BrightnessTool::Brightnessctl;
        assert_eq!(tool.set_argv(70), argv(&["brightnessctl", "set", "70%"]));
        assert_eq!(tool.up_argv(5), argv(&["brightnessctl", "set", "5%+"]));
        assert_eq!(tool.down_argv(5), argv(&["brightnessctl", "set", "5%-"]));
        assert!(tool.max_argv().is_some());
    }

    #[test]
    fn light_uses_single_letter_flags() {
        let tool = BrightnessTool::Light;
        assert_eq!(tool.set_argv(70), argv(&["light", "-S", "70"]));
        assert_eq!(tool.up_argv(5), argv(&["light", "-A", "5"]));
        assert_eq!(tool.down_argv(5), argv(&["light", "-U", "5"]));
    }

    #[test]
    fn detection_preference_order() {
        let all = ToolDetector::with_probe(|_| true);
        assert_eq!(BrightnessTool::detect(&all), Some(BrightnessTool::Xbacklight));
        let light_only = ToolDetector::with_probe(|tool| tool == "light");
        assert_eq!(BrightnessTool::detect(&light_only), Some(BrightnessTool::Light));
        let none = ToolDetector::with_probe(|_| false);
        assert_eq!(BrightnessTool::detect(&none), None);
    }

    #[test]
    fn parses_float_and_raw_readings() {
        assert_eq!(parse_percent("42.5\n"), Some(42.5));
        assert!(parse_percent("bogus").is_none());
        assert_eq!(percent_from_raw("600\n", "1200\n"), Some(50.0));
        assert!(percent_from_raw("600", "0").is_none());
    }
}
