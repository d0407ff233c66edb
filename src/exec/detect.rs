//! PATH-based tool detection with per-capability preference ordering.

use std::fmt;

use crate::core::errors::{I3cError, Result};

/// Capability categories, each with an ordered candidate tool list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Volume,
    Brightness,
    Wallpaper,
    Network,
    Bluetooth,
    Power,
    Keyboard,
    WindowManager,
}

impl Category {
    /// Every category, for capability summaries.
    pub const ALL: [Self; 8] = [
        Self::Volume,
        Self::Brightness,
        Self::Wallpaper,
        Self::Network,
        Self::Bluetooth,
        Self::Power,
        Self::Keyboard,
        Self::WindowManager,
    ];

    /// Candidate executables in preference order. Earlier wins when
    /// resolution is left on auto.
    #[must_use]
    pub const fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Volume => &["pactl", "amixer"],
            Self::Brightness => &["xbacklight", "brightnessctl", "light"],
            Self::Wallpaper => &["feh", "nitrogen"],
            Self::Network => &["nmcli", "iwctl", "wpa_cli"],
            Self::Bluetooth => &["bluetoothctl", "blueman-manager"],
            Self::Power => &["systemctl", "shutdown"],
            Self::Keyboard => &["setxkbmap", "localectl"],
            Self::WindowManager => &["i3-msg"],
        }
    }

    /// Human label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Brightness => "brightness",
            Self::Wallpaper => "wallpaper",
            Self::Network => "network",
            Self::Bluetooth => "bluetooth",
            Self::Power => "power",
            Self::Keyboard => "keyboard layout",
            Self::WindowManager => "window manager",
        }
    }

    /// Install hint for the "nothing available" failure.
    #[must_use]
    pub const fn install_hint(self) -> &'static str {
        match self {
            Self::Volume => "pactl (pulseaudio-utils), amixer (alsa-utils)",
            Self::Brightness => "xbacklight, brightnessctl, light",
            Self::Wallpaper => "feh, nitrogen",
            Self::Network => "nmcli (NetworkManager), iwctl (iwd), wpa_cli",
            Self::Bluetooth => "bluetoothctl (bluez)",
            Self::Power => "systemctl (systemd)",
            Self::Keyboard => "setxkbmap (x11-xkb-utils)",
            Self::WindowManager => "i3-msg (i3)",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

type Probe = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Detects which backend tools exist on PATH. Detection itself never
/// fails; an all-unavailable category surfaces later as a clear
/// [`I3cError::ToolMissing`] from [`ToolDetector::require`].
pub struct ToolDetector {
    probe: Probe,
}

impl Default for ToolDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolDetector {
    /// Production detector probing PATH via `which`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_probe(|tool| which::which(tool).is_ok())
    }

    /// Detector with an injected probe, for tests and capability stubbing.
    #[must_use]
    pub fn with_probe(probe: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            probe: Box::new(probe),
        }
    }

    #[must_use]
    pub fn is_available(&self, tool: &str) -> bool {
        (self.probe)(tool)
    }

    /// Candidate tools for a category with their availability, preserving
    /// preference order.
    #[must_use]
    pub fn detect(&self, category: Category) -> Vec<(&'static str, bool)> {
        category
            .candidates()
            .iter()
            .map(|tool| (*tool, self.is_available(tool)))
            .collect()
    }

    /// First available candidate, honoring preference order.
    #[must_use]
    pub fn first_available(&self, category: Category) -> Option<&'static str> {
        category
            .candidates()
            .iter()
            .copied()
            .find(|tool| self.is_available(tool))
    }

    /// Like [`Self::first_available`] but with an actionable error when
    /// the category has no installed tool at all.
    pub fn require(&self, category: Category) -> Result<&'static str> {
        self.first_available(category)
            .ok_or_else(|| I3cError::ToolMissing {
                category: category.label(),
                hint: category.install_hint(),
            })
    }
}

impl fmt::Debug for ToolDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDetector").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_preserves_preference_order() {
        let detector = ToolDetector::with_probe(|_| true);
        let tools: Vec<&str> = detector
            .detect(Category::Brightness)
            .into_iter()
            .map(|(tool, _)| tool)
            .collect();
        assert_eq!(tools, vec!["xbacklight", "brightnessctl", "light"]);
    }

    #[test]
    fn first_available_skips_missing_tools() {
        let detector = ToolDetector::with_probe(|tool| tool == "brightnessctl");
        assert_eq!(
            detector.first_available(Category::Brightness),
            Some("brightnessctl")
        );
    }

    #[test]
    fn first_available_prefers_earlier_candidates() {
        let detector = ToolDetector::with_probe(|_| true);
        assert_eq!(detector.first_available(Category::Volume), Some("pactl"));
        assert_eq!(detector.first_available(Category::Network), Some("nmcli"));
    }

    #[test]
    fn require_reports_missing_category_with_hint() {
        let detector = ToolDetector::with_probe(|_| false);
        let err = detector.require(Category::Volume).unwrap_err();
        assert_eq!(err.code(), "I3C-2001");
        assert!(err.to_string().contains("alsa-utils"));
    }

    #[test]
    fn every_category_has_candidates_and_hint() {
        for category in Category::ALL {
            assert!(!category.candidates().is_empty(), "{category} has no candidates");
            assert!(!category.install_hint().is_empty());
        }
    }
}
