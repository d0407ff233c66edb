//! Wallpaper backend: `feh` or `nitrogen`.

use std::path::Path;

use clap::ValueEnum;

use crate::exec::detect::{Category, ToolDetector};
use crate::exec::runner::argv;

/// File extensions accepted as wallpapers.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "svg",
];

/// Scaling modes, mapped per tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WallpaperMode {
    #[default]
    Fill,
    Center,
    Tile,
    Scale,
    Max,
}

/// Supported wallpaper tools, in detection preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WallpaperTool {
    Feh,
    Nitrogen,
}

impl WallpaperTool {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Feh => "feh",
            Self::Nitrogen => "nitrogen",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "feh" => Some(Self::Feh),
            "nitrogen" => Some(Self::Nitrogen),
            _ => None,
        }
    }

    #[must_use]
    pub fn detect(detector: &ToolDetector) -> Option<Self> {
        detector
            .first_available(Category::Wallpaper)
            .and_then(Self::from_name)
    }

    /// Set a wallpaper. Nitrogen saves its restore state (`--save`).
    #[must_use]
    pub fn set_argv(self, path: &str, mode: WallpaperMode) -> Vec<String> {
        match self {
            Self::Feh => {
                let flag = match mode {
                    WallpaperMode::Fill => "--bg-fill",
                    WallpaperMode::Center => "--bg-center",
                    WallpaperMode::Tile => "--bg-tile",
                    WallpaperMode::Scale => "--bg-scale",
                    WallpaperMode::Max => "--bg-max",
                };
                argv(&["feh", flag, path])
            }
            Self::Nitrogen => {
                let flag = match mode {
                    WallpaperMode::Fill => "--set-zoom-fill",
                    WallpaperMode::Center => "--set-centered",
                    WallpaperMode::Tile => "--set-tiled",
                    WallpaperMode::Scale => "--set-scaled",
                    WallpaperMode::Max => "--set-zoomed",
                };
                argv(&["nitrogen", flag, "--save", path])
            }
        }
    }
}

/// Whether the path has a recognized image extension.
#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feh_mode_mapping() {
        let tool = WallpaperTool::Feh;
        assert_eq!(
            tool.set_argv("/tmp/w.png", WallpaperMode::Fill),
            argv(&["feh", "--bg-fill", "/tmp/w.png"])
        );
        assert_eq!(tool.set_argv("/tmp/w.png", WallpaperMode::Max)[1], "--bg-max");
    }

    #[test]
    fn nitrogen_always_saves_restore_state() {
        let tool = WallpaperTool::Nitrogen;
        assert_eq!(
            tool.set_argv("/tmp/w.png", WallpaperMode::Center),
            argv(&["nitrogen", "--set-centered", "--save", "/tmp/w.png"])
        );
        assert_eq!(
            tool.set_argv("/tmp/w.png", WallpaperMode::Fill)[1],
            "--set-zoom-fill"
        );
    }

    #[test]
    fn image_extension_check_is_case_insensitive() {
        assert!(is_image_file(Path::new("/tmp/wall.PNG")));
        assert!(is_image_file(Path::new("shot.jpeg")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("noext")));
    }

    #[test]
    fn detection_prefers_feh() {
        let all = ToolDetector::with_probe(|_| true);
        assert_eq!(WallpaperTool::detect(&all), Some(WallpaperTool::Feh));
        let nitrogen = ToolDetector::with_probe(|t| t == "nitrogen");
        assert_eq!(WallpaperTool::detect(&nitrogen), Some(WallpaperTool::Nitrogen));
    }
}
