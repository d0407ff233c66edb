//! Per-capability backend adapters.
//!
//! Each backend is an explicit enum over the supported tools; argv
//! construction is a pure mapping and output parsing is a narrow adapter
//! for the formats the tools are known to emit. Handlers pick the variant
//! (explicit flag, then config preference, then detection) and drive it
//! through the runner.

pub mod bluetooth;
pub mod brightness;
pub mod keyboard;
pub mod network;
pub mod power;
pub mod volume;
pub mod wallpaper;
