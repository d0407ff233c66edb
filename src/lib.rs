#![forbid(unsafe_code)]

//! i3ctl — desktop control for the i3 window manager.
//!
//! Volume, brightness, wallpaper, network, bluetooth, power, keyboard
//! layouts, keybindings, workspaces, the bar, and the i3 config itself,
//! all driven through whatever system tools are already installed
//! (`pactl`, `nmcli`, `i3-msg`, ...). Tools are detected at runtime and
//! every command degrades with an install hint instead of a stack trace.
//!
//! # Library usage
//!
//! Use the [`prelude`] for the common types:
//!
//! ```rust,no_run
//! use i3ctl::prelude::*;
//! ```
//!
//! or drive a command headlessly:
//!
//! ```rust,no_run
//! let code = i3ctl::cli::invoke("volume", &["up", "--step", "10"]);
//! ```

pub mod prelude;

pub mod backends;
pub mod cli;
pub mod commands;
pub mod core;
pub mod exec;
pub mod i3;
