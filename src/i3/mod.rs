//! i3 integration: the `i3-msg` wrapper and config-file text surgery.

pub mod config_file;
pub mod msg;
