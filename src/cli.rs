//! Top-level CLI definition and dispatch.
#![allow(missing_docs)]

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell as CompletionShell, generate};
use thiserror::Error;

use crate::backends::volume::MuteState;
use crate::backends::wallpaper::{WallpaperMode, WallpaperTool};
use crate::commands::{self, App};
use crate::core::errors::I3cError;

/// i3 desktop control: volume, brightness, wallpaper, network, and the
/// i3 config itself, all through the system tools already installed.
#[derive(Debug, Parser)]
#[command(
    name = "i3ctl",
    author,
    version,
    about = "Control utility for the i3 window manager",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Write log output to a file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Adjust or query audio volume.
    Volume(VolumeArgs),
    /// Adjust or query screen brightness.
    Brightness(BrightnessArgs),
    /// Set, list, or restore wallpapers.
    Wallpaper(WallpaperArgs),
    /// Manage network connections.
    Network(NetworkArgs),
    /// Manage bluetooth devices.
    Bluetooth(BluetoothArgs),
    /// Power off, reboot, suspend, or lock.
    Power(PowerArgs),
    /// Manage keyboard layouts.
    Layout(LayoutArgs),
    /// Manage i3 keybindings.
    Keybind(KeybindArgs),
    /// Manage i3 workspaces and layouts.
    Workspace(WorkspaceArgs),
    /// Manage the i3 bar and i3status.
    Bar(BarArgs),
    /// Edit, reload, or inspect the i3 config.
    Config(ConfigArgs),
    /// Manage startup applications in the i3 config.
    Startup(StartupArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// on/off switch argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    #[must_use]
    pub const fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Debug, Clone, Args)]
pub struct VolumeArgs {
    /// Force a specific tool (pulseaudio or alsa).
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<String>,
    #[command(subcommand)]
    pub command: VolumeCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum VolumeCommand {
    /// Set volume to an absolute percentage.
    Set {
        /// Target volume (clamped to 0-100).
        percent: u8,
    },
    /// Raise volume.
    Up {
        /// Step size in percent.
        #[arg(default_value_t = 5)]
        step: u8,
    },
    /// Lower volume.
    Down {
        /// Step size in percent.
        #[arg(default_value_t = 5)]
        step: u8,
    },
    /// Show current volume and mute state.
    Get,
    /// Mute, unmute, or toggle.
    Mute {
        #[arg(value_enum, default_value_t = MuteState::Toggle)]
        state: MuteState,
    },
}

#[derive(Debug, Clone, Args)]
pub struct BrightnessArgs {
    /// Force a specific tool (xbacklight, brightnessctl, or light).
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<String>,
    #[command(subcommand)]
    pub command: BrightnessCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BrightnessCommand {
    /// Set brightness to an absolute percentage.
    Set {
        /// Target brightness (clamped to 0-100).
        percent: u8,
    },
    /// Raise brightness.
    Up {
        /// Step size in percent.
        #[arg(default_value_t = 5)]
        step: u8,
    },
    /// Lower brightness.
    Down {
        /// Step size in percent.
        #[arg(default_value_t = 5)]
        step: u8,
    },
    /// Show current brightness.
    Get,
}

#[derive(Debug, Clone, Args)]
pub struct WallpaperArgs {
    /// Image file to set as wallpaper.
    pub path: Option<PathBuf>,
    /// List wallpaper history and directory contents.
    #[arg(long, short, conflicts_with_all = ["path", "random", "restore"])]
    pub list: bool,
    /// Pick a random wallpaper, optionally from a directory.
    #[arg(long, short, value_name = "DIR", num_args = 0..=1, default_missing_value = "", conflicts_with_all = ["path", "restore"])]
    pub random: Option<String>,
    /// Restore the most recent wallpaper from history.
    #[arg(long, conflicts_with = "path")]
    pub restore: bool,
    /// Force a specific tool.
    #[arg(long, value_enum)]
    pub tool: Option<WallpaperTool>,
    /// Scaling mode.
    #[arg(long, short, value_enum, default_value_t = WallpaperMode::Fill)]
    pub mode: WallpaperMode,
}

#[derive(Debug, Clone, Args)]
pub struct NetworkArgs {
    /// Force a specific tool (nmcli, iwctl, or wpa_cli).
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<String>,
    #[command(subcommand)]
    pub command: NetworkCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum NetworkCommand {
    /// List visible networks.
    List {
        /// Trigger a rescan before listing.
        #[arg(long)]
        rescan: bool,
        /// List saved connections instead.
        #[arg(long)]
        saved: bool,
    },
    /// Connect to a network.
    Connect {
        /// SSID to connect to.
        ssid: String,
        /// Network passphrase.
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Disconnect from the current network.
    Disconnect,
    /// Show connection status.
    Status,
    /// Turn the wifi radio on or off.
    Wifi {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Rescan for networks.
    Rescan,
}

#[derive(Debug, Clone, Args)]
pub struct BluetoothArgs {
    #[command(subcommand)]
    pub command: BluetoothCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BluetoothCommand {
    /// List bluetooth devices.
    List {
        /// Scan before listing.
        #[arg(long, short)]
        scan: bool,
        /// Show paired devices only.
        #[arg(long, short)]
        paired: bool,
    },
    /// Connect to a device by MAC or name.
    Connect { device: String },
    /// Disconnect from a device by MAC or name.
    Disconnect { device: String },
    /// Pair with a device (interactive).
    Pair { device: String },
    /// Remove a paired device.
    Remove { device: String },
    /// Show bluetooth status and paired devices.
    Status,
    /// Turn bluetooth on or off.
    Power {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Scan for devices.
    Scan {
        /// Scan window in seconds.
        #[arg(long, short, default_value_t = 10)]
        timeout: u64,
        /// Scan until interrupted.
        #[arg(long, short)]
        continuous: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PowerArgs {
    #[command(subcommand)]
    pub command: PowerCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum PowerCommand {
    /// Power off the system.
    Off {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        now: bool,
        /// Schedule power off after N minutes instead.
        #[arg(long, short, value_name = "MINUTES", default_value_t = 0)]
        time: u32,
    },
    /// Reboot the system.
    Reboot {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        now: bool,
    },
    /// Suspend the system.
    Suspend {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        now: bool,
    },
    /// Hibernate the system.
    Hibernate {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        now: bool,
    },
    /// Hybrid-sleep the system.
    HybridSleep {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        now: bool,
    },
    /// Lock the screen.
    Lock,
    /// Show battery, schedule, and CPU status.
    Status,
    /// Cancel a scheduled power off.
    Cancel,
}

#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    #[command(subcommand)]
    pub command: LayoutCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum LayoutCommand {
    /// Switch to a keyboard layout.
    Switch {
        /// Layout code (us, de, fr, ...).
        layout: String,
        /// Layout variant (dvorak, colemak, ...).
        #[arg(long)]
        variant: Option<String>,
    },
    /// List available layouts.
    List,
    /// Show the current layout.
    Current,
    /// Save the current layout as a named preset.
    Save { name: String },
    /// Load a saved preset.
    Load { name: String },
    /// Delete a saved preset.
    Delete { name: String },
    /// List saved presets.
    Presets,
    /// Toggle between two layouts.
    Toggle {
        /// First layout.
        layout1: Option<String>,
        /// Second layout.
        layout2: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct KeybindArgs {
    #[command(subcommand)]
    pub command: KeybindCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum KeybindCommand {
    /// List keybindings in the i3 config.
    List {
        /// Only bindings whose keys or command contain this text.
        #[arg(long, short)]
        filter: Option<String>,
        /// Only $mod bindings.
        #[arg(long = "mod")]
        mod_only: bool,
    },
    /// Add a keybinding.
    Add {
        /// Key combination (e.g. "$mod+shift+b").
        keys: String,
        /// Command to bind.
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
    /// Remove a keybinding.
    Remove {
        /// Key combination to remove.
        keys: String,
    },
    /// Show the binding for a key combination.
    Show { keys: String },
    /// List duplicate key combinations.
    Conflicts,
    /// Save current bindings as a named profile.
    Save { name: String },
    /// Load a saved profile into the i3 config.
    Load { name: String },
    /// List saved profiles.
    Profiles,
    /// Delete a saved profile.
    Delete { name: String },
}

#[derive(Debug, Clone, Args)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum WorkspaceCommand {
    /// List workspaces.
    List,
    /// Create (switch to) a workspace.
    Create { name: String },
    /// Rename a workspace.
    Rename {
        /// New workspace name.
        new_name: String,
        /// Workspace to rename (current when omitted).
        #[arg(long, short)]
        number: Option<String>,
    },
    /// Switch to a workspace.
    Goto { workspace: String },
    /// Move the focused container to a workspace.
    Move { workspace: String },
    /// Move a workspace to an output.
    Output {
        /// Target output (e.g. HDMI-1).
        output: String,
        /// Workspace to move (current when omitted).
        #[arg(long, short)]
        workspace: Option<String>,
    },
    /// Assign an application to a workspace.
    Assign {
        /// Window criteria (e.g. "class=Firefox").
        criteria: String,
        /// Target workspace.
        workspace: String,
        /// Persist the rule in the i3 config.
        #[arg(long)]
        add: bool,
    },
    /// Save the current workspace layout under a name.
    Save {
        name: String,
        /// Workspace to snapshot (current when omitted).
        #[arg(long, short)]
        workspace: Option<String>,
    },
    /// Load a saved workspace layout.
    Load { name: String },
    /// List saved layouts.
    Layouts,
    /// Delete a saved layout.
    Delete { name: String },
}

#[derive(Debug, Clone, Args)]
pub struct BarArgs {
    #[command(subcommand)]
    pub command: BarCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BarMode {
    Dock,
    Hide,
    Invisible,
}

impl BarMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dock => "dock",
            Self::Hide => "hide",
            Self::Invisible => "invisible",
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum BarCommand {
    /// Show the bar (dock mode).
    Show,
    /// Hide the bar.
    Hide,
    /// Toggle between dock and hide.
    Toggle,
    /// Set the bar mode.
    Mode {
        #[arg(value_enum)]
        mode: BarMode,
    },
    /// Show bar sections from the i3 config.
    Status,
    /// Manage i3status.
    I3status {
        #[command(subcommand)]
        command: I3statusCommand,
    },
    /// Manage bar configuration.
    Config {
        #[command(subcommand)]
        command: BarConfigCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum I3statusCommand {
    /// Reload i3status (SIGUSR1).
    Reload,
    /// Edit the i3status config.
    Edit {
        /// Editor to use (defaults to $EDITOR).
        #[arg(long, short)]
        editor: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BarConfigCommand {
    /// Edit the bar section in the i3 config.
    Edit {
        /// Editor to use (defaults to $EDITOR).
        #[arg(long, short)]
        editor: Option<String>,
    },
    /// List bar sections from the i3 config.
    List,
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Open the i3 config in an editor.
    Edit {
        /// Editor to use (defaults to the configured editor, then $EDITOR).
        #[arg(long, short)]
        editor: Option<String>,
    },
    /// Reload the i3 config.
    Reload,
    /// Print the i3 config path.
    Path,
    /// Print the i3 config.
    Show {
        /// Only the first N lines.
        #[arg(long, short, value_name = "N")]
        lines: Option<usize>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct StartupArgs {
    #[command(subcommand)]
    pub command: StartupCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum StartupCommand {
    /// Add a startup command to the i3 config.
    Add {
        /// Command to run at startup.
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
        /// Run once at startup (exec) instead of on every restart.
        #[arg(long, short)]
        once: bool,
        /// Comment to place above the entry.
        #[arg(long, short)]
        comment: Option<String>,
    },
    /// Remove a startup command from the i3 config.
    Remove {
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
    /// List startup commands.
    List {
        /// Include commented-out entries.
        #[arg(long, short)]
        all: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// No usable backend tool installed.
    #[error("no {category} tool found; install one of: {hint}")]
    Tool {
        category: &'static str,
        hint: &'static str,
    },
    /// A backend tool ran and failed.
    #[error("{0}")]
    Backend(String),
    /// A named profile/preset does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },
    /// Interrupted by the user (SIGINT).
    #[error("interrupted")]
    Interrupted,
    /// Library-level failure.
    #[error(transparent)]
    Core(I3cError),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract: 0 success, 130 interrupt, 1 otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<I3cError> for CliError {
    fn from(err: I3cError) -> Self {
        match err {
            I3cError::ToolMissing { category, hint } => Self::Tool { category, hint },
            I3cError::NotFound { kind, name } => Self::NotFound { kind, name },
            other => Self::Core(other),
        }
    }
}

/// Dispatch a parsed CLI against a prepared [`App`] context.
pub fn dispatch(app: &mut App, command: &Command) -> Result<(), CliError> {
    match command {
        Command::Volume(args) => commands::volume::run(app, args),
        Command::Brightness(args) => commands::brightness::run(app, args),
        Command::Wallpaper(args) => commands::wallpaper::run(app, args),
        Command::Network(args) => commands::network::run(app, args),
        Command::Bluetooth(args) => commands::bluetooth::run(app, args),
        Command::Power(args) => commands::power::run(app, args),
        Command::Layout(args) => commands::layout::run(app, args),
        Command::Keybind(args) => commands::keybind::run(app, args),
        Command::Workspace(args) => commands::workspace::run(app, args),
        Command::Bar(args) => commands::bar::run(app, args),
        Command::Config(args) => commands::config::run(app, args),
        Command::Startup(args) => commands::startup::run(app, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Run a parsed CLI with a production context; errors become one-line
/// messages plus the contract exit code.
#[must_use]
pub fn run(cli: &Cli) -> i32 {
    let mut app = App::from_env(cli.config.as_deref());
    match dispatch(&mut app, &cli.command) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{err}");
            eprintln!("i3ctl: {err}");
            err.exit_code()
        }
    }
}

/// Headless entry point: parse `command` plus `args` as if typed on the
/// command line and return the process exit code. Help and version
/// displays count as success; parse failures print usage and fail.
#[must_use]
pub fn invoke(command: &str, args: &[&str]) -> i32 {
    let mut argv = vec!["i3ctl", command];
    argv.extend_from_slice(args);
    match Cli::try_parse_from(argv) {
        Ok(cli) => run(&cli),
        Err(err) => {
            let displayed = matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            );
            let _ = err.print();
            i32::from(!displayed)
        }
    }
}
