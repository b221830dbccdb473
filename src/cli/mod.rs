//! CLI module - command-line interface
//!
//! - `codexbar-tray` - run the tray (default)
//! - `codexbar-tray --print-once` - print the panel line and exit
//! - `codexbar-tray config` - inspect or create the settings file

pub mod config;
pub mod print_once;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::SourceMode;
use crate::settings::SettingsOverrides;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    /// The tray or the dashboard window could not be created
    pub const TRAY_UNAVAILABLE: i32 = 2;
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// CodexBar tray - show codexbar usage in the system tray
///
/// Runs `codexbar panel` and `codexbar usage --format json` on an interval
/// and shows the results in a tray menu and a popup dashboard.
#[derive(Parser, Debug)]
#[command(name = "codexbar-tray")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    // === Global flags ===

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable logs (JSON) to stderr
    #[arg(long = "json-output", global = true)]
    pub json_output: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", global = true, value_parser = ["trace", "verbose", "debug", "info", "warning", "warn", "error", "critical"])]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Tray options ===

    /// Path to the codexbar binary
    #[arg(long, env = "CODEXBAR_BINARY")]
    pub binary: Option<String>,

    /// Provider selection passed to codexbar, e.g. codex or all
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Usage source mode
    #[arg(long, value_enum)]
    pub source: Option<SourceMode>,

    /// Refresh interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Seconds before a codexbar command is killed
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Icon file for the tray icon
    #[arg(long)]
    pub icon: Option<PathBuf>,

    /// Show the dashboard immediately on startup
    #[arg(long = "show-dashboard")]
    pub show_dashboard: bool,

    /// Print the panel output once and exit
    #[arg(long = "print-once")]
    pub print_once: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or create the settings file
    Config(config::ConfigArgs),
}

impl Cli {
    /// Tray options given on the command line
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            binary: self.binary.clone(),
            provider: self.provider.clone(),
            source: self.source,
            interval_secs: self.interval,
            timeout_secs: self.timeout,
            icon: self.icon.clone(),
            show_dashboard: self.show_dashboard,
        }
    }
}
