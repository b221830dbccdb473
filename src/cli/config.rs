//! Config command implementation
//!
//! Inspecting and creating the tray settings file.

use clap::{Parser, Subcommand, ValueEnum};

use crate::settings::Settings;

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the settings file path
    Path,
    /// Print the effective settings
    Dump {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Json)]
        format: DumpFormat,
    },
    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Json,
    Toml,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Path => show_path(),
        ConfigCommand::Dump { format } => {
            println!("{}", render(&Settings::load(), format)?);
            Ok(())
        }
        ConfigCommand::Init { force } => init_file(force),
    }
}

fn show_path() -> anyhow::Result<()> {
    match Settings::settings_path() {
        Some(path) => {
            let exists = if path.exists() { "" } else { " (not found)" };
            println!("{}{}", path.display(), exists);
            Ok(())
        }
        None => anyhow::bail!("Could not determine config directory"),
    }
}

/// Serialize settings in the requested format
pub fn render(settings: &Settings, format: DumpFormat) -> anyhow::Result<String> {
    let text = match format {
        DumpFormat::Json => serde_json::to_string_pretty(settings)?,
        DumpFormat::Toml => toml::to_string_pretty(settings)?,
    };
    Ok(text)
}

fn init_file(force: bool) -> anyhow::Result<()> {
    if let Some(path) = Settings::settings_path() {
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }
    }
    let path = Settings::default().save()?;
    println!("Wrote {}", path.display());
    Ok(())
}
