//! CodexBar tray - system tray front-end for the codexbar CLI
//!
//! - Tray icon and menu with the panel line and per-provider usage bars
//! - Popup dashboard with searchable provider cards
//! - Periodic refresh by running `codexbar panel` and `codexbar usage`

mod cli;
mod context;
mod core;
mod logging;
mod native_ui;
mod refresh;
mod runner;
mod settings;
mod tray;

use clap::Parser;
use cli::{exit_codes, Cli, Commands};
use context::AppContext;
use native_ui::DashboardOptions;
use settings::Settings;
use tray::TrayOptions;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = logging::init(cli.verbose, cli.json_output, cli.log_level.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    let overrides = cli.overrides();
    if let Some(Commands::Config(args)) = cli.command {
        return match cli::config::run(args) {
            Ok(()) => exit_codes::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_codes::UNEXPECTED_FAILURE
            }
        };
    }

    let settings = Settings::load().with_overrides(overrides);
    tracing::debug!("Effective settings: {:?}", settings);

    if cli.print_once {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("Failed to create runtime: {}", e);
                return exit_codes::UNEXPECTED_FAILURE;
            }
        };
        return rt.block_on(cli::print_once::run(&settings.command()));
    }

    run_tray(&settings)
}

/// Start the worker, the tray, and the dashboard; returns when the app quits
fn run_tray(settings: &Settings) -> i32 {
    let (ctx, receivers) = AppContext::new();

    if let Err(e) = refresh::spawn(
        settings.command(),
        settings.refresh_interval(),
        ctx.clone(),
        receivers.refresh,
    ) {
        eprintln!("Error: failed to start refresh worker: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    let tray_options = TrayOptions {
        icon: settings.icon.clone(),
        bar_length: settings.bar_length,
    };

    #[cfg(target_os = "linux")]
    let local_tray = {
        if let Err(e) = tray::host::spawn(ctx.clone(), tray_options) {
            eprintln!("Error: {}", e);
            ctx.quit();
            return exit_codes::TRAY_UNAVAILABLE;
        }
        None
    };
    #[cfg(not(target_os = "linux"))]
    let local_tray = Some(tray_options);

    let options = DashboardOptions {
        size: settings.popup_size(),
        margin: settings.popup_margin,
        show_on_start: settings.show_dashboard,
    };

    let result = native_ui::run(ctx.clone(), receivers.ui, options, local_tray);
    ctx.quit();

    match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::TRAY_UNAVAILABLE
        }
    }
}
