use clap::Parser;
use eframe::egui;
use log::{debug, info, warn};
use std::path::PathBuf;

use folio::app::FolioApp;
use folio::cli::Args;
use folio::pages::{PageId, content};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        // File logging with the specified verbosity level
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| PathBuf::from("folio.log"));
        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }

    info!("Folio portfolio shell starting...");
    debug!("Command-line args: {:?}", args);

    let start_page = args.page.as_deref().and_then(PageId::parse);
    if args.page.is_some() && start_page.is_none() {
        warn!(
            "Unknown page {:?}; valid pages: home, projects, experience, contact",
            args.page
        );
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} • {} • v{}",
                content::OWNER,
                content::SUBTITLE,
                env!("CARGO_PKG_VERSION")
            ))
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([480.0, 360.0])
            .with_fullscreen(args.fullscreen)
            .with_resizable(true),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "folio",
        native_options,
        Box::new(move |cc| {
            // Load persisted app state if available, otherwise start fresh
            let mut app: FolioApp = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted state found, creating default app");
                    FolioApp::default()
                });

            // CLI overrides for this run
            if let Some(page) = start_page {
                app.current_page = page;
            }
            if args.no_backdrop {
                app.settings.backdrop_enabled = false;
            }

            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
