//! Application runner - window setup and app construction.

use anyhow::Context;
use log::info;

use crate::app::ScrollaApp;
use crate::cli::Args;
use crate::config;

/// Run the scrolla application with given arguments.
///
/// # Returns
/// * `Ok(())` on successful exit
/// * `Err` if initialization or runtime fails
pub fn run_app(args: Args) -> anyhow::Result<()> {
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());

    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    info!("Scrolla starting...");
    info!(
        "Config path: {}",
        config::config_file("scrolla.json", &path_config).display()
    );

    if let Some(ref dir) = args.sequence_dir {
        info!("Sequence directory: {}", dir.display());
    } else if let Some(ref manifest) = args.manifest {
        info!("Frame manifest: {}", manifest.display());
    } else {
        info!("No sequence source provided, waiting for a dropped directory");
    }

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(format!("Scrolla v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1280.0, 720.0])
            .with_resizable(true)
            .with_drag_and_drop(true),
        persist_window: true,
        #[cfg(not(target_arch = "wasm32"))]
        persistence_path: Some(config::config_file("scrolla.json", &path_config)),
        ..Default::default()
    };

    eframe::run_native(
        "Scrolla",
        native_options,
        Box::new(move |cc| Ok(Box::new(ScrollaApp::new(cc, &args, path_config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("UI loop failed")?;

    info!("Application exiting");
    Ok(())
}
