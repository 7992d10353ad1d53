mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::DashboardApp;
use clap::Parser;
use eframe::egui;
use state::AppState;
use superstore_dashboard::config::Settings;

/// Interactive sales dashboard for Superstore-style transaction data.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Sales data file (.csv, .tsv, .parquet, .json). Overrides `data.path`.
    data: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(path) = args.data {
        settings.data.path = Some(path);
    }

    let data_path = settings.data.path.clone();
    let mut state = AppState::new(settings);

    // A dataset named up front must load, or no window is shown at all.
    if let Some(path) = data_path {
        let table = state
            .load(&path)
            .inspect_err(|e| log::error!("Failed to load {}: {e}", path.display()))
            .with_context(|| format!("loading {}", path.display()))?;
        state.set_table(table);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Superstore Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
