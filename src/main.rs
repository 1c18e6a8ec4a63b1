use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use air_quality_dashboard::app::DashboardApp;
use air_quality_dashboard::cli::{Args, ReportFormat};
use air_quality_dashboard::data::loader::load_file;
use air_quality_dashboard::report::DashboardReport;
use air_quality_dashboard::state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let state = match &args.input {
        Some(path) => {
            let dataset = load_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            log::info!(
                "Loaded {} observations from {} stations",
                dataset.len(),
                dataset.station_count()
            );
            let initial = args.initial_range(&dataset);
            AppState::with_dataset(dataset, initial)
        }
        None => AppState::default(),
    };

    if let Some(format) = args.report {
        return print_report(&state.report, format);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Air Quality Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

fn print_report(report: &DashboardReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serializing report")?;
            println!("{json}");
        }
    }
    Ok(())
}
