use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::data::category::{Category, THRESHOLDS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – date range
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Date Range");
    ui.separator();

    let (Some(range), Some((min, max))) = (
        state.range,
        state.dataset.as_ref().and_then(|ds| ds.date_bounds()),
    ) else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut start = range.start;
    let mut end = range.end;

    egui::Grid::new("date_range")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("From");
            ui.add(DatePickerButton::new(&mut start).id_salt("range_start"));
            ui.end_row();

            ui.label("To");
            ui.add(DatePickerButton::new(&mut end).id_salt("range_end"));
            ui.end_row();
        });

    if start != range.start {
        state.set_start(start);
    }
    if end != range.end {
        state.set_end(end);
    }

    ui.add_space(4.0);
    if ui.small_button("Full range").clicked() {
        state.reset_range();
    }

    ui.add_space(4.0);
    ui.weak(format!("Available: {min} – {max}"));
    if let Some(r) = state.range {
        if r.is_empty() {
            ui.label(RichText::new("Start is after end.").color(Color32::YELLOW));
        }
    }

    ui.separator();
    category_legend(ui);
}

/// PM2.5 bands behind the category column.
fn category_legend(ui: &mut Ui) {
    ui.strong("PM2.5 categories");
    let mut lower = 0.0;
    for (upper, category) in THRESHOLDS {
        legend_row(ui, category, format!("{lower:.0} – {upper:.0}"));
        lower = upper;
    }
    legend_row(ui, Category::Hazardous, format!("> {lower:.0}"));
}

fn legend_row(ui: &mut Ui, category: Category, band: String) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new("■").color(crate::color::category_color(category)));
        ui.label(category.label());
        ui.weak(band);
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations loaded, {} in range",
                ds.len(),
                state.report.rows_in_range
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open air quality data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
