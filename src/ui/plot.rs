use chrono::{Datelike, NaiveDate};
use eframe::egui::{RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::color;
use crate::data::aggregate::{Granularity, StationMean, TimePoint};
use crate::report::DashboardReport;
use crate::state::AppState;
use crate::ui::{heatmap, table};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the whole dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view air quality  (File → Open…)");
        });
        return;
    }
    let report = &state.report;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Air Quality Dashboard");
            ui.add_space(6.0);

            ui.columns(2, |cols| {
                metric(&mut cols[0], "Total Station", report.total_stations.to_string());
                metric(&mut cols[1], "Observations in range", report.rows_in_range.to_string());
            });
            ui.separator();

            ui.heading("Daily Observation");
            for granularity in [Granularity::Day, Granularity::Month, Granularity::Year] {
                time_series_plot(ui, granularity, report.series(granularity));
            }
            ui.separator();

            ui.heading("Station Observation");
            station_bar_chart(ui, &report.by_station);
            ui.separator();

            ui.heading("Correlation");
            match &report.correlation {
                Some(corr) => heatmap::correlation_heatmap(ui, corr),
                None => no_data(ui),
            }
            ui.separator();

            ui.heading("Air Quality Index");
            category_table_or_empty(ui, report);
        });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.weak(label);
        ui.label(RichText::new(value).size(28.0).strong());
    });
}

fn no_data(ui: &mut Ui) {
    ui.label(RichText::new("No data in the selected range.").italics());
}

fn category_table_or_empty(ui: &mut Ui, report: &DashboardReport) {
    if report.categories.is_empty() {
        no_data(ui);
    } else {
        table::category_table(ui, &report.categories);
    }
}

// ---------------------------------------------------------------------------
// Line charts
// ---------------------------------------------------------------------------

/// X coordinate for a calendar day.
fn day_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn date_label(x: f64, granularity: Granularity) -> String {
    let Some(date) = x_date(x) else {
        return String::new();
    };
    match granularity {
        Granularity::Day => date.format("%Y-%m-%d").to_string(),
        Granularity::Month => date.format("%Y-%m").to_string(),
        Granularity::Year => date.format("%Y").to_string(),
    }
}

/// Mean PM2.5 over time with a marker on every bucket.
pub fn time_series_plot(ui: &mut Ui, granularity: Granularity, series: &[TimePoint]) {
    ui.label(RichText::new(format!("{granularity} Average PM2.5")).strong());
    if series.is_empty() {
        no_data(ui);
        return;
    }

    let coords: Vec<[f64; 2]> = series
        .iter()
        .map(|p| [day_x(p.bucket), p.mean_pm25])
        .collect();

    Plot::new(format!("pm25_{granularity}"))
        .height(CHART_HEIGHT)
        .y_axis_label("PM2.5 Level")
        .x_axis_formatter(move |mark: GridMark, _range| date_label(mark.value, granularity))
        .label_formatter(move |_name, value| {
            format!("{}\n{:.2}", date_label(value.x, granularity), value.y)
        })
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(coords.clone()))
                    .color(color::SERIES_COLOR)
                    .width(2.0)
                    .name("PM2.5"),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(coords))
                    .color(color::SERIES_COLOR)
                    .radius(3.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Station bar chart
// ---------------------------------------------------------------------------

/// Horizontal bars, highest mean on top; the top station is highlighted.
pub fn station_bar_chart(ui: &mut Ui, ranked: &[StationMean]) {
    ui.label(RichText::new("Average PM2.5 by Station").strong());
    let defined: Vec<&StationMean> = ranked.iter().filter(|s| s.mean_pm25.is_some()).collect();
    if defined.is_empty() {
        no_data(ui);
        return;
    }

    let n = defined.len();
    let fills = color::bar_colors(n);
    // Row 0 is drawn at the top.
    let bars: Vec<Bar> = defined
        .iter()
        .zip(fills)
        .enumerate()
        .map(|(i, (s, fill))| {
            Bar::new((n - 1 - i) as f64, s.mean_pm25.unwrap_or_default())
                .name(&s.station)
                .fill(fill)
                .width(0.7)
        })
        .collect();

    let names: Vec<String> = defined.iter().map(|s| s.station.clone()).collect();
    let height = (n as f32 * 28.0).max(CHART_HEIGHT);

    Plot::new("station_bars")
        .height(height)
        .x_axis_label("PM2.5 Level")
        .y_axis_formatter(move |mark: GridMark, _range| {
            let v = mark.value;
            if (v - v.round()).abs() > 1e-6 || v < 0.0 {
                return String::new();
            }
            names
                .get(n.saturating_sub(1 + v.round() as usize))
                .filter(|_| (v.round() as usize) < n)
                .cloned()
                .unwrap_or_default()
        })
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}
