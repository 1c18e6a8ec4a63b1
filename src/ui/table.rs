use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::category_color;
use crate::data::aggregate::StationCategory;
use crate::report::fmt_mean;

/// Station / mean PM2.5 / category table.
pub fn category_table(ui: &mut Ui, rows: &[StationCategory]) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder())
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Station");
            });
            header.col(|ui| {
                ui.strong("PM2.5");
            });
            header.col(|ui| {
                ui.strong("AQI Category");
            });
        })
        .body(|mut body| {
            for row in rows {
                body.row(20.0, |mut tr| {
                    tr.col(|ui| {
                        ui.label(row.station.as_str());
                    });
                    tr.col(|ui| {
                        ui.monospace(fmt_mean(row.mean_pm25));
                    });
                    tr.col(|ui| match row.category {
                        Some(c) => {
                            ui.label(RichText::new("■").color(category_color(c)));
                            ui.label(c.label());
                        }
                        None => {
                            ui.weak("Unknown");
                        }
                    });
                });
            }
        });
}
