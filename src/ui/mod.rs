//! egui rendering: panels, charts, heatmap and summary table.

pub mod heatmap;
pub mod panels;
pub mod plot;
pub mod table;
