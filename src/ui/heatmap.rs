use eframe::egui::{self, Align2, FontId, Rect, Sense, Stroke, Ui, Vec2};

use crate::color::{annotation_color, coolwarm};
use crate::data::aggregate::CorrelationMatrix;

const CELL: f32 = 46.0;
const LABEL_MARGIN: f32 = 52.0;

/// Annotated heatmap of the correlation matrix, painted cell by cell.
pub fn correlation_heatmap(ui: &mut Ui, corr: &CorrelationMatrix) {
    let n = corr.measures.len();
    let side = LABEL_MARGIN + CELL * n as f32;
    let (response, painter) = ui.allocate_painter(Vec2::new(side, side), Sense::hover());
    let origin = response.rect.min + Vec2::new(LABEL_MARGIN, 0.0);

    let label_font = FontId::proportional(12.0);
    let value_font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    for (i, row_measure) in corr.measures.iter().enumerate() {
        let y = origin.y + CELL * i as f32;
        painter.text(
            egui::pos2(origin.x - 6.0, y + CELL / 2.0),
            Align2::RIGHT_CENTER,
            row_measure.column_name(),
            label_font.clone(),
            text_color,
        );

        for j in 0..n {
            let value = corr.get(i, j);
            let cell = Rect::from_min_size(
                egui::pos2(origin.x + CELL * j as f32, y),
                Vec2::splat(CELL),
            );
            painter.rect_filled(cell.shrink(0.5), 0.0, coolwarm(value));

            let text = if value.is_nan() {
                "–".to_string()
            } else {
                format!("{value:.2}")
            };
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                text,
                value_font.clone(),
                annotation_color(value),
            );
        }
    }

    let bottom = origin.y + CELL * n as f32;
    for (j, col_measure) in corr.measures.iter().enumerate() {
        painter.text(
            egui::pos2(origin.x + CELL * j as f32 + CELL / 2.0, bottom + 4.0),
            Align2::CENTER_TOP,
            col_measure.column_name(),
            label_font.clone(),
            text_color,
        );
    }

    painter.rect_stroke(
        Rect::from_min_size(origin, Vec2::splat(CELL * n as f32)),
        0.0,
        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color),
        egui::StrokeKind::Outside,
    );

    // Hover readout with the full pair name.
    if let Some(pos) = response.hover_pos() {
        let local = pos - origin;
        if local.x >= 0.0 && local.y >= 0.0 {
            let (i, j) = ((local.y / CELL) as usize, (local.x / CELL) as usize);
            if i < n && j < n {
                response.on_hover_text(format!(
                    "{} × {}: {:.3}",
                    corr.measures[i],
                    corr.measures[j],
                    corr.get(i, j)
                ));
            }
        }
    }
}
