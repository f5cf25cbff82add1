use super::label::{LabelLayout, LabelStyle};
use super::palette::Palette;
use crate::api::Detection;
use crate::geometry::Rect;
use crate::prelude::Surface;
use crate::telemetry::LogManager;

pub const DEFAULT_BOX_LINE_WIDTH: f32 = 1.5;

/// Paints detection boxes and labels, scaled from capture pixels onto a
/// surface the size of the displayed image.
pub struct OverlayRenderer {
    palette: Palette,
    label_style: LabelStyle,
    box_line_width: f32,
    logger: LogManager,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(Palette::default(), LabelStyle::default())
    }
}

impl OverlayRenderer {
    pub fn new(palette: Palette, label_style: LabelStyle) -> Self {
        Self {
            palette,
            label_style,
            box_line_width: DEFAULT_BOX_LINE_WIDTH,
            logger: LogManager::new("overlay"),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn label_style(&self) -> &LabelStyle {
        &self.label_style
    }

    /// Resizes and clears `surface`, then draws every detection in order.
    ///
    /// Later detections paint over earlier ones.
    pub fn render<S: Surface>(
        &self,
        surface: &mut S,
        detections: &[Detection],
        scale: f32,
        surface_width: f32,
        surface_height: f32,
    ) {
        surface.resize(surface_width, surface_height);
        surface.clear();

        let mut skipped = 0usize;
        for detection in detections {
            if ![detection.x, detection.y, detection.width, detection.height]
                .iter()
                .all(|v| v.is_finite())
            {
                skipped += 1;
                continue;
            }
            let rect = Rect::scaled(detection, scale);
            self.draw_box(surface, &rect, detection.class_id);
            self.draw_label(surface, &rect, &detection.label, surface_width, surface_height);
        }

        if skipped > 0 {
            self.logger
                .warn(&format!("skipped {} detections with non-finite geometry", skipped));
        }
        self.logger.trace(&format!(
            "rendered {} detections at scale {:.4} onto {}x{}",
            detections.len() - skipped,
            scale,
            surface_width,
            surface_height
        ));
    }

    fn draw_box<S: Surface>(&self, surface: &mut S, rect: &Rect, class_id: i32) {
        let colors = self.palette.colors(class_id);
        surface.fill_rect(rect.x, rect.y, rect.width, rect.height, colors.fill);
        surface.stroke_rect(
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            colors.border,
            self.box_line_width,
        );
    }

    fn draw_label<S: Surface>(
        &self,
        surface: &mut S,
        anchor: &Rect,
        text: &str,
        surface_width: f32,
        surface_height: f32,
    ) {
        let style = &self.label_style;
        let text_width = surface.measure_text(text, style.font_px);
        let layout = LabelLayout::place(anchor, text_width, style, surface_width, surface_height);
        surface.fill_text(text, layout.text_x, layout.text_y, style.font_px, style.fill);
        surface.stroke_text(
            text,
            layout.text_x,
            layout.text_y,
            style.font_px,
            style.stroke,
            style.stroke_width,
        );
    }
}
