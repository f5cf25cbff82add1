use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Pixels, Point, Rectangle, Renderer, Size, Theme,
};
use snapcore::overlay::{DisplayList, DrawCommand, Rgba};

/// Canvas program that replays a rendered overlay.
#[derive(Clone)]
pub struct OverlayCanvas {
    list: DisplayList,
}

impl OverlayCanvas {
    pub fn new(list: &DisplayList) -> Self {
        Self { list: list.clone() }
    }
}

pub fn to_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

impl<Message> canvas::Program<Message> for OverlayCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        for command in self.list.commands() {
            match command {
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => frame.fill_rectangle(
                    Point::new(*x, *y),
                    Size::new(*width, *height),
                    to_color(*color),
                ),
                DrawCommand::StrokeRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                    line_width,
                } => frame.stroke(
                    &Path::rectangle(Point::new(*x, *y), Size::new(*width, *height)),
                    Stroke::default()
                        .with_color(to_color(*color))
                        .with_width(*line_width),
                ),
                DrawCommand::FillText {
                    text,
                    x,
                    y,
                    font_px,
                    color,
                } => frame.fill_text(canvas::Text {
                    content: text.clone(),
                    position: Point::new(*x, *y),
                    color: to_color(*color),
                    size: Pixels(*font_px),
                    ..canvas::Text::default()
                }),
                // The canvas cannot stroke glyph outlines.
                DrawCommand::StrokeText { .. } => {}
            }
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_alpha_survives_conversion() {
        let color = to_color(Rgba::new(249, 146, 82, 0.5));
        assert_eq!(color.a, 0.5);
    }
}
