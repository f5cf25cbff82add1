use snapcore::overlay::{DisplayList, DrawCommand};
use std::fmt::Write;
use std::path::Path;

/// Replays a display list as an SVG document.
///
/// When `background` is given the image is stretched under the overlay at the
/// list's size, the way the overlay sits on the displayed photo.
pub fn render_svg(list: &DisplayList, background: Option<&Path>) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = list.width(),
        h = list.height()
    );
    if let Some(path) = background {
        let _ = writeln!(
            svg,
            r#"  <image href="{}" x="0" y="0" width="{}" height="{}" preserveAspectRatio="none"/>"#,
            escape(&path.to_string_lossy()),
            list.width(),
            list.height()
        );
    }
    for command in list.commands() {
        let _ = writeln!(svg, "  {}", element(command));
    }
    svg.push_str("</svg>\n");
    svg
}

fn element(command: &DrawCommand) -> String {
    match command {
        DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            x,
            y,
            width,
            height,
            color.to_css()
        ),
        DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            color,
            line_width,
        } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            x,
            y,
            width,
            height,
            color.to_css(),
            line_width
        ),
        DrawCommand::FillText {
            text,
            x,
            y,
            font_px,
            color,
        } => format!(
            r#"<text x="{}" y="{}" font-family="Arial, sans-serif" font-size="{}" dominant-baseline="hanging" fill="{}">{}</text>"#,
            x,
            y,
            font_px,
            color.to_css(),
            escape(text)
        ),
        DrawCommand::StrokeText {
            text,
            x,
            y,
            font_px,
            color,
            line_width,
        } => format!(
            r#"<text x="{}" y="{}" font-family="Arial, sans-serif" font-size="{}" dominant-baseline="hanging" fill="none" stroke="{}" stroke-width="{}">{}</text>"#,
            x,
            y,
            font_px,
            color.to_css(),
            line_width,
            escape(text)
        ),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapcore::overlay::OverlayRenderer;
    use snapcore::Detection;

    #[test]
    fn svg_contains_one_element_per_command() {
        let mut list = DisplayList::new();
        OverlayRenderer::default().render(
            &mut list,
            &[Detection::new("cat", 0, 10.0, 10.0, 100.0, 50.0)],
            2.0,
            640.0,
            480.0,
        );
        let svg = render_svg(&list, None);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"<rect x="20" y="20" width="200" height="100" fill="rgba(249, 146, 82, 0.5)"/>"#));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert_eq!(svg.matches(">cat</text>").count(), 2);
    }

    #[test]
    fn blank_list_has_only_the_frame() {
        let mut list = DisplayList::new();
        OverlayRenderer::default().render(&mut list, &[], 1.0, 10.0, 10.0);
        let svg = render_svg(&list, Some(Path::new("a&b.jpg")));
        assert!(svg.contains("a&amp;b.jpg"));
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn labels_are_escaped() {
        let mut list = DisplayList::new();
        OverlayRenderer::default().render(
            &mut list,
            &[Detection::new("<b>", 1, 0.0, 0.0, 5.0, 5.0)],
            1.0,
            100.0,
            100.0,
        );
        assert!(render_svg(&list, None).contains("&lt;b&gt;"));
    }
}
