//! SVG export of a render scene.
//! Coordinates stay in logical board units inside the `viewBox`; zoom only
//! changes the outer pixel size.

use tablekit_core::Rect;

use crate::renderer::{RenderScene, RenderStyle};

const LABEL_FONT_SIZE: f64 = 12.0;
const LABEL_LINE_HEIGHT: f64 = 14.0;

/// Renders `scene` as a standalone SVG document.
pub fn render_svg(scene: &RenderScene, style: &RenderStyle) -> String {
    let pixels = scene.pixel_size();
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {} {}\">\n",
        pixels.width, pixels.height, scene.board.width, scene.board.height
    ));
    svg.push_str(&format!("  <title>{}</title>\n", escape(&scene.table_name)));
    svg.push_str(&format!(
        "  <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        style.background
    ));

    if let Some(placeholder) = &scene.placeholder {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\">{}</text>\n",
            scene.board.width / 2.0,
            scene.board.height / 2.0,
            LABEL_FONT_SIZE * 2.0,
            style.text_color,
            escape(placeholder)
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    for surface in &scene.surfaces {
        svg.push_str(&format!(
            "  <rect class=\"surface\" {} fill=\"{}\" stroke=\"{}\"/>\n",
            rect_attrs(&surface.rect),
            style.surface_fill,
            style.surface_stroke
        ));
    }

    if let Some(image) = &scene.image {
        svg.push_str(&format!(
            "  <image href=\"{}\" {} preserveAspectRatio=\"none\"/>\n",
            escape(&image.url),
            rect_attrs(&image.rect)
        ));
    }

    for slot in &scene.slots {
        if let Some(line) = &slot.connector {
            svg.push_str(&format!(
                "  <line class=\"connector\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-dasharray=\"4 3\"/>\n",
                line.from.x, line.from.y, line.to.x, line.to.y, style.connector_stroke
            ));
        }
        svg.push_str(&format!(
            "  <circle class=\"slot\" cx=\"{}\" cy=\"{}\" r=\"6\" fill=\"{}\"/>\n",
            slot.position.x, slot.position.y, style.connector_stroke
        ));
    }

    for device in &scene.devices {
        let stroke = if device.missing {
            format!(" stroke=\"{}\" stroke-width=\"3\"", style.missing_stroke)
        } else {
            format!(" stroke=\"{}\"", style.surface_stroke)
        };
        svg.push_str(&format!(
            "  <g class=\"device\" data-id=\"{}\">\n",
            escape(&device.id)
        ));
        svg.push_str(&format!(
            "    <rect {} rx=\"4\" fill=\"{}\"{}/>\n",
            rect_attrs(&device.rect),
            device.fill,
            stroke
        ));
        let mut y = device.rect.top() + LABEL_LINE_HEIGHT;
        svg.push_str(&format!(
            "    <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>\n",
            device.rect.left() + 4.0,
            y,
            LABEL_FONT_SIZE,
            style.text_color,
            escape(&device.label)
        ));
        if device.quantity > 1 {
            y += LABEL_LINE_HEIGHT;
            svg.push_str(&format!(
                "    <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\">x{}</text>\n",
                device.rect.left() + 4.0,
                y,
                LABEL_FONT_SIZE,
                style.text_color,
                device.quantity
            ));
        }
        svg.push_str("  </g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

fn rect_attrs(rect: &Rect) -> String {
    format!(
        "x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        rect.x, rect.y, rect.width, rect.height
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
