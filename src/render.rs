use crate::config::RenderConfig;
use crate::layout::{Viewport, WordCloudLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Offset added after scaling so glyph overhang at the extent edges stays
/// visible.
const SCALE_POSITION_OFFSET: f32 = 5.0;

/// Transform that fits the layout extent into the real viewport minus
/// `margin` on every side: `(translate_x, translate_y, scale)`.
pub fn fit_transform(layout: &WordCloudLayout, viewport: Viewport, margin: f32) -> Option<(f32, f32, f32)> {
    let (left, top, right, bottom) = layout.extent()?;
    let inner = viewport.inner(margin);
    let rect_width = right - left;
    let rect_height = bottom - top;
    if rect_width <= 0.0 || rect_height <= 0.0 || inner.is_empty() {
        return None;
    }
    let scale = (inner.width / rect_width).min(inner.height / rect_height);
    let x = -left * scale + SCALE_POSITION_OFFSET;
    let y = -top * scale + SCALE_POSITION_OFFSET;
    Some((x, y, scale))
}

pub fn render_svg(layout: &WordCloudLayout, theme: &Theme, config: &RenderConfig, margin: f32) -> String {
    let mut svg = String::new();
    let width = config.width.max(1.0);
    let height = config.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));

    if let Some((x, y, scale)) = fit_transform(layout, Viewport::new(width, height), margin) {
        svg.push_str(&format!(
            "<g class=\"words\" transform=\"translate({x:.2},{y:.2}) scale({scale:.4})\">"
        ));
        for word in &layout.words {
            svg.push_str(&format!(
                "<g class=\"word\" transform=\"translate({},{}) rotate({})\">",
                word.x, word.y, word.rotation
            ));
            svg.push_str(&format!(
                "<text text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}px\" fill=\"{}\">{}</text>",
                escape_xml(&theme.font_family),
                word.font_size,
                theme.color_for(word.word_index),
                escape_xml(&word.text)
            ));
            svg.push_str("</g>");
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
