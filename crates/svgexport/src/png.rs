use crate::{prepare_svg_tree, CSS_DPI};

/// Rasterizes an SVG into PNG bytes at `dpi` dots per inch. The background
/// stays transparent.
pub fn render_to_bytes(svg_content: &str, dpi: f32) -> Result<Vec<u8>, String> {
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(format!("Invalid resolution: {dpi} dpi"));
    }
    let tree = prepare_svg_tree(svg_content.as_bytes())?;
    let scale = dpi / CSS_DPI;
    let pixmap_size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or("Unable to scale image".to_string())?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(pixmap_size.width(), pixmap_size.height())
        .ok_or("Unable to init image".to_string())?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap.encode_png().map_err(|e| e.to_string())
}
