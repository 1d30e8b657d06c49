use usvg::Tree;

/// Resolution usvg assumes when mapping SVG user units to pixels.
pub const CSS_DPI: f32 = 96.0;

pub fn prepare_svg_tree(svg_data: &[u8]) -> Result<Tree, String> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    Tree::from_data(svg_data, &options).map_err(|e| format!("Unable to parse SVG: {e}"))
}
