//! Math snippet rendering.
//!
//! A snippet is a bare math expression without `$` delimiters. Rendering
//! produces the SVG text of the typeset expression; nothing is persisted
//! unless the caller exports the result.

mod latex;

pub use latex::LatexMathRenderer;

use crate::utils::RenderError;
use std::path::Path;

/// Typesets a math expression to SVG.
pub trait MathRenderer {
    fn render_svg(&self, expression: &str) -> Result<String, RenderError>;
}

/// Surrounds `expression` with inline math delimiters.
pub fn wrap_math(expression: &str) -> String {
    format!("${}$", expression.trim())
}

pub fn render_snippet(renderer: &dyn MathRenderer, expression: &str) -> Result<String, RenderError> {
    if expression.trim().is_empty() {
        return Err(RenderError::EmptyInput);
    }
    let svg = renderer.render_svg(expression)?;
    if !svg.contains("<svg") {
        return Err(RenderError::EmptyOutput);
    }
    Ok(svg)
}

/// Writes a rendered snippet to `path`; the extension selects SVG, PNG or PDF.
pub fn export(svg: &str, path: &Path, dpi: u32) -> Result<(), RenderError> {
    svgexport::write_image(svg, path, dpi as f32).map_err(RenderError::Export)?;
    log::info!("Snippet written to {}", path.display());
    Ok(())
}
