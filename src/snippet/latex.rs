use crate::config::{SnippetConfig, ToolsConfig};
use crate::snippet::{wrap_math, MathRenderer};
use crate::utils::{run_tool, RenderError};
use std::{fs, path::PathBuf};

const SNIPPET_STEM: &str = "snippet";

/// Renders math through `latex` and `dvisvgm`.
///
/// Each call typesets a `standalone` page in Computer Modern inside a fresh
/// temporary directory, which is removed when the call returns whether or
/// not typesetting succeeded. Glyphs are emitted as paths so the SVG does
/// not depend on fonts installed on the viewing machine.
#[derive(Debug, Clone)]
pub struct LatexMathRenderer {
    latex: String,
    latex_args: Vec<String>,
    dvisvgm: String,
    dvisvgm_args: Vec<String>,
    font_size: u32,
    scratch_dir: Option<PathBuf>,
}

impl LatexMathRenderer {
    pub fn new(tools: &ToolsConfig, snippet: &SnippetConfig) -> Self {
        Self {
            latex: tools.latex.clone(),
            latex_args: tools.latex_args.clone(),
            dvisvgm: tools.dvisvgm.clone(),
            dvisvgm_args: tools.dvisvgm_args.clone(),
            font_size: snippet.font_size,
            scratch_dir: snippet.scratch_dir.clone(),
        }
    }

    fn standalone_source(&self, expression: &str) -> String {
        // Baseline skip follows the usual 1.2 ratio.
        let skip = self.font_size as f64 * 1.2;
        format!(
            "\\documentclass[preview,border=0pt]{{standalone}}\n\
             \\usepackage{{amsmath}}\n\
             \\usepackage{{amssymb}}\n\
             \\begin{{document}}\n\
             \\fontsize{{{}}}{{{:.1}}}\\selectfont\n\
             {}\n\
             \\end{{document}}\n",
            self.font_size,
            skip,
            wrap_math(expression)
        )
    }
}

impl MathRenderer for LatexMathRenderer {
    fn render_svg(&self, expression: &str) -> Result<String, RenderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("texrender-");
        let scratch = match &self.scratch_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        let tex_name = format!("{SNIPPET_STEM}.tex");
        let dvi_name = format!("{SNIPPET_STEM}.dvi");
        let svg_name = format!("{SNIPPET_STEM}.svg");

        fs::write(scratch.path().join(&tex_name), self.standalone_source(expression))?;

        let mut latex_args = self.latex_args.clone();
        latex_args.extend([
            "-interaction=nonstopmode".to_string(),
            "-halt-on-error".to_string(),
            tex_name,
        ]);
        run_tool(&self.latex, &latex_args, Some(scratch.path()))?;

        let mut dvisvgm_args = self.dvisvgm_args.clone();
        dvisvgm_args.extend([
            "--no-fonts".to_string(),
            "-e".to_string(),
            format!("--output={svg_name}"),
            dvi_name,
        ]);
        run_tool(&self.dvisvgm, &dvisvgm_args, Some(scratch.path()))?;

        let svg = fs::read_to_string(scratch.path().join(&svg_name))?;
        if svg.trim().is_empty() {
            return Err(RenderError::EmptyOutput);
        }
        Ok(svg)
    }
}
