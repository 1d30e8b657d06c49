use crate::config::ToolsConfig;
use crate::document::{ArtifactKind, Layout, PdfBuilder, SvgConverter};
use crate::utils::{run_tool, BuildError, ConversionError};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// `latexmk` followed by an in-place `pdfcrop`.
#[derive(Debug, Clone)]
pub struct LatexmkBuilder {
    latexmk: String,
    latexmk_args: Vec<String>,
    pdfcrop: String,
}

impl LatexmkBuilder {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            latexmk: tools.latexmk.clone(),
            latexmk_args: tools.latexmk_args.clone(),
            pdfcrop: tools.pdfcrop.clone(),
        }
    }

    fn latexmk_command_args(&self, layout: &Layout) -> Vec<OsString> {
        let mut outdir = OsString::from("-outdir=");
        outdir.push(layout.out_dir());

        let mut args: Vec<OsString> = self.latexmk_args.iter().map(OsString::from).collect();
        args.push(outdir);
        args.push(layout.tex_path().into_os_string());
        args
    }
}

impl PdfBuilder for LatexmkBuilder {
    fn build(&self, layout: &Layout) -> Result<PathBuf, BuildError> {
        log::info!("Building {}", layout.tex_path().display());
        run_tool(
            &self.latexmk,
            &self.latexmk_command_args(layout),
            Some(layout.work_dir()),
        )
        .map_err(BuildError::Build)?;

        let pdf = layout.artifact_path(ArtifactKind::Pdf);
        if !pdf.is_file() {
            return Err(BuildError::MissingOutput(pdf));
        }

        run_tool(&self.pdfcrop, [&pdf, &pdf], Some(layout.work_dir())).map_err(BuildError::Crop)?;
        log::info!("Built {}", pdf.display());
        Ok(pdf)
    }
}

/// `pdf2svg <pdf> <svg>`.
#[derive(Debug, Clone)]
pub struct Pdf2SvgConverter {
    program: String,
}

impl Pdf2SvgConverter {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            program: tools.pdf2svg.clone(),
        }
    }
}

impl SvgConverter for Pdf2SvgConverter {
    fn convert(&self, pdf: &Path, svg: &Path) -> Result<(), ConversionError> {
        run_tool(&self.program, [pdf, svg], None)?;
        if !svg.is_file() {
            return Err(ConversionError::MissingOutput(svg.to_path_buf()));
        }
        log::info!("Converted {} to {}", pdf.display(), svg.display());
        Ok(())
    }
}
