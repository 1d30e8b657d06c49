use crate::config::{PathsConfig, SnippetConfig};
use chrono::Datelike;
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::{
    io::Write,
    path::{Path, PathBuf},
};

type ArgResult<T> = std::result::Result<T, String>;

const MAX_DPI: u32 = 4800;

#[derive(Parser)]
#[command(name="texrender",
          author="texrender developers",
          version,
          about="Render LaTeX snippets and documents to PDF and SVG",
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) {}     texrender developers
External tools (latex, dvisvgm, latexmk, pdfcrop, pdf2svg) must be on PATH.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(global = true)]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,

    #[clap(long = "config")]
    #[clap(global = true)]
    #[clap(value_name = "CONFIG")]
    #[clap(help = "TOML configuration file layered over texrender.toml")]
    #[arg(value_parser = check_file_exists)]
    pub config_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Render a math snippet to SVG, PNG or PDF")]
    Snippet(SnippetArgs),
    #[clap(about = "Build a full LaTeX document to PDF and/or SVG")]
    Document(DocumentArgs),
    #[clap(about = "Fill in the input form interactively")]
    Form(FormArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Snippet(_) => "snippet",
            Command::Document(_) => "document",
            Command::Form(_) => "form",
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct SnippetOptions {
    #[clap(help_heading("Snippet"))]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Write the snippet image here instead of printing SVG to stdout")]
    #[clap(value_name = "IMAGE")]
    #[arg(value_parser = check_image_path)]
    pub output_path: Option<PathBuf>,

    #[clap(help_heading("Snippet"))]
    #[clap(long = "dpi")]
    #[clap(value_name = "DPI")]
    #[clap(help = "Resolution of PNG output [default: 400]")]
    #[arg(value_parser = dpi_in_range)]
    pub dpi: Option<u32>,

    #[clap(help_heading("Snippet"))]
    #[clap(long = "font-size")]
    #[clap(value_name = "PT")]
    #[clap(help = "Font size in points [default: 12]")]
    #[arg(value_parser = font_size_in_range)]
    pub font_size: Option<u32>,
}

impl SnippetOptions {
    pub fn apply(&self, snippet: &mut SnippetConfig) {
        if let Some(dpi) = self.dpi {
            snippet.dpi = dpi;
        }
        if let Some(font_size) = self.font_size {
            snippet.font_size = font_size;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PathOptions {
    #[clap(help_heading("Paths"))]
    #[clap(long = "work-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help = "Directory the document source is written to [default: .]")]
    pub work_dir: Option<PathBuf>,

    #[clap(help_heading("Paths"))]
    #[clap(long = "out-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help = "Build output directory, relative to the work directory [default: out]")]
    pub out_dir: Option<PathBuf>,

    #[clap(help_heading("Paths"))]
    #[clap(long = "publish-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help = "Directory receiving copies of the results [default: desktop]")]
    pub publish_dir: Option<PathBuf>,

    #[clap(help_heading("Paths"))]
    #[clap(long = "per-run-dirs")]
    #[clap(help = "Build each run into its own timestamped output directory")]
    pub per_run_dirs: bool,
}

impl PathOptions {
    pub fn apply(&self, paths: &mut PathsConfig) {
        if let Some(dir) = &self.work_dir {
            paths.work_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            paths.out_dir = dir.clone();
        }
        if let Some(dir) = &self.publish_dir {
            paths.publish_dir = Some(dir.clone());
        }
        if self.per_run_dirs {
            paths.per_run_dirs = true;
        }
    }
}

#[derive(Parser, Debug)]
pub struct SnippetArgs {
    #[clap(value_name = "EXPRESSION")]
    #[clap(help = "Math expression without $ delimiters (read from stdin if omitted)")]
    pub expression: Option<String>,

    #[command(flatten)]
    pub options: SnippetOptions,
}

#[derive(Parser, Debug)]
pub struct DocumentArgs {
    #[clap(value_name = "TEX")]
    #[clap(help = "LaTeX document to build (read from stdin if omitted)")]
    #[arg(value_parser = check_file_exists)]
    pub input_path: Option<PathBuf>,

    #[clap(long = "no-pdf")]
    #[clap(help = "Do not publish the PDF")]
    pub no_pdf: bool,

    #[clap(long = "svg")]
    #[clap(help = "Convert the PDF to SVG and publish it")]
    pub svg: bool,

    #[command(flatten)]
    pub paths: PathOptions,
}

#[derive(Parser, Debug)]
pub struct FormArgs {
    #[command(flatten)]
    pub snippet: SnippetOptions,

    #[command(flatten)]
    pub paths: PathOptions,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> ArgResult<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn check_image_path(s: &str) -> ArgResult<PathBuf> {
    let path = check_prefix_path(s)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match extension.as_deref() {
        Some("svg") | Some("png") | Some("pdf") => Ok(path),
        _ => Err("Image must have an extension of .svg, .png, or .pdf".to_string()),
    }
}

fn check_file_exists(s: &str) -> ArgResult<PathBuf> {
    let path = Path::new(s);
    if !path.is_file() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn dpi_in_range(s: &str) -> ArgResult<u32> {
    let dpi: u32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid resolution", s))?;
    if (1..=MAX_DPI).contains(&dpi) {
        Ok(dpi)
    } else {
        Err(format!("Resolution must be between 1 and {} dpi", MAX_DPI))
    }
}

fn font_size_in_range(s: &str) -> ArgResult<u32> {
    let size: u32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid font size", s))?;
    if (1..=144).contains(&size) {
        Ok(size)
    } else {
        Err("Font size must be between 1 and 144 pt".to_string())
    }
}
