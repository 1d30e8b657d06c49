//! Layered configuration loading.
//!
//! Sources in priority order, highest wins:
//! 1. Command-line flags (applied by the subcommands after loading)
//! 2. Environment variables (`TEXRENDER_*` prefix, `__` as section separator)
//! 3. A file passed with `--config`
//! 4. Project-level `texrender.toml` in the current directory
//! 5. User-level `~/.config/texrender/config.toml`
//! 6. Built-in defaults
//!
//! `TEXRENDER_PATHS__OUT_DIR=build` maps to `paths.out_dir`,
//! `TEXRENDER_SNIPPET__DPI=300` to `snippet.dpi`.

use crate::utils::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = "texrender.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub snippet: SnippetConfig,
}

/// Where documents are written, built and published.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory holding the LaTeX source; external tools run here.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// File name the submitted document is written to.
    #[serde(default = "default_input_name")]
    pub input_name: String,

    /// Build output directory, relative to `work_dir` unless absolute.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Directory receiving published copies. Defaults to the desktop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_dir: Option<PathBuf>,

    /// Build every run into its own timestamped subdirectory of `out_dir`.
    #[serde(default)]
    pub per_run_dirs: bool,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_input_name() -> String {
    "tex.tex".to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            input_name: default_input_name(),
            out_dir: default_out_dir(),
            publish_dir: None,
            per_run_dirs: false,
        }
    }
}

/// Names of the external programs and their extra arguments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_latexmk")]
    pub latexmk: String,
    /// Extra arguments placed before `-outdir` (e.g. `["-pdfdvi"]`).
    #[serde(default)]
    pub latexmk_args: Vec<String>,
    #[serde(default = "default_pdfcrop")]
    pub pdfcrop: String,
    #[serde(default = "default_pdf2svg")]
    pub pdf2svg: String,
    #[serde(default = "default_latex")]
    pub latex: String,
    /// Extra arguments placed before the snippet options of `latex`.
    #[serde(default)]
    pub latex_args: Vec<String>,
    #[serde(default = "default_dvisvgm")]
    pub dvisvgm: String,
    #[serde(default)]
    pub dvisvgm_args: Vec<String>,
}

fn default_latexmk() -> String {
    "latexmk".to_string()
}

fn default_pdfcrop() -> String {
    "pdfcrop".to_string()
}

fn default_pdf2svg() -> String {
    "pdf2svg".to_string()
}

fn default_latex() -> String {
    "latex".to_string()
}

fn default_dvisvgm() -> String {
    "dvisvgm".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            latexmk: default_latexmk(),
            latexmk_args: Vec::new(),
            pdfcrop: default_pdfcrop(),
            pdf2svg: default_pdf2svg(),
            latex: default_latex(),
            latex_args: Vec::new(),
            dvisvgm: default_dvisvgm(),
            dvisvgm_args: Vec::new(),
        }
    }
}

const fn default_font_size() -> u32 {
    12
}

const fn default_dpi() -> u32 {
    400
}

/// Snippet typesetting options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnippetConfig {
    /// Font size in points.
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Resolution used when a snippet is rasterized.
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Parent of the per-render scratch directories. Defaults to the
    /// system temporary directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            dpi: default_dpi(),
            scratch_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources, with `explicit` layered above
    /// the discovered files. Values are checked by [`Config::validate`] once
    /// command-line flags have been applied.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit.filter(|path| !path.is_file()) {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        Ok(Self::figment(explicit).extract()?)
    }

    /// Build the provider chain.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("TEXRENDER_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("texrender").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snippet.font_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "snippet.font_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.snippet.dpi == 0 {
            return Err(ConfigError::InvalidValue {
                field: "snippet.dpi".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let input = Path::new(&self.paths.input_name);
        if input.extension().and_then(|ext| ext.to_str()) != Some("tex")
            || input.components().count() != 1
        {
            return Err(ConfigError::InvalidValue {
                field: "paths.input_name".to_string(),
                reason: format!("`{}` is not a plain .tex file name", self.paths.input_name),
            });
        }
        Ok(())
    }
}
