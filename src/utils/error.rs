use std::{io, path::PathBuf};
use thiserror::Error;

/// Failure of a single external program invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` {status}{}", diagnostics_suffix(.diagnostics))]
    Failed {
        program: String,
        status: String,
        diagnostics: String,
    },
}

fn diagnostics_suffix(diagnostics: &str) -> String {
    if diagnostics.is_empty() {
        String::new()
    } else {
        format!(":\n{diagnostics}")
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unable to prepare render context: {0}")]
    Io(#[from] io::Error),

    #[error("Math typesetting failed: {0}")]
    Typeset(#[from] ToolError),

    #[error("Math expression is empty")]
    EmptyInput,

    #[error("Renderer produced no SVG output")]
    EmptyOutput,

    #[error("Unable to export image: {0}")]
    Export(String),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unable to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("LaTeX build failed: {0}")]
    Build(#[source] ToolError),

    #[error("PDF crop failed: {0}")]
    Crop(#[source] ToolError),

    #[error("Build finished but {} was not produced", .0.display())]
    MissingOutput(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("PDF to SVG conversion failed: {0}")]
    Convert(#[from] ToolError),

    #[error("Conversion finished but {} was not produced", .0.display())]
    MissingOutput(PathBuf),
}

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Unable to locate the desktop directory")]
    NoDesktop,

    #[error("Destination directory does not exist: {}", .0.display())]
    MissingDestination(PathBuf),

    #[error("Unable to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Configuration file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
