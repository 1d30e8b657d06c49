pub mod error;
pub use error::{BuildError, ConfigError, ConversionError, CopyError, Error, RenderError, ToolError};

pub mod process;
pub use process::run_tool;

pub mod util;
pub use util::{handle_error_and_exit, Result};
