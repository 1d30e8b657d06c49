pub mod document;
pub mod form;
pub mod snippet;

use crate::config::Config;
use crate::document::{Layout, LatexmkBuilder, Pdf2SvgConverter, Pipeline};
use crate::form::{submit, Mode, Outcome, Services, Submission};
use crate::publish::Publisher;
use crate::snippet::{export, LatexMathRenderer};
use crate::utils::Result;
use std::{
    fs,
    io::{self, IsTerminal, Read},
    path::Path,
};

/// The production backends, built from configuration.
struct Backends {
    renderer: LatexMathRenderer,
    builder: LatexmkBuilder,
    converter: Pdf2SvgConverter,
    publisher: Publisher,
    layout: Layout,
}

impl Backends {
    fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            renderer: LatexMathRenderer::new(&config.tools, &config.snippet),
            builder: LatexmkBuilder::new(&config.tools),
            converter: Pdf2SvgConverter::new(&config.tools),
            publisher: Publisher::from_config(&config.paths),
            layout: Layout::from_config(&config.paths)?,
        })
    }

    fn submit(&self, submission: &Submission) -> Result<Outcome> {
        let services = Services {
            renderer: &self.renderer,
            pipeline: Pipeline {
                layout: &self.layout,
                builder: &self.builder,
                converter: &self.converter,
                publisher: &self.publisher,
            },
        };
        submit(submission, &services)
    }
}

/// Reads the LaTeX text from `path`, or from piped stdin. An empty or
/// interactive stdin yields the example for `mode`.
fn read_source(path: Option<&Path>, mode: Mode) -> Result<String> {
    if let Some(path) = path {
        return Ok(fs::read_to_string(path)?);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        log::info!("No input given, using the example {}", mode.label());
        return Ok(Submission::default_for(mode).source);
    }
    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        log::info!("Empty input, using the example {}", mode.label());
        Ok(Submission::default_for(mode).source)
    } else {
        Ok(buffer)
    }
}

/// Shows the outcome: the SVG on stdout or in `output_path` for snippets,
/// one notification per published file for documents.
fn report(outcome: Outcome, output_path: Option<&Path>, dpi: u32) -> Result<()> {
    match outcome {
        Outcome::Snippet { svg } => match output_path {
            Some(path) => {
                export(&svg, path, dpi)?;
                println!("✓ Snippet written to {}", path.display());
            }
            None => println!("{}", svg.trim_end()),
        },
        Outcome::Document { published } => {
            if published.is_empty() {
                println!("Nothing generated: neither PDF nor SVG was requested.");
            }
            for item in published {
                println!("✓ {}", item.notification);
            }
        }
    }
    Ok(())
}
