//! The input form: mode choice, LaTeX text and output toggles.
//!
//! A filled-in form is a [`Submission`]; [`submit`] runs it against the
//! rendering and build backends. [`prompt`] fills the form interactively
//! from any line-oriented reader, pre-populating the text with an example.

use crate::document::{Pipeline, Request};
use crate::publish::Published;
use crate::snippet::{render_snippet, MathRenderer};
use crate::utils::Result;
use std::io::{self, BufRead, Write};

pub const EXAMPLE_SNIPPET: &str =
    r"\frac{1}{\sqrt{2\pi\sigma^2}} e^{-\frac{(x-\mu)^2}{2\sigma^2}}";

pub const EXAMPLE_DOCUMENT: &str = r"\documentclass[a4paper,11pt,oneside,uplatex]{jsarticle}
\usepackage[margin=1in]{geometry}
\usepackage{siunitx}
\usepackage{amsmath}
\pagestyle{empty}
\begin{document}

$f_a = \sum_{(p,q) \in C} f_{apq}$

\end{document}";

/// Line that ends multi-line text entry.
const END_OF_TEXT: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Snippet,
    Document,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Snippet => "Snippet",
            Mode::Document => "Full LaTeX Document",
        }
    }

    pub fn example(self) -> &'static str {
        match self {
            Mode::Snippet => EXAMPLE_SNIPPET,
            Mode::Document => EXAMPLE_DOCUMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub mode: Mode,
    pub source: String,
    /// Ignored in snippet mode.
    pub request: Request,
}

impl Submission {
    pub fn snippet(source: impl Into<String>) -> Self {
        Self {
            mode: Mode::Snippet,
            source: source.into(),
            request: Request::default(),
        }
    }

    pub fn document(source: impl Into<String>, request: Request) -> Self {
        Self {
            mode: Mode::Document,
            source: source.into(),
            request,
        }
    }

    /// The form as first shown: example text, PDF on, SVG off.
    pub fn default_for(mode: Mode) -> Self {
        match mode {
            Mode::Snippet => Self::snippet(EXAMPLE_SNIPPET),
            Mode::Document => Self::document(
                EXAMPLE_DOCUMENT,
                Request {
                    generate_pdf: true,
                    generate_svg: false,
                },
            ),
        }
    }
}

/// Backends a submission runs against.
pub struct Services<'a> {
    pub renderer: &'a dyn MathRenderer,
    pub pipeline: Pipeline<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Snippet { svg: String },
    Document { published: Vec<Published> },
}

pub fn submit(submission: &Submission, services: &Services) -> Result<Outcome> {
    log::debug!("Submitting {} ({} bytes)", submission.mode.label(), submission.source.len());
    match submission.mode {
        Mode::Snippet => {
            let svg = render_snippet(services.renderer, &submission.source)?;
            Ok(Outcome::Snippet { svg })
        }
        Mode::Document => {
            let published = services
                .pipeline
                .run(&submission.source, submission.request)?;
            Ok(Outcome::Document { published })
        }
    }
}

/// Asks for every form field on `output`, reading answers from `input`.
/// End of input accepts the defaults of the remaining fields.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Submission> {
    writeln!(output, "LaTeX Type")?;
    writeln!(output, "  1) {}", Mode::Snippet.label())?;
    writeln!(output, "  2) {}", Mode::Document.label())?;
    let mode = loop {
        match ask(input, output, "Select [1]: ")?.as_deref().map(str::trim) {
            None | Some("") | Some("1") => break Mode::Snippet,
            Some("2") => break Mode::Document,
            Some(other) => writeln!(output, "Unknown choice `{}`, enter 1 or 2", other)?,
        }
    };

    let mut submission = Submission::default_for(mode);
    if let Some(source) = read_text(input, output, mode)? {
        submission.source = source;
    }
    if mode == Mode::Document {
        let defaults = submission.request;
        submission.request = Request {
            generate_pdf: confirm(input, output, "Generate PDF", defaults.generate_pdf)?,
            generate_svg: confirm(input, output, "Generate SVG", defaults.generate_svg)?,
        };
    }
    Ok(submission)
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Reads multi-line text; `None` when nothing but blanks was entered.
fn read_text<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    mode: Mode,
) -> io::Result<Option<String>> {
    let subject = match mode {
        Mode::Snippet => "LaTeX Snippet",
        Mode::Document => "Full LaTeX Document",
    };
    writeln!(output, "Example:\n{}", mode.example())?;
    writeln!(
        output,
        "Enter {} (finish with a line containing only `{}`, leave empty to keep the example):",
        subject, END_OF_TEXT
    )?;
    output.flush()?;

    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == END_OF_TEXT {
            break;
        }
        lines.push(line.to_string());
    }

    let text = lines.join("\n");
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    default: bool,
) -> io::Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    let question = format!("{} [{}]: ", label, hint);
    loop {
        let answer = ask(input, output, &question)?.map(|a| a.trim().to_lowercase());
        match answer.as_deref() {
            None | Some("") => return Ok(default),
            Some("y") | Some("yes") => return Ok(true),
            Some("n") | Some("no") => return Ok(false),
            Some(_) => writeln!(output, "Please answer y or n")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Layout, PdfBuilder, SvgConverter};
    use crate::publish::Publisher;
    use crate::utils::{BuildError, ConversionError, Error, RenderError};
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    fn run_prompt(answers: &str) -> (Submission, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let submission = prompt(&mut input, &mut output).unwrap();
        (submission, String::from_utf8(output).unwrap())
    }

    #[test]
    fn empty_input_keeps_snippet_example() {
        let (submission, output) = run_prompt("");
        assert_eq!(submission, Submission::default_for(Mode::Snippet));
        assert!(output.contains("1) Snippet"));
        assert!(output.contains("2) Full LaTeX Document"));
        assert!(output.contains(EXAMPLE_SNIPPET));
    }

    #[test]
    fn custom_snippet_is_collected() {
        let (submission, _) = run_prompt("1\nx^2\n.\n");
        assert_eq!(submission, Submission::snippet("x^2"));
    }

    #[test]
    fn blank_text_keeps_document_example_and_default_toggles() {
        let (submission, output) = run_prompt("2\n.\n\n\n");
        assert_eq!(submission, Submission::default_for(Mode::Document));
        assert!(output.contains("Generate PDF [Y/n]: "));
        assert!(output.contains("Generate SVG [y/N]: "));
    }

    #[test]
    fn document_toggles_are_read() {
        let answers = "2\n\\documentclass{article}\n\\begin{document}\nhi\n\\end{document}\n.\nn\nyes\n";
        let (submission, _) = run_prompt(answers);
        assert_eq!(submission.mode, Mode::Document);
        assert_eq!(
            submission.source,
            "\\documentclass{article}\n\\begin{document}\nhi\n\\end{document}"
        );
        assert_eq!(
            submission.request,
            Request {
                generate_pdf: false,
                generate_svg: true,
            }
        );
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let (submission, output) = run_prompt("3\n2\n.\nmaybe\ny\nN\n");
        assert_eq!(submission.mode, Mode::Document);
        assert!(output.contains("Unknown choice `3`"));
        assert!(output.contains("Please answer y or n"));
        assert_eq!(
            submission.request,
            Request {
                generate_pdf: true,
                generate_svg: false,
            }
        );
    }

    #[test]
    fn snippet_mode_asks_no_toggles() {
        let (_, output) = run_prompt("1\n.\n");
        assert!(!output.contains("Generate PDF"));
    }

    struct FixedRenderer;

    impl MathRenderer for FixedRenderer {
        fn render_svg(&self, expression: &str) -> std::result::Result<String, RenderError> {
            if expression.contains("\\frac{") && !expression.contains('}') {
                return Err(RenderError::EmptyOutput);
            }
            Ok(format!("<svg><!-- {} --></svg>", expression))
        }
    }

    struct UnusedBuilder;

    impl PdfBuilder for UnusedBuilder {
        fn build(&self, _layout: &Layout) -> std::result::Result<PathBuf, BuildError> {
            panic!("build must not run");
        }
    }

    struct UnusedConverter;

    impl SvgConverter for UnusedConverter {
        fn convert(&self, _pdf: &Path, _svg: &Path) -> std::result::Result<(), ConversionError> {
            panic!("convert must not run");
        }
    }

    fn with_services<T>(f: impl FnOnce(&Services, &Path) -> T) -> T {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path(), "tex.tex", "out").unwrap();
        let publisher = Publisher::to_dir(root.path());
        let services = Services {
            renderer: &FixedRenderer,
            pipeline: Pipeline {
                layout: &layout,
                builder: &UnusedBuilder,
                converter: &UnusedConverter,
                publisher: &publisher,
            },
        };
        f(&services, root.path())
    }

    #[test]
    fn submit_snippet_returns_svg() {
        with_services(|services, root| {
            let outcome = submit(&Submission::snippet("x^2"), services).unwrap();
            assert_eq!(
                outcome,
                Outcome::Snippet {
                    svg: "<svg><!-- x^2 --></svg>".to_string()
                }
            );
            assert!(!root.join("tex.tex").exists());
        });
    }

    #[test]
    fn submit_snippet_failure_surfaces_render_error() {
        with_services(|services, _| {
            let result = submit(&Submission::snippet("\\frac{"), services);
            assert!(matches!(result, Err(Error::Render(_))));
        });
    }

    #[test]
    fn submit_document_without_toggles_only_writes_source() {
        with_services(|services, root| {
            let submission = Submission::document(EXAMPLE_DOCUMENT, Request::default());
            let outcome = submit(&submission, services).unwrap();
            assert_eq!(outcome, Outcome::Document { published: vec![] });
            assert_eq!(
                std::fs::read_to_string(root.join("tex.tex")).unwrap(),
                EXAMPLE_DOCUMENT
            );
            assert!(!root.join("out").exists());
        });
    }
}
