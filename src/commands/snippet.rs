use crate::cli::SnippetArgs;
use crate::commands::{read_source, report, Backends};
use crate::config::Config;
use crate::form::{Mode, Submission};
use crate::utils::Result;

pub fn snippet(args: SnippetArgs, mut config: Config) -> Result<()> {
    args.options.apply(&mut config.snippet);
    config.validate()?;

    let expression = match args.expression {
        Some(expression) => expression,
        None => read_source(None, Mode::Snippet)?,
    };
    let backends = Backends::from_config(&config)?;
    let outcome = backends.submit(&Submission::snippet(expression))?;
    report(outcome, args.options.output_path.as_deref(), config.snippet.dpi)
}
