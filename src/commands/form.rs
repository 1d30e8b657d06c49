use crate::cli::FormArgs;
use crate::commands::{report, Backends};
use crate::config::Config;
use crate::form::prompt;
use crate::utils::Result;
use std::io;

pub fn form(args: FormArgs, mut config: Config) -> Result<()> {
    args.snippet.apply(&mut config.snippet);
    args.paths.apply(&mut config.paths);
    config.validate()?;

    // Questions go to stderr so a snippet's SVG can be piped from stdout.
    let submission = prompt(&mut io::stdin().lock(), &mut io::stderr())?;
    let backends = Backends::from_config(&config)?;
    let outcome = backends.submit(&submission)?;
    report(outcome, args.snippet.output_path.as_deref(), config.snippet.dpi)
}
