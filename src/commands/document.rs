use crate::cli::DocumentArgs;
use crate::commands::{read_source, report, Backends};
use crate::config::Config;
use crate::document::Request;
use crate::form::{Mode, Submission};
use crate::utils::Result;

pub fn document(args: DocumentArgs, mut config: Config) -> Result<()> {
    args.paths.apply(&mut config.paths);
    config.validate()?;

    let source = read_source(args.input_path.as_deref(), Mode::Document)?;
    let request = Request {
        generate_pdf: !args.no_pdf,
        generate_svg: args.svg,
    };
    let backends = Backends::from_config(&config)?;
    let outcome = backends.submit(&Submission::document(source, request))?;
    report(outcome, None, config.snippet.dpi)
}
