use clap::Parser;
use texrender::{
    cli::{init_verbose, Cli, Command},
    commands::{document, form, snippet},
    config::Config,
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        cli.command.name()
    );
    let config = Config::load(cli.config_path.as_deref())?;
    match cli.command {
        Command::Snippet(args) => snippet::snippet(args, config)?,
        Command::Document(args) => document::document(args, config)?,
        Command::Form(args) => form::form(args, config)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
