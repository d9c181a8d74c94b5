use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use getdoc_cli::args::Cli;
use getdoc_cli::config::Config;
use getdoc_cli::{Error, run};
use getdoc_client::MongoDriver;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from(cli);
    match run(&MongoDriver, &config).and_then(|json| write_stdout(&json)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "failed");
            eprintln!("getdoc: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

// stdout carries only the result JSON, so logs go to stderr.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_stdout(json: &str) -> Result<(), Error> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}
