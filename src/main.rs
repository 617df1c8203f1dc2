//! Qiita Sync CLI entry point.

use clap::Parser;
use qsync::cli::commands::{self, articles::Operation};
use qsync::cli::{Cli, Commands};
use qsync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("Error: {e}\n  Hint: {hint}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper_util=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let json = cli.json;
    match &cli.command {
        Commands::Download(args) => commands::articles::execute(Operation::Download, args, json),
        Commands::Upload(args) => commands::articles::execute(Operation::Upload, args, json),
        Commands::Check(args) => commands::articles::execute(Operation::Check, args, json),
        Commands::Delete(args) => commands::articles::execute(Operation::Delete, args, json),
        Commands::Sync(args) => {
            commands::articles::execute(Operation::Sync(args.on_conflict), &args.target, json)
        }
        Commands::Purge(args) => {
            commands::articles::execute(Operation::Purge(args.on_conflict), &args.target, json)
        }
        Commands::Completions { shell } => commands::completions::execute(shell),
        Commands::Version => commands::version::execute(json),
    }
}
