//! # ballexp CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and
//! dispatches to subcommand handlers.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ballexp_cli::exp::{run_exp, ExpArgs};
use ballexp_cli::load_config;
use ballexp_cli::structure::{run_structure, StructureArgs};

/// Rigorous matrix exponential in ball arithmetic.
///
/// Reads a square matrix of real or complex balls from JSON and prints an
/// enclosure of its exponential at the requested precision.
#[derive(Parser, Debug)]
#[command(name = "ballexp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit log events as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// YAML file with exponential settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute an enclosure of exp(A).
    Exp(ExpArgs),

    /// Print the reachability pattern of A's nonzero entries.
    Structure(StructureArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "ballexp starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = match &cli.command {
        Commands::Exp(args) => load_config(cli.config.as_deref())
            .and_then(|config| run_exp(args, &config, &mut out)),
        Commands::Structure(args) => run_structure(args, &mut out),
    };
    let _ = out.flush();

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
