//! crdiff CLI - compare CustomResourceDefinitions and detect breaking changes

use std::process::ExitCode;

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod error;
mod exit_codes;
mod logging;

use commands::compare::CompareArgs;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "crdiff")]
#[command(version)]
#[command(about = "Compare CustomResourceDefinitions and detect breaking changes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable colored output
    #[arg(long, global = true, env = "FORCE_COLOR", value_parser = FalseyValueParser::new())]
    color: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    no_color: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all differences between two sets of CRDs
    Diff(CompareArgs),

    /// Show only breaking changes between two sets of CRDs
    Breaking(CompareArgs),

    /// Print the application version and exit
    Version,
}

fn main() -> ExitCode {
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(exit_codes::USAGE_ERROR)
            } else {
                ExitCode::from(exit_codes::SUCCESS)
            };
        }
    };

    logging::init(cli.verbose, cli.output == OutputFormat::Text);

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let color = resolve_color(cli.color, cli.no_color);

    match cli.command {
        Commands::Diff(args) => commands::diff::run(&args, cli.output, color?),
        Commands::Breaking(args) => commands::breaking::run(&args, cli.output, color?),
        Commands::Version => commands::version::run(cli.output),
    }
}

/// Resolve the color flags, falling back to terminal detection
fn resolve_color(force: bool, disable: bool) -> Result<bool> {
    match (force, disable) {
        (true, true) => Err(CliError::usage("cannot combine --no-color with --color")),
        (true, false) => Ok(true),
        (false, true) => Ok(false),
        (false, false) => Ok(console::colors_enabled()),
    }
}
