mod commands;
mod helpers;

use clap::Parser;
use nuisance_core::domain::NuisanceError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let error = error.as_nuisance_error();
            eprintln!("{}", error.diagnostic_line());
            if let Some(summary_line) = error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("nuisance".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "nuisance", about = "Wave-packet neutrino oscillation engine")]
struct Cli {
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Compute e/mu/tau probability surfaces over the configured grid
    Grid(commands::GridArgs),
    /// Evaluate a single transition probability with the reference parameters
    Probability(commands::ProbabilityArgs),
    /// Print the default configuration as JSON
    Config,
}

fn dispatch_parsed(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        CliCommand::Grid(args) => commands::run_grid_command(args, cli.verbose),
        CliCommand::Probability(args) => commands::run_probability_command(args, cli.verbose),
        CliCommand::Config => commands::run_config_command(cli.verbose),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(NuisanceError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<NuisanceError> for CliError {
    fn from(error: NuisanceError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_nuisance_error(&self) -> NuisanceError {
        match self {
            Self::Usage(message) => {
                NuisanceError::configuration("CONFIG.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => NuisanceError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
