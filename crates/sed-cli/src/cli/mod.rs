mod commands;
mod helpers;
mod logging;

use clap::Parser;
use sed_core::domain::SedError;

pub fn run_from_env() -> i32 {
    if let Err(error) = logging::init_tracing() {
        eprintln!("WARNING: {error}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let sed_error = error.as_sed_error();
            eprintln!("{}", sed_error.diagnostic_line());
            eprintln!("{}", sed_error.fatal_exit_line());
            sed_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("synth-sed".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
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
#[command(
    name = "synth-sed",
    version,
    about = "Integrated spectral energy distributions from particle populations"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Integrate the SED of every particle in an input deck
    Integrate(commands::IntegrateArgs),
    /// Sum the spectra stored at one or more grid nodes
    NodeSed(commands::NodeSedArgs),
    /// Compare two SED files within a numeric tolerance
    Compare(commands::CompareArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Integrate(args) => commands::run_integrate_command(args),
        CliCommand::NodeSed(args) => commands::run_node_sed_command(args),
        CliCommand::Compare(args) => commands::run_compare_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(SedError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SedError> for CliError {
    fn from(error: SedError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_sed_error(&self) -> SedError {
        match self {
            Self::Usage(message) => SedError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => SedError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};
    use sed_core::domain::SedErrorCategory;

    #[test]
    fn help_and_version_exit_successfully() {
        assert_eq!(run(["--help"]).expect("help"), 0);
        assert_eq!(run(["--version"]).expect("version"), 0);
    }

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let error = run(["interpolate"]).expect_err("unknown command");
        assert!(matches!(error, CliError::Usage(_)));
        let sed_error = error.as_sed_error();
        assert_eq!(sed_error.placeholder(), "INPUT.CLI_USAGE");
        assert_eq!(sed_error.category(), SedErrorCategory::InputValidationError);
    }

    #[test]
    fn internal_errors_map_to_io_exit_code() {
        let error = CliError::from(anyhow::anyhow!("disk vanished"));
        assert_eq!(error.as_sed_error().exit_code(), 3);
    }
}
