use super::CliError;
use super::helpers::{emit_sed, load_deck, parse_node_spec, read_sed};
use sed_core::domain::{ExecutionMode, SedError, SedResult};
use sed_core::numerics::{NumericTolerance, compare_spectra};
use sed_core::spectra::{integrate_particles, sum_node_seds};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct IntegrateArgs {
    /// SED input deck (JSON)
    #[arg(long)]
    input: PathBuf,

    /// Write the integrated SED as JSON instead of printing a summary
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override the deck's escape fraction
    #[arg(long)]
    escape_fraction: Option<f64>,

    /// Accumulate particles on the rayon thread pool
    #[arg(long)]
    parallel: bool,
}

impl IntegrateArgs {
    fn execution_mode(&self) -> ExecutionMode {
        if self.parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Serial
        }
    }
}

#[derive(clap::Args)]
pub(super) struct NodeSedArgs {
    /// SED input deck (JSON); only its grid is used
    #[arg(long)]
    input: PathBuf,

    /// Grid node as comma separated indices, one per axis (repeatable)
    #[arg(long = "node", value_name = "i,j,...", required = true)]
    nodes: Vec<String>,

    /// Write the summed SED as JSON instead of printing a summary
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct CompareArgs {
    /// Reference SED (JSON)
    #[arg(long)]
    baseline: PathBuf,

    /// SED under test (JSON)
    #[arg(long)]
    actual: PathBuf,

    /// Absolute tolerance per wavelength bin
    #[arg(long)]
    abs_tol: Option<f64>,

    /// Relative tolerance per wavelength bin
    #[arg(long)]
    rel_tol: Option<f64>,
}

impl CompareArgs {
    fn tolerance(&self) -> NumericTolerance {
        let defaults = NumericTolerance::default();
        NumericTolerance {
            abs_tol: self.abs_tol.unwrap_or(defaults.abs_tol),
            rel_tol: self.rel_tol.unwrap_or(defaults.rel_tol),
            relative_floor: defaults.relative_floor,
        }
    }
}

pub(super) fn run_integrate_command(args: IntegrateArgs) -> Result<i32, CliError> {
    let deck = load_deck(&args.input)?;
    let escape_fraction = args.escape_fraction.unwrap_or(deck.escape_fraction);

    let sed = integrate_particles(
        &deck.grid,
        &deck.particles,
        escape_fraction,
        args.execution_mode(),
    )?;
    emit_sed(&sed, args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_node_sed_command(args: NodeSedArgs) -> Result<i32, CliError> {
    let deck = load_deck(&args.input)?;
    let nodes = args
        .nodes
        .iter()
        .map(|raw| parse_node_spec(raw))
        .collect::<SedResult<Vec<_>>>()?;

    let sed = sum_node_seds(&deck.grid, &nodes)?;
    emit_sed(&sed, args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_compare_command(args: CompareArgs) -> Result<i32, CliError> {
    let baseline = read_sed(&args.baseline)?;
    let actual = read_sed(&args.actual)?;
    if baseline.nlam() != actual.nlam() {
        return Err(CliError::Compute(SedError::input_validation(
            "INPUT.CLI_COMPARE",
            format!(
                "baseline '{}' has {} wavelengths but actual '{}' has {}",
                args.baseline.display(),
                baseline.nlam(),
                args.actual.display(),
                actual.nlam()
            ),
        )));
    }

    let comparison = compare_spectra(&baseline.lnu, &actual.lnu, args.tolerance());
    println!("compared points: {}", comparison.compared_points);
    println!("max abs diff: {:.6e}", comparison.max_abs_diff);
    println!("max rel diff: {:.6e}", comparison.max_rel_diff);

    match comparison.first_failure {
        None => {
            println!("PASS");
            Ok(0)
        }
        Some(index) => {
            println!(
                "FAIL at index {index}: baseline={:.10e} actual={:.10e}",
                baseline.lnu[index], actual.lnu[index]
            );
            Ok(1)
        }
    }
}
