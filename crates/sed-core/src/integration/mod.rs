//! Integrated SED orchestration.
//!
//! A computation validates the borrowed input view, brackets and deposits
//! every particle into a freshly allocated weight grid, then contracts that
//! grid against the spectral table. All working buffers are owned by the call
//! and dropped on return.

mod parallel;

use crate::domain::{ExecutionMode, MAX_GRID_AXES, SedError, SedResult};
use crate::numerics::{
    CornerTally, GridShape, ParticleBrackets, SpectralReductionInput, WeightGrid, reduce_spectrum,
};
use std::ops::Range;
use tracing::{debug, debug_span};

/// Borrowed view over caller-owned arrays describing one computation.
///
/// `grid_axes[i]` holds the nodes of axis `i`; `particle_properties[i]` holds
/// the matching property of every particle. `spectral_table` is row-major over
/// `[grid_dims..., nlam]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratedSedInput<'a> {
    pub spectral_table: &'a [f64],
    pub grid_axes: &'a [&'a [f64]],
    pub particle_properties: &'a [&'a [f64]],
    pub particle_masses: &'a [f64],
    pub escape_fraction: f64,
    pub grid_dims: &'a [usize],
    pub nlam: usize,
}

impl<'a> IntegratedSedInput<'a> {
    pub fn new(
        spectral_table: &'a [f64],
        grid_axes: &'a [&'a [f64]],
        particle_properties: &'a [&'a [f64]],
        particle_masses: &'a [f64],
        escape_fraction: f64,
        grid_dims: &'a [usize],
        nlam: usize,
    ) -> Self {
        Self {
            spectral_table,
            grid_axes,
            particle_properties,
            particle_masses,
            escape_fraction,
            grid_dims,
            nlam,
        }
    }

    pub fn ndim(&self) -> usize {
        self.grid_dims.len()
    }

    pub fn npart(&self) -> usize {
        self.particle_masses.len()
    }
}

/// Populated weight grid plus the corner bookkeeping gathered while filling it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAccumulation {
    pub grid: WeightGrid,
    pub tally: CornerTally,
}

pub trait IntegratedSedApi {
    fn compute_integrated_sed(&self, input: IntegratedSedInput<'_>) -> SedResult<Vec<f64>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SedEngine {
    pub execution_mode: ExecutionMode,
}

impl SedEngine {
    pub fn new(execution_mode: ExecutionMode) -> Self {
        Self { execution_mode }
    }
}

impl IntegratedSedApi for SedEngine {
    fn compute_integrated_sed(&self, input: IntegratedSedInput<'_>) -> SedResult<Vec<f64>> {
        compute_integrated_sed_with_mode(input, self.execution_mode)
    }
}

pub fn compute_integrated_sed(input: IntegratedSedInput<'_>) -> SedResult<Vec<f64>> {
    compute_integrated_sed_with_mode(input, ExecutionMode::Serial)
}

pub fn compute_integrated_sed_with_mode(
    input: IntegratedSedInput<'_>,
    mode: ExecutionMode,
) -> SedResult<Vec<f64>> {
    let span = debug_span!(
        "integrated_sed",
        ndim = input.ndim(),
        npart = input.npart(),
        nlam = input.nlam,
        mode = %mode
    );
    let _guard = span.enter();

    let accumulation = accumulate_grid_weights(input, mode)?;
    let reduction = SpectralReductionInput::new(
        accumulation.grid.weights(),
        input.spectral_table,
        input.escape_fraction,
        accumulation.grid.shape(),
        input.nlam,
    );

    let spectrum = match mode {
        ExecutionMode::Serial => reduce_spectrum(reduction),
        ExecutionMode::Parallel => parallel::reduce(reduction),
    };

    debug!(
        populated_cells = accumulation.grid.populated_cells(),
        "reduced weight grid into spectrum"
    );
    check_finite(&spectrum)?;
    Ok(spectrum)
}

/// Overflowing tables or NaN masses surface here rather than in the output.
fn check_finite(spectrum: &[f64]) -> SedResult<()> {
    match spectrum.iter().position(|value| !value.is_finite()) {
        Some(bin) => Err(SedError::computation(
            "COMPUTE.SED_NON_FINITE",
            format!(
                "integrated spectrum is not finite at wavelength bin {bin} ({})",
                spectrum[bin]
            ),
        )),
        None => Ok(()),
    }
}

/// Run only the accumulation phase: bracket every particle and deposit its
/// mass into a new weight grid.
pub fn accumulate_grid_weights(
    input: IntegratedSedInput<'_>,
    mode: ExecutionMode,
) -> SedResult<GridAccumulation> {
    let shape = validate_input(&input)?;

    let accumulation = match mode {
        ExecutionMode::Serial => accumulate_range(&input, shape, 0..input.npart()),
        ExecutionMode::Parallel => parallel::accumulate(&input, shape),
    };

    let total_mass: f64 = input.particle_masses.iter().sum();
    debug!(
        deposited_mass = accumulation.tally.deposited_mass,
        total_mass,
        written_corners = accumulation.tally.written_corners,
        skipped_corners = accumulation.tally.skipped_corners,
        dropped_corners = accumulation.tally.dropped_corners,
        "accumulated particle weights"
    );
    Ok(accumulation)
}

fn accumulate_range(
    input: &IntegratedSedInput<'_>,
    shape: GridShape,
    particles: Range<usize>,
) -> GridAccumulation {
    let mut brackets = ParticleBrackets::new(shape.ndim());
    let mut grid = WeightGrid::zeros(shape);
    let mut tally = CornerTally::default();

    for particle in particles {
        brackets.locate(input.grid_axes, input.particle_properties, particle);
        tally.merge(grid.deposit(input.particle_masses[particle], &brackets));
    }

    GridAccumulation { grid, tally }
}

/// Boundary checks run before any buffer is allocated.
///
/// Axis monotonicity is not checked here; callers that load
/// grids from outside sources should use
/// [`SpectralGrid::check_axes_increasing`](crate::spectra::SpectralGrid::check_axes_increasing).
pub fn validate_input(input: &IntegratedSedInput<'_>) -> SedResult<GridShape> {
    let ndim = input.ndim();
    if ndim == 0 {
        return Err(SedError::input_validation(
            "INPUT.SED_NDIM",
            "grid must have at least one axis",
        ));
    }
    if ndim > MAX_GRID_AXES {
        return Err(SedError::input_validation(
            "INPUT.SED_NDIM",
            format!("grid has {ndim} axes; at most {MAX_GRID_AXES} are supported"),
        ));
    }
    if input.npart() == 0 {
        return Err(SedError::input_validation(
            "INPUT.SED_NPART",
            "particle set must contain at least one particle",
        ));
    }
    if input.nlam == 0 {
        return Err(SedError::input_validation(
            "INPUT.SED_NLAM",
            "spectral table must have at least one wavelength",
        ));
    }

    if input.grid_axes.len() != ndim {
        return Err(SedError::input_validation(
            "INPUT.SED_GRID_AXES",
            format!(
                "expected {ndim} grid axes to match grid dims, got {}",
                input.grid_axes.len()
            ),
        ));
    }
    for (axis, (nodes, dim)) in input.grid_axes.iter().zip(input.grid_dims).enumerate() {
        if nodes.len() != *dim {
            return Err(SedError::input_validation(
                "INPUT.SED_GRID_AXES",
                format!(
                    "grid axis {axis} has {} nodes but its dimension is {dim}",
                    nodes.len()
                ),
            ));
        }
        if *dim < 2 {
            return Err(SedError::input_validation(
                "INPUT.SED_GRID_AXES",
                format!("grid axis {axis} needs at least 2 nodes, got {dim}"),
            ));
        }
    }

    if input.particle_properties.len() != ndim {
        return Err(SedError::input_validation(
            "INPUT.SED_PARTICLES",
            format!(
                "expected {ndim} particle property columns, got {}",
                input.particle_properties.len()
            ),
        ));
    }
    let npart = input.npart();
    for (axis, column) in input.particle_properties.iter().enumerate() {
        if column.len() != npart {
            return Err(SedError::input_validation(
                "INPUT.SED_PARTICLES",
                format!(
                    "particle property column {axis} has {} values for {npart} particles",
                    column.len()
                ),
            ));
        }
    }

    let shape = GridShape::try_new(input.grid_dims.to_vec())?;
    let expected_table = shape
        .cell_count()
        .checked_mul(input.nlam)
        .ok_or_else(|| {
            SedError::input_validation(
                "INPUT.SED_SPECTRA",
                "spectral table size overflows the address space",
            )
        })?;
    if input.spectral_table.len() != expected_table {
        return Err(SedError::input_validation(
            "INPUT.SED_SPECTRA",
            format!(
                "spectral table has {} values, expected {} grid cells x {} wavelengths = {expected_table}",
                input.spectral_table.len(),
                shape.cell_count(),
                input.nlam
            ),
        ));
    }

    Ok(shape)
}
