pub mod deck;
pub mod grid;
pub mod sed;

pub use deck::{
    AxisDeck, GridDeck, ParticleDeck, ParticleSet, PropertyDeck, SedDeckError, SedInputDeck,
    load_sed_input_deck,
};
pub use grid::{GridAxis, SpectralGrid};
pub use sed::Sed;

use crate::domain::{ExecutionMode, SedError, SedResult};
use crate::integration::{IntegratedSedInput, compute_integrated_sed_with_mode};
use std::fs;
use std::path::Path;

/// Integrated SED of `particles` on `grid`, carrying the grid's wavelength axis.
pub fn integrate_particles(
    grid: &SpectralGrid,
    particles: &ParticleSet,
    escape_fraction: f64,
    mode: ExecutionMode,
) -> SedResult<Sed> {
    let grid_axes = grid.axis_nodes();
    let properties = particles.property_columns();
    let input = IntegratedSedInput::new(
        grid.spectra(),
        &grid_axes,
        &properties,
        &particles.masses,
        escape_fraction,
        grid.shape().dims(),
        grid.nlam(),
    );

    let lnu = compute_integrated_sed_with_mode(input, mode)?;
    Sed::new(grid.lam().map(<[f64]>::to_vec), lnu)
}

/// Sum of the spectra stored at each of `nodes`.
pub fn sum_node_seds(grid: &SpectralGrid, nodes: &[Vec<usize>]) -> SedResult<Sed> {
    let (first, rest) = nodes.split_first().ok_or_else(|| {
        SedError::input_validation("INPUT.SED_NODE", "at least one grid node is required")
    })?;

    let mut total = grid.node_sed(first)?;
    for node in rest {
        total = total.combine(&grid.node_sed(node)?)?;
    }
    Ok(total)
}

pub fn write_sed_json(path: impl AsRef<Path>, sed: &Sed) -> SedResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| {
            SedError::io_system(
                "IO.SED_OUTPUT_DIR",
                format!(
                    "failed to create output directory '{}': {source}",
                    parent.display()
                ),
            )
        })?;
    }

    let rendered = serde_json::to_string_pretty(sed).map_err(|source| {
        SedError::internal(
            "SYS.SED_SERIALIZE",
            format!("failed to serialize SED: {source}"),
        )
    })?;
    fs::write(path, rendered).map_err(|source| {
        SedError::io_system(
            "IO.SED_OUTPUT",
            format!("failed to write SED '{}': {source}", path.display()),
        )
    })
}

pub fn read_sed_json(path: impl AsRef<Path>) -> SedResult<Sed> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| {
        SedError::io_system(
            "IO.SED_INPUT",
            format!("failed to read SED '{}': {source}", path.display()),
        )
    })?;
    let sed: Sed = serde_json::from_str(&source).map_err(|source| {
        SedError::input_validation(
            "INPUT.SED_PARSE",
            format!("failed to parse SED '{}': {source}", path.display()),
        )
    })?;
    Sed::new(sed.lam, sed.lnu)
}
