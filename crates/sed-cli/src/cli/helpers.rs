use super::CliError;
use anyhow::Context;
use sed_core::domain::{SedError, SedResult};
use sed_core::spectra::{
    ParticleSet, Sed, SpectralGrid, load_sed_input_deck, read_sed_json, write_sed_json,
};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub(super) struct LoadedDeck {
    pub(super) grid: SpectralGrid,
    pub(super) particles: ParticleSet,
    pub(super) escape_fraction: f64,
}

/// Load a deck and apply the grid checks the integration kernel skips.
pub(super) fn load_deck(path: &Path) -> Result<LoadedDeck, CliError> {
    let deck = load_sed_input_deck(path).map_err(SedError::from)?;
    let escape_fraction = deck.escape_fraction;
    let (grid, particles) = deck.into_parts()?;
    grid.check_axes_increasing()?;

    info!(
        path = %path.display(),
        ndim = grid.axes().len(),
        cells = grid.shape().cell_count(),
        nlam = grid.nlam(),
        npart = particles.npart(),
        "loaded SED input deck"
    );
    Ok(LoadedDeck {
        grid,
        particles,
        escape_fraction,
    })
}

/// Parse a comma separated node such as `2,0,1`.
pub(super) fn parse_node_spec(raw: &str) -> SedResult<Vec<usize>> {
    raw.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<usize>().map_err(|_| {
                SedError::input_validation(
                    "INPUT.CLI_NODE",
                    format!("invalid node index '{token}' in '{raw}'"),
                )
            })
        })
        .collect()
}

pub(super) fn read_sed(path: &Path) -> Result<Sed, CliError> {
    Ok(read_sed_json(path)?)
}

/// Write `sed` to `output` when given, otherwise print a short summary.
pub(super) fn emit_sed(sed: &Sed, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            write_sed_json(path, sed)?;
            println!("Wrote SED with {} wavelengths to {}", sed.nlam(), path.display());
        }
        None => {
            println!("{}", render_sed_summary(sed)?);
        }
    }
    Ok(())
}

fn render_sed_summary(sed: &Sed) -> anyhow::Result<String> {
    let mut lines = vec![
        format!("nlam: {}", sed.nlam()),
        format!("total: {:.8e}", sed.total()),
    ];
    if let Some((peak_index, peak)) = sed
        .lnu
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, lhs), (_, rhs)| lhs.total_cmp(rhs))
    {
        let location = match &sed.lam {
            Some(lam) => {
                let wavelength = lam
                    .get(peak_index)
                    .context("wavelength axis shorter than the spectrum")?;
                format!("lam={wavelength}")
            }
            None => format!("index={peak_index}"),
        };
        lines.push(format!("peak: {peak:.8e} at {location}"));
    }
    Ok(lines.join("\n"))
}
