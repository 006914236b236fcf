use super::grid::{GridAxis, SpectralGrid};
use crate::domain::{SedError, SedResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// JSON input deck: a spectral grid, a particle set and an escape fraction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SedInputDeck {
    pub grid: GridDeck,
    pub particles: ParticleDeck,
    #[serde(default)]
    pub escape_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GridDeck {
    pub axes: Vec<AxisDeck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lam: Option<Vec<f64>>,
    /// Required when `lam` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nlam: Option<usize>,
    pub spectra: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AxisDeck {
    pub name: String,
    pub nodes: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParticleDeck {
    pub properties: Vec<PropertyDeck>,
    pub masses: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PropertyDeck {
    pub name: String,
    pub values: Vec<f64>,
}

/// Particle properties in grid-axis order plus per-particle masses.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    pub properties: Vec<Vec<f64>>,
    pub masses: Vec<f64>,
}

impl ParticleSet {
    pub fn property_columns(&self) -> Vec<&[f64]> {
        self.properties.iter().map(Vec::as_slice).collect()
    }

    pub fn npart(&self) -> usize {
        self.masses.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SedDeckError {
    #[error("failed to read SED input deck '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse SED input deck '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<SedDeckError> for SedError {
    fn from(error: SedDeckError) -> Self {
        match &error {
            SedDeckError::Read { .. } => SedError::io_system("IO.SED_DECK_READ", error.to_string()),
            SedDeckError::Parse { .. } => {
                SedError::input_validation("INPUT.SED_DECK_PARSE", error.to_string())
            }
        }
    }
}

pub fn load_sed_input_deck(path: impl AsRef<Path>) -> Result<SedInputDeck, SedDeckError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SedDeckError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| SedDeckError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl SedInputDeck {
    /// Split the deck into a validated grid and a particle set whose property
    /// columns follow the grid axis order.
    pub fn into_parts(self) -> SedResult<(SpectralGrid, ParticleSet)> {
        let GridDeck {
            axes,
            lam,
            nlam,
            spectra,
        } = self.grid;

        let nlam = match (&lam, nlam) {
            (Some(lam), Some(nlam)) if lam.len() != nlam => {
                return Err(SedError::input_validation(
                    "INPUT.SED_WAVELENGTHS",
                    format!(
                        "deck declares nlam={nlam} but its wavelength axis has {} entries",
                        lam.len()
                    ),
                ));
            }
            (Some(lam), _) => lam.len(),
            (None, Some(nlam)) => nlam,
            (None, None) => {
                return Err(SedError::input_validation(
                    "INPUT.SED_NLAM",
                    "deck must provide either 'lam' or 'nlam'",
                ));
            }
        };

        let ParticleDeck { properties, masses } = self.particles;
        if properties.len() != axes.len() {
            return Err(SedError::input_validation(
                "INPUT.SED_PARTICLES",
                format!(
                    "deck has {} grid axes but {} particle properties",
                    axes.len(),
                    properties.len()
                ),
            ));
        }
        for (axis, property) in axes.iter().zip(&properties) {
            if axis.name != property.name {
                return Err(SedError::input_validation(
                    "INPUT.SED_PARTICLES",
                    format!(
                        "particle property '{}' does not match grid axis '{}'; properties must follow axis order",
                        property.name, axis.name
                    ),
                ));
            }
        }

        let grid = SpectralGrid::new(
            axes.into_iter()
                .map(|axis| GridAxis::new(axis.name, axis.nodes))
                .collect(),
            lam,
            spectra,
            nlam,
        )?;
        let particles = ParticleSet {
            properties: properties.into_iter().map(|property| property.values).collect(),
            masses,
        };

        Ok((grid, particles))
    }
}
