use crate::domain::{SedError, SedResult};
use crate::numerics::stable_sum;
use serde::{Deserialize, Serialize};

/// A spectral energy distribution: luminosity per wavelength bin.
///
/// `lam` is optional because a spectral table can be supplied without its
/// wavelength axis; when present it has one entry per `lnu` value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Sed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lam: Option<Vec<f64>>,
    pub lnu: Vec<f64>,
}

impl Sed {
    pub fn new(lam: Option<Vec<f64>>, lnu: Vec<f64>) -> SedResult<Self> {
        if let Some(lam) = &lam {
            if lam.len() != lnu.len() {
                return Err(SedError::input_validation(
                    "INPUT.SED_WAVELENGTHS",
                    format!(
                        "wavelength axis has {} entries but the spectrum has {}",
                        lam.len(),
                        lnu.len()
                    ),
                ));
            }
        }
        Ok(Self { lam, lnu })
    }

    pub fn nlam(&self) -> usize {
        self.lnu.len()
    }

    /// Sum of the luminosity over all bins.
    pub fn total(&self) -> f64 {
        stable_sum(&self.lnu)
    }

    /// Elementwise sum of two spectra defined on the same wavelength axis.
    pub fn combine(&self, other: &Sed) -> SedResult<Sed> {
        if self.nlam() != other.nlam() {
            return Err(SedError::input_validation(
                "INPUT.SED_COMBINE",
                format!(
                    "cannot combine spectra with {} and {} wavelengths",
                    self.nlam(),
                    other.nlam()
                ),
            ));
        }
        let lam = match (&self.lam, &other.lam) {
            (Some(lhs), Some(rhs)) if lhs != rhs => {
                return Err(SedError::input_validation(
                    "INPUT.SED_COMBINE",
                    "cannot combine spectra defined on different wavelength axes",
                ));
            }
            (Some(lam), _) | (None, Some(lam)) => Some(lam.clone()),
            (None, None) => None,
        };

        let lnu = self
            .lnu
            .iter()
            .zip(&other.lnu)
            .map(|(lhs, rhs)| lhs + rhs)
            .collect();
        Ok(Sed { lam, lnu })
    }
}
