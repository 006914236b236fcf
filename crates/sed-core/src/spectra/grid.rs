use super::sed::Sed;
use crate::domain::{SedError, SedResult};
use crate::numerics::GridShape;

#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    pub name: String,
    pub nodes: Vec<f64>,
}

impl GridAxis {
    pub fn new(name: impl Into<String>, nodes: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }
}

/// Precomputed spectra on a rectilinear grid of physical properties.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralGrid {
    axes: Vec<GridAxis>,
    lam: Option<Vec<f64>>,
    spectra: Vec<f64>,
    shape: GridShape,
    nlam: usize,
}

impl SpectralGrid {
    /// Build a grid, checking that `spectra` holds one row of `nlam` values
    /// per grid node in row-major order.
    pub fn new(
        axes: Vec<GridAxis>,
        lam: Option<Vec<f64>>,
        spectra: Vec<f64>,
        nlam: usize,
    ) -> SedResult<Self> {
        if axes.is_empty() {
            return Err(SedError::input_validation(
                "INPUT.SED_NDIM",
                "spectral grid must have at least one axis",
            ));
        }
        if nlam == 0 {
            return Err(SedError::input_validation(
                "INPUT.SED_NLAM",
                "spectral grid must have at least one wavelength",
            ));
        }
        if let Some(lam) = &lam {
            if lam.len() != nlam {
                return Err(SedError::input_validation(
                    "INPUT.SED_WAVELENGTHS",
                    format!("wavelength axis has {} entries, expected {nlam}", lam.len()),
                ));
            }
        }

        let shape =
            GridShape::try_new(axes.iter().map(|axis| axis.nodes.len()).collect::<Vec<_>>())?;
        let expected = shape.cell_count().checked_mul(nlam).ok_or_else(|| {
            SedError::input_validation(
                "INPUT.SED_SPECTRA",
                "spectral table size overflows the address space",
            )
        })?;
        if spectra.len() != expected {
            return Err(SedError::input_validation(
                "INPUT.SED_SPECTRA",
                format!(
                    "spectral table has {} values, expected {} grid cells x {nlam} wavelengths = {expected}",
                    spectra.len(),
                    shape.cell_count()
                ),
            ));
        }

        Ok(Self {
            axes,
            lam,
            spectra,
            shape,
            nlam,
        })
    }

    /// Caller-side check for malformed axes; the integration kernel itself
    /// assumes strictly increasing nodes.
    pub fn check_axes_increasing(&self) -> SedResult<()> {
        for axis in &self.axes {
            if axis.nodes.len() < 2 {
                return Err(SedError::input_validation(
                    "INPUT.SED_GRID_AXES",
                    format!(
                        "grid axis '{}' needs at least 2 nodes, got {}",
                        axis.name,
                        axis.nodes.len()
                    ),
                ));
            }
            for (index, pair) in axis.nodes.windows(2).enumerate() {
                if !(pair[1] > pair[0]) {
                    return Err(SedError::input_validation(
                        "INPUT.SED_GRID_AXES",
                        format!(
                            "grid axis '{}' must be strictly increasing, index {} has {} after {}",
                            axis.name,
                            index + 1,
                            pair[1],
                            pair[0]
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Spectrum stored at the grid node `node` (one index per axis).
    pub fn node_sed(&self, node: &[usize]) -> SedResult<Sed> {
        if !self.shape.contains(node) {
            return Err(SedError::input_validation(
                "INPUT.SED_NODE",
                format!(
                    "node {node:?} is outside the grid with dimensions {:?}",
                    self.shape.dims()
                ),
            ));
        }

        let mut coordinates = node.to_vec();
        coordinates.push(0);
        let base = self.shape.with_trailing_axis(self.nlam).flatten(&coordinates);
        Sed::new(self.lam.clone(), self.spectra[base..base + self.nlam].to_vec())
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn axis_nodes(&self) -> Vec<&[f64]> {
        self.axes.iter().map(|axis| axis.nodes.as_slice()).collect()
    }

    pub fn lam(&self) -> Option<&[f64]> {
        self.lam.as_deref()
    }

    pub fn spectra(&self) -> &[f64] {
        &self.spectra
    }

    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    pub fn nlam(&self) -> usize {
        self.nlam
    }
}
