//! Flat <-> multi-dimensional index conversion for the weight grid and the
//! spectral table.
//!
//! Both directions use the same row-major layout: the last axis varies
//! fastest. `flatten` accumulates strides from the last axis backward and
//! `unflatten` peels digits off starting with the last axis, so the pair
//! composes to the identity on `[0, cell_count)`.

use crate::domain::{SedError, SedResult};

/// Row-major flat index of `multi_index` within a grid of extent `dims`.
pub fn flatten_index(multi_index: &[usize], dims: &[usize]) -> usize {
    debug_assert_eq!(multi_index.len(), dims.len());

    let mut index = 0;
    let mut stride = 1;
    for axis in (0..dims.len()).rev() {
        index += stride * multi_index[axis];
        stride *= dims[axis];
    }
    index
}

/// Decompose `flat` into per-axis coordinates, writing them into `indices`.
pub fn unflatten_index(flat: usize, dims: &[usize], indices: &mut [usize]) {
    debug_assert_eq!(indices.len(), dims.len());

    let mut remainder = flat;
    for axis in (0..dims.len()).rev() {
        indices[axis] = remainder % dims[axis];
        remainder /= dims[axis];
    }
}

/// Extents of an N-dimensional grid together with its row-major strides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridShape {
    dims: Vec<usize>,
    strides: Vec<usize>,
    cell_count: usize,
}

impl GridShape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        let dims = dims.into();
        let mut strides = vec![0; dims.len()];
        let mut stride = 1usize;
        for axis in (0..dims.len()).rev() {
            strides[axis] = stride;
            stride *= dims[axis];
        }

        Self {
            dims,
            strides,
            cell_count: stride,
        }
    }

    /// Checked constructor for grids whose extents come from callers: rejects
    /// dimension lists whose cell count overflows `usize`.
    pub fn try_new(dims: impl Into<Vec<usize>>) -> SedResult<Self> {
        let dims = dims.into();
        dims.iter()
            .try_fold(1usize, |count, extent| count.checked_mul(*extent))
            .ok_or_else(|| {
                SedError::input_validation(
                    "INPUT.SED_SPECTRA",
                    format!("grid with dimensions {dims:?} has more cells than fit in memory"),
                )
            })?;
        Ok(Self::new(dims))
    }

    /// Shape of this grid with one more trailing axis of length `len`.
    pub fn with_trailing_axis(&self, len: usize) -> Self {
        let mut dims = self.dims.clone();
        dims.push(len);
        Self::new(dims)
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn flatten(&self, multi_index: &[usize]) -> usize {
        flatten_index(multi_index, &self.dims)
    }

    pub fn unflatten(&self, flat: usize, indices: &mut [usize]) {
        unflatten_index(flat, &self.dims, indices);
    }

    pub fn contains(&self, multi_index: &[usize]) -> bool {
        multi_index.len() == self.dims.len()
            && multi_index
                .iter()
                .zip(&self.dims)
                .all(|(index, extent)| index < extent)
    }
}
