use super::indexing::GridShape;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralReductionInput<'a> {
    pub weights: &'a [f64],
    pub spectral_table: &'a [f64],
    pub escape_fraction: f64,
    pub shape: &'a GridShape,
    pub nlam: usize,
}

impl<'a> SpectralReductionInput<'a> {
    pub fn new(
        weights: &'a [f64],
        spectral_table: &'a [f64],
        escape_fraction: f64,
        shape: &'a GridShape,
        nlam: usize,
    ) -> Self {
        Self {
            weights,
            spectral_table,
            escape_fraction,
            shape,
            nlam,
        }
    }
}

/// Contract the weight grid against the spectral table:
/// `spectrum[l] = sum over cells of table[cell, l] * (1 - fesc) * weight[cell]`.
///
/// Cells whose weight is not strictly positive are skipped.
pub fn reduce_spectrum(input: SpectralReductionInput<'_>) -> Vec<f64> {
    let mut spectrum = vec![0.0; input.nlam];
    reduce_cells_into(input, 0..input.weights.len(), &mut spectrum);
    spectrum
}

/// Reduce the cells in `cells` into `spectrum`, which must hold `nlam` entries.
pub fn reduce_cells_into(
    input: SpectralReductionInput<'_>,
    cells: Range<usize>,
    spectrum: &mut [f64],
) {
    debug_assert_eq!(spectrum.len(), input.nlam);
    debug_assert_eq!(input.weights.len(), input.shape.cell_count());

    let ndim = input.shape.ndim();
    let spectral_shape = input.shape.with_trailing_axis(input.nlam);
    let transmitted = 1.0 - input.escape_fraction;
    let mut coordinates = vec![0; ndim + 1];

    for cell in cells {
        let weight = input.weights[cell];
        if weight <= 0.0 {
            continue;
        }

        input.shape.unflatten(cell, &mut coordinates[..ndim]);
        coordinates[ndim] = 0;
        let base = spectral_shape.flatten(&coordinates);

        let row = &input.spectral_table[base..base + input.nlam];
        for (value, contribution) in spectrum.iter_mut().zip(row) {
            *value += contribution * transmitted * weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SpectralReductionInput, reduce_cells_into, reduce_spectrum};
    use crate::numerics::indexing::GridShape;

    #[test]
    fn reduction_scales_rows_by_weight_and_transmission() {
        let shape = GridShape::new(vec![3]);
        let table = [
            1.0, 2.0, //
            10.0, 20.0, //
            100.0, 200.0,
        ];
        let weights = [0.0, 2.0, 0.5];

        let spectrum = reduce_spectrum(SpectralReductionInput::new(
            &weights, &table, 0.25, &shape, 2,
        ));
        assert_eq!(spectrum, vec![0.75 * (20.0 + 50.0), 0.75 * (40.0 + 100.0)]);
    }

    #[test]
    fn non_positive_weights_are_skipped() {
        let shape = GridShape::new(vec![2, 2]);
        let table = [1.0, 2.0, 4.0, 8.0];
        let weights = [-1.0, 0.0, 3.0, 0.0];

        let spectrum = reduce_spectrum(SpectralReductionInput::new(
            &weights, &table, 0.0, &shape, 1,
        ));
        assert_eq!(spectrum, vec![12.0]);
    }

    #[test]
    fn full_escape_yields_zero_spectrum() {
        let shape = GridShape::new(vec![2]);
        let table = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0];
        let weights = [1.5, 2.5];

        let spectrum = reduce_spectrum(SpectralReductionInput::new(
            &weights, &table, 1.0, &shape, 3,
        ));
        assert!(spectrum.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn multidimensional_rows_follow_row_major_layout() {
        // dims [2, 3], nlam 2: row for cell (i, j) starts at (i * 3 + j) * 2.
        let shape = GridShape::new(vec![2, 3]);
        let table: Vec<f64> = (0..12u8).map(f64::from).collect();
        let mut weights = vec![0.0; 6];
        weights[4] = 1.0; // cell (1, 1)

        let spectrum = reduce_spectrum(SpectralReductionInput::new(
            &weights, &table, 0.0, &shape, 2,
        ));
        assert_eq!(spectrum, vec![8.0, 9.0]);
    }

    #[test]
    fn partial_cell_ranges_sum_to_full_reduction() {
        let shape = GridShape::new(vec![4]);
        let table = [1.0, 0.5, 2.0, 0.25, 3.0, 0.125, 4.0, 1.0];
        let weights = [1.0, 2.0, 3.0, 4.0];
        let input = SpectralReductionInput::new(&weights, &table, 0.1, &shape, 2);

        let mut head = vec![0.0; 2];
        let mut tail = vec![0.0; 2];
        reduce_cells_into(input, 0..2, &mut head);
        reduce_cells_into(input, 2..4, &mut tail);
        let full = reduce_spectrum(input);

        for wavelength in 0..2 {
            let combined = head[wavelength] + tail[wavelength];
            assert!((combined - full[wavelength]).abs() < 1.0e-12);
        }
    }
}
