pub mod bracket;
pub mod indexing;
pub mod reduction;
pub mod weights;

pub use bracket::{AxisBracket, ParticleBrackets, locate_bracket};
pub use indexing::{GridShape, flatten_index, unflatten_index};
pub use reduction::{SpectralReductionInput, reduce_cells_into, reduce_spectrum};
pub use weights::{CornerTally, WeightGrid, corner_is_skipped, corner_weight};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct NumericTolerance {
    #[serde(rename = "absTol")]
    pub abs_tol: f64,
    #[serde(rename = "relTol")]
    pub rel_tol: f64,
    #[serde(rename = "relativeFloor")]
    pub relative_floor: f64,
}

impl Default for NumericTolerance {
    fn default() -> Self {
        Self {
            abs_tol: 1.0e-12,
            rel_tol: 1.0e-10,
            relative_floor: 1.0e-300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumComparison {
    pub compared_points: usize,
    pub max_abs_diff: f64,
    pub max_rel_diff: f64,
    pub first_failure: Option<usize>,
}

impl SpectrumComparison {
    pub fn passes(&self) -> bool {
        self.first_failure.is_none()
    }
}

/// Compare two spectra point by point. Lengths must already agree.
pub fn compare_spectra(
    baseline: &[f64],
    actual: &[f64],
    tolerance: NumericTolerance,
) -> SpectrumComparison {
    debug_assert_eq!(baseline.len(), actual.len());

    let mut comparison = SpectrumComparison {
        compared_points: baseline.len().min(actual.len()),
        max_abs_diff: 0.0,
        max_rel_diff: 0.0,
        first_failure: None,
    };

    for (index, (&expected, &value)) in baseline.iter().zip(actual).enumerate() {
        let abs_diff = (value - expected).abs();
        let rel_diff = relative_difference(expected, value, tolerance.relative_floor);
        comparison.max_abs_diff = comparison.max_abs_diff.max(abs_diff);
        comparison.max_rel_diff = comparison.max_rel_diff.max(rel_diff);

        let passes = within_tolerance(
            expected,
            value,
            tolerance.abs_tol,
            tolerance.rel_tol,
            tolerance.relative_floor,
        );
        if !passes && comparison.first_failure.is_none() {
            comparison.first_failure = Some(index);
        }
    }

    comparison
}

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

pub fn relative_difference(lhs: f64, rhs: f64, relative_floor: f64) -> f64 {
    let scale = lhs.abs().max(rhs.abs()).max(relative_floor);
    (lhs - rhs).abs() / scale
}

pub fn within_tolerance(
    lhs: f64,
    rhs: f64,
    abs_tol: f64,
    rel_tol: f64,
    relative_floor: f64,
) -> bool {
    let abs_diff = (lhs - rhs).abs();
    abs_diff <= abs_tol || relative_difference(lhs, rhs, relative_floor) <= rel_tol
}

#[cfg(test)]
mod tests {
    use super::{
        NumericTolerance, compare_spectra, relative_difference, stable_sum, within_tolerance,
    };

    #[test]
    fn stable_sum_reduces_order_loss_for_large_and_small_values() {
        let input = [1.0e16, 1.0, -1.0e16];
        assert_eq!(stable_sum(&input), 0.0);
    }

    #[test]
    fn relative_difference_uses_relative_floor() {
        let diff = relative_difference(0.0, 1.0e-10, 1.0e-6);
        assert!((diff - 1.0e-4).abs() < 1.0e-12);
    }

    #[test]
    fn within_tolerance_accepts_abs_or_relative_match() {
        assert!(within_tolerance(10.0, 10.001, 1.0e-2, 1.0e-6, 1.0e-12));
        assert!(within_tolerance(1000.0, 1000.2, 1.0e-6, 5.0e-4, 1.0e-12));
        assert!(!within_tolerance(1.0, 1.1, 1.0e-3, 1.0e-3, 1.0e-12));
    }

    #[test]
    fn compare_spectra_reports_first_failing_point() {
        let tolerance = NumericTolerance {
            abs_tol: 1.0e-9,
            rel_tol: 1.0e-3,
            relative_floor: 1.0e-12,
        };
        let baseline = [1.0, 2.0, 3.0, 4.0];
        let actual = [1.0, 2.0005, 3.1, 4.2];

        let comparison = compare_spectra(&baseline, &actual, tolerance);
        assert_eq!(comparison.compared_points, 4);
        assert_eq!(comparison.first_failure, Some(2));
        assert!(!comparison.passes());
        assert!((comparison.max_abs_diff - 0.2).abs() < 1.0e-12);
    }

    #[test]
    fn identical_spectra_pass_with_default_tolerance() {
        let spectrum = [0.0, 1.0e-30, 5.0e20];
        let comparison = compare_spectra(&spectrum, &spectrum, NumericTolerance::default());
        assert!(comparison.passes());
        assert_eq!(comparison.max_abs_diff, 0.0);
    }
}
