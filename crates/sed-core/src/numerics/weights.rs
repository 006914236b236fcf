use super::bracket::ParticleBrackets;
use super::indexing::GridShape;

/// Bookkeeping for the corners touched while depositing particles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerTally {
    /// Mass actually added to the grid.
    pub deposited_mass: f64,
    pub written_corners: usize,
    /// Corners removed by the edge-skip rule.
    pub skipped_corners: usize,
    /// Corners whose index lands on the beyond-grid sentinel.
    pub dropped_corners: usize,
}

impl CornerTally {
    pub fn merge(&mut self, other: CornerTally) {
        self.deposited_mass += other.deposited_mass;
        self.written_corners += other.written_corners;
        self.skipped_corners += other.skipped_corners;
        self.dropped_corners += other.dropped_corners;
    }
}

/// Whether corner `selector` (bit `i` picks the high side of axis `i`) is
/// excluded by the edge rule: the high side of an axis whose bracket sits on
/// the first node or on the beyond-grid sentinel with a zero fraction.
pub fn corner_is_skipped(
    selector: usize,
    low: &[usize],
    fractions: &[f64],
    dims: &[usize],
) -> bool {
    (0..low.len()).any(|axis| {
        selector_bit(selector, axis)
            && fractions[axis] == 0.0
            && (low[axis] == 0 || low[axis] == dims[axis])
    })
}

/// Multilinear weight of corner `selector` for a particle of `mass`.
pub fn corner_weight(selector: usize, mass: f64, fractions: &[f64]) -> f64 {
    let mut weight = mass;
    for (axis, fraction) in fractions.iter().copied().enumerate() {
        if selector_bit(selector, axis) {
            weight *= fraction;
        } else {
            weight *= 1.0 - fraction;
        }
    }
    weight
}

#[inline]
fn selector_bit(selector: usize, axis: usize) -> bool {
    (selector >> axis) & 1 == 1
}

/// Dense accumulator of particle mass on the grid nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightGrid {
    shape: GridShape,
    weights: Vec<f64>,
    corner: Vec<usize>,
}

impl WeightGrid {
    pub fn zeros(shape: GridShape) -> Self {
        let weights = vec![0.0; shape.cell_count()];
        let corner = vec![0; shape.ndim()];
        Self {
            shape,
            weights,
            corner,
        }
    }

    /// Spread `mass` over the `2^ndim` corners of the particle's hypercube.
    ///
    /// Corners are visited as the bit patterns `0..2^ndim`. Skipped corners
    /// and corners that would index past the grid contribute nothing, so an
    /// out-of-range particle can deposit less than its mass.
    pub fn deposit(&mut self, mass: f64, brackets: &ParticleBrackets) -> CornerTally {
        let ndim = self.shape.ndim();
        debug_assert_eq!(brackets.ndim(), ndim);

        let low = brackets.low();
        let fractions = brackets.fractions();
        let dims = self.shape.dims();
        let mut tally = CornerTally::default();

        for selector in 0..(1usize << ndim) {
            if corner_is_skipped(selector, low, fractions, dims) {
                tally.skipped_corners += 1;
                continue;
            }

            let mut in_grid = true;
            for axis in 0..ndim {
                let index = low[axis] + usize::from(selector_bit(selector, axis));
                if index >= dims[axis] {
                    in_grid = false;
                    break;
                }
                self.corner[axis] = index;
            }
            if !in_grid {
                tally.dropped_corners += 1;
                continue;
            }

            let weight = corner_weight(selector, mass, fractions);
            let flat = self.shape.flatten(&self.corner);
            self.weights[flat] += weight;
            tally.deposited_mass += weight;
            tally.written_corners += 1;
        }

        tally
    }

    /// Add another accumulator of the same shape into this one, cell by cell.
    pub fn merge(&mut self, other: &WeightGrid) {
        debug_assert_eq!(self.shape, other.shape);
        for (cell, weight) in self.weights.iter_mut().zip(&other.weights) {
            *cell += *weight;
        }
    }

    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn populated_cells(&self) -> usize {
        self.weights.iter().filter(|weight| **weight > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{WeightGrid, corner_is_skipped, corner_weight};
    use crate::numerics::bracket::ParticleBrackets;
    use crate::numerics::indexing::GridShape;

    fn deposit_one(
        grid_axes: &[&[f64]],
        values: &[f64],
        mass: f64,
    ) -> (WeightGrid, super::CornerTally) {
        let dims: Vec<usize> = grid_axes.iter().map(|axis| axis.len()).collect();
        let columns: Vec<[f64; 1]> = values.iter().map(|value| [*value]).collect();
        let properties: Vec<&[f64]> = columns.iter().map(|column| column.as_slice()).collect();

        let mut brackets = ParticleBrackets::new(grid_axes.len());
        brackets.locate(grid_axes, &properties, 0);

        let mut grid = WeightGrid::zeros(GridShape::new(dims));
        let tally = grid.deposit(mass, &brackets);
        (grid, tally)
    }

    #[test]
    fn one_dimensional_midpoint_splits_mass_evenly() {
        let axis = [0.0, 1.0, 2.0];
        let grid_axes: [&[f64]; 1] = [&axis];
        let (grid, tally) = deposit_one(&grid_axes, &[1.5], 10.0);
        assert_eq!(grid.weights(), &[0.0, 5.0, 5.0]);
        assert_eq!(tally.written_corners, 2);
        assert_eq!(tally.deposited_mass, 10.0);
    }

    #[test]
    fn node_coincident_particle_lands_on_that_node_only() {
        let axis = [0.0, 1.0, 2.0];
        let grid_axes: [&[f64]; 1] = [&axis];
        let (grid, _) = deposit_one(&grid_axes, &[1.0], 4.0);
        assert_eq!(grid.weights(), &[0.0, 4.0, 0.0]);

        let (grid, tally) = deposit_one(&grid_axes, &[0.0], 4.0);
        assert_eq!(grid.weights(), &[4.0, 0.0, 0.0]);
        assert_eq!(tally.skipped_corners, 1);
    }

    #[test]
    fn interior_particle_conserves_mass_in_three_dimensions() {
        let ages = [6.0, 6.5, 7.0, 8.0];
        let metals = [0.0, 0.01, 0.02];
        let dust = [0.0, 0.5, 1.0, 2.0, 3.0];
        let grid_axes: [&[f64]; 3] = [&ages, &metals, &dust];
        let (grid, tally) = deposit_one(&grid_axes, &[6.8, 0.004, 2.25], 3.5);

        let total: f64 = grid.weights().iter().sum();
        assert!((total - 3.5).abs() < 1.0e-12, "total={total}");
        assert_eq!(tally.written_corners, 8);
        assert_eq!(tally.skipped_corners + tally.dropped_corners, 0);
        assert!(grid.weights().iter().all(|weight| *weight >= 0.0));
    }

    #[test]
    fn particle_beyond_last_node_loses_its_mass() {
        let axis = [0.0, 1.0, 2.0];
        let grid_axes: [&[f64]; 1] = [&axis];
        let (grid, tally) = deposit_one(&grid_axes, &[2.5], 10.0);
        assert_eq!(grid.weights(), &[0.0, 0.0, 0.0]);
        assert_eq!(tally.skipped_corners, 1);
        assert_eq!(tally.dropped_corners, 1);
        assert_eq!(tally.deposited_mass, 0.0);
    }

    #[test]
    fn partially_out_of_range_particle_deposits_less_than_mass() {
        let ages = [0.0, 1.0, 2.0];
        let metals = [0.0, 1.0];
        let grid_axes: [&[f64]; 2] = [&ages, &metals];
        let (grid, tally) = deposit_one(&grid_axes, &[0.5, 1.5], 8.0);

        let total: f64 = grid.weights().iter().sum();
        assert!(total < 8.0);
        assert_eq!(total, tally.deposited_mass);
        assert!(tally.skipped_corners + tally.dropped_corners > 0);
    }

    #[test]
    fn particle_below_first_node_clamps_onto_first_node() {
        let ages = [0.0, 1.0, 2.0];
        let metals = [0.0, 1.0];
        let grid_axes: [&[f64]; 2] = [&ages, &metals];
        let (grid, tally) = deposit_one(&grid_axes, &[-3.0, 0.25], 8.0);

        // Cells are laid out row-major: index = age * 2 + metal.
        assert_eq!(grid.weights(), &[6.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(tally.skipped_corners, 2);
    }

    #[test]
    fn deposits_accumulate_across_particles() {
        let axis = [0.0, 1.0, 2.0];
        let values = [0.5, 0.5, 1.5];
        let grid_axes: [&[f64]; 1] = [&axis];
        let properties: [&[f64]; 1] = [&values];
        let mut brackets = ParticleBrackets::new(1);
        let mut grid = WeightGrid::zeros(GridShape::new(vec![3]));
        for particle in 0..values.len() {
            brackets.locate(&grid_axes, &properties, particle);
            grid.deposit(2.0, &brackets);
        }
        assert_eq!(grid.weights(), &[2.0, 3.0, 1.0]);
        assert_eq!(grid.populated_cells(), 3);
    }

    #[test]
    fn skip_rule_only_targets_high_side_of_edge_brackets() {
        let dims = [3, 4];
        assert!(corner_is_skipped(0b01, &[0, 2], &[0.0, 0.5], &dims));
        assert!(corner_is_skipped(0b10, &[1, 4], &[0.5, 0.0], &dims));
        assert!(!corner_is_skipped(0b00, &[0, 4], &[0.0, 0.0], &dims));
        // Interior bracket with zero fraction keeps its (zero-weight) high side.
        assert!(!corner_is_skipped(0b01, &[1, 2], &[0.0, 0.5], &dims));
    }

    #[test]
    fn corner_weights_form_a_partition_of_mass() {
        let fractions = [0.2, 0.7, 0.45];
        let total: f64 = (0..8)
            .map(|selector| corner_weight(selector, 2.0, &fractions))
            .sum();
        assert!((total - 2.0).abs() < 1.0e-14);
        assert!((corner_weight(0b101, 2.0, &fractions) - 2.0 * 0.2 * 0.3 * 0.45).abs() < 1.0e-15);
    }

    #[test]
    fn merge_adds_cellwise() {
        let axis = [0.0, 1.0, 2.0];
        let grid_axes: [&[f64]; 1] = [&axis];
        let (mut left, _) = deposit_one(&grid_axes, &[0.5], 2.0);
        let (right, _) = deposit_one(&grid_axes, &[1.5], 2.0);
        left.merge(&right);
        assert_eq!(left.weights(), &[1.0, 2.0, 1.0]);
    }
}
