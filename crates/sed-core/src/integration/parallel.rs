use super::{GridAccumulation, IntegratedSedInput, accumulate_range};
use crate::numerics::{
    CornerTally, GridShape, SpectralReductionInput, WeightGrid, reduce_cells_into,
};
use rayon::prelude::*;
use std::ops::Range;

/// Split `0..len` into at most one contiguous range per worker thread.
fn chunk_ranges(len: usize) -> Vec<Range<usize>> {
    let threads = rayon::current_num_threads().max(1);
    let chunk_size = len.div_ceil(threads).max(1);
    let mut ranges = Vec::with_capacity(threads);
    let mut start = 0;
    while start < len {
        let end = (start + chunk_size).min(len);
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Each chunk of particles fills a private grid; the partial grids are then
/// summed in chunk order so the result does not depend on scheduling.
pub(super) fn accumulate(input: &IntegratedSedInput<'_>, shape: GridShape) -> GridAccumulation {
    let partials: Vec<GridAccumulation> = chunk_ranges(input.npart())
        .into_par_iter()
        .map(|particles| accumulate_range(input, shape.clone(), particles))
        .collect();

    let mut grid = WeightGrid::zeros(shape);
    let mut tally = CornerTally::default();
    for partial in &partials {
        grid.merge(&partial.grid);
        tally.merge(partial.tally);
    }

    GridAccumulation { grid, tally }
}

pub(super) fn reduce(input: SpectralReductionInput<'_>) -> Vec<f64> {
    let partials: Vec<Vec<f64>> = chunk_ranges(input.weights.len())
        .into_par_iter()
        .map(|cells| {
            let mut partial = vec![0.0; input.nlam];
            reduce_cells_into(input, cells, &mut partial);
            partial
        })
        .collect();

    let mut spectrum = vec![0.0; input.nlam];
    for partial in &partials {
        for (value, contribution) in spectrum.iter_mut().zip(partial) {
            *value += contribution;
        }
    }
    spectrum
}
