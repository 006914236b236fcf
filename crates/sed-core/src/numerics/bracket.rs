/// Bracketing position of one value on one grid axis.
///
/// `low` is the lower node of the bracket. For values beyond the last node it
/// is the axis length itself, a sentinel with no node behind it. `fraction` is
/// the normalized distance toward the high node and is zero whenever the value
/// lies outside the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBracket {
    pub low: usize,
    pub fraction: f64,
}

/// Locate `value` on a strictly increasing `nodes` axis (at least two nodes).
///
/// Values at or below the first node clamp to `low = 0`; values above the last
/// node map to the `low = nodes.len()` sentinel. Interior values are found by
/// bisection, with ties resolved toward the lower bracket.
pub fn locate_bracket(nodes: &[f64], value: f64) -> AxisBracket {
    debug_assert!(nodes.len() >= 2, "grid axes need at least two nodes");

    let mut low = 0;
    let mut high = nodes.len() - 1;

    if value <= nodes[low] {
        return AxisBracket {
            low: 0,
            fraction: 0.0,
        };
    }
    if value > nodes[high] {
        return AxisBracket {
            low: nodes.len(),
            fraction: 0.0,
        };
    }

    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if nodes[mid] < value {
            low = mid;
        } else {
            high = mid;
        }
    }

    AxisBracket {
        low,
        fraction: (value - nodes[low]) / (nodes[high] - nodes[low]),
    }
}

/// Per-particle scratch holding the low-corner indices and fractions on
/// every axis. Reused across particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBrackets {
    low: Vec<usize>,
    fractions: Vec<f64>,
}

impl ParticleBrackets {
    pub fn new(ndim: usize) -> Self {
        Self {
            low: vec![0; ndim],
            fractions: vec![0.0; ndim],
        }
    }

    /// Bracket particle `particle` on every axis. `properties[axis]` is the
    /// column of that property across all particles.
    pub fn locate(&mut self, grid_axes: &[&[f64]], properties: &[&[f64]], particle: usize) {
        debug_assert_eq!(grid_axes.len(), self.low.len());
        debug_assert_eq!(properties.len(), self.low.len());

        for (axis, nodes) in grid_axes.iter().enumerate() {
            let bracket = locate_bracket(nodes, properties[axis][particle]);
            self.low[axis] = bracket.low;
            self.fractions[axis] = bracket.fraction;
        }
    }

    pub fn low(&self) -> &[usize] {
        &self.low
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    pub fn ndim(&self) -> usize {
        self.low.len()
    }
}
