pub mod errors;

pub use errors::{SedError, SedErrorCategory, SedResult};

use std::fmt::{Display, Formatter};

/// Upper bound on grid axes; corner selectors are enumerated as bit patterns.
pub const MAX_GRID_AXES: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    #[default]
    Serial,
    Parallel,
}

impl ExecutionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
        }
    }
}

impl Display for ExecutionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
