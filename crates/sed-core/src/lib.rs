//! Integrated spectral energy distributions for particle populations.
//!
//! Particles are mapped onto a rectilinear grid of physical properties with
//! multilinear (cloud-in-cell) weights, and the weighted grid is contracted
//! against a precomputed spectral table.

pub mod domain;
pub mod integration;
pub mod numerics;
pub mod spectra;

pub use domain::{ExecutionMode, SedError, SedErrorCategory, SedResult};
pub use integration::{
    IntegratedSedApi, IntegratedSedInput, SedEngine, compute_integrated_sed,
    compute_integrated_sed_with_mode,
};
