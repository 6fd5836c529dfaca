//! Common utility functions
//!
//! Numeric kernels shared by the spectral, time-domain and fractal
//! calculators.

pub mod numeric;

pub use numeric::{
    argmax,
    diff,
    diff_mean,
    is_flat,
    linear_regression_slope,
    mean,
    population_variance,
    trapezoid,
};
