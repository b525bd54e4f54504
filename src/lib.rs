// src/lib.rs

//! # clusterless_intensity_rs
//!
//! State-conditioned place-field intensity for clusterless decoding.
//!
//! Each spike is tied to the animal's linear position in the time bin it
//! occurred in. Restricting those spikes to one discrete behavioral state
//! (a track segment, a running direction) and smoothing them with a Gaussian
//! kernel over position, divided by the equally smoothed occupancy of that
//! state and by the time-bin duration, gives the firing intensity as a
//! function of position. The curve is returned renormalized to sum to 1,
//! together with the occupancy it was divided by.
//!
//! ```
//! use clusterless_intensity_rs::{estimate_conditional_intensity, StateMembership};
//! use ndarray::{array, Array2};
//!
//! let trajectory = Array2::from_shape_fn((6, 1), |(t, _)| t as f64);
//! let bins = array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
//! let state = StateMembership::new((0..6).collect());
//!
//! let result = estimate_conditional_intensity(
//!     trajectory.view(), &[2, 2, 3], &state, 1.0, bins.view(), 1.0,
//! ).unwrap();
//! assert!((result.rate.sum() - 1.0).abs() < 1e-12);
//! ```
//!
//! Batches of states or units run in parallel through
//! [`estimate_all_states`] and [`estimate_all_units`]; each single estimate is
//! a plain synchronous computation.
//!
//! With the `python` feature the crate builds the `_rs` extension module.

pub mod config;
pub mod error;
pub mod io;
pub mod processors;
#[cfg(feature = "python")]
mod python;

pub use config::EstimatorConfig;
pub use error::{IntensityError, Result};
pub use processors::spike_analytics::{
    bin_centers_from_edges,
    estimate_all_states,
    estimate_all_units,
    estimate_conditional_intensity,
    estimate_with_config,
    filter_spikes_to_state,
    occupancy,
    ConditionalIntensity,
    StateMembership,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// Python module entry point
#[cfg(feature = "python")]
#[pymodule]
fn _rs(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // conditional intensity functions
    m.add_function(wrap_pyfunction!(python::compute_conditional_intensity, py)?)?;
    m.add_function(wrap_pyfunction!(python::compute_conditional_intensity_all_states, py)?)?;
    Ok(())
}
