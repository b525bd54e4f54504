// src/python.rs

use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::config::EstimatorConfig;
use crate::error::IntensityError;
use crate::processors::spike_analytics::{
    estimate_all_states, estimate_conditional_intensity, StateMembership,
};

impl From<IntensityError> for PyErr {
    fn from(err: IntensityError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string())
    }
}

fn to_indices(name: &str, values: &[i64]) -> PyResult<Vec<usize>> {
    values
        .iter()
        .map(|&v| {
            usize::try_from(v).map_err(|_| {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                    "{name} must be non-negative, got {v}"
                ))
            })
        })
        .collect()
}

/// Compute the state-conditioned intensity of spiking over position
///
/// Args:
///     position_trajectory: Linear position (shape: n_time_bins × n_channels)
///     spike_bin_indices: Time bin index of every spike
///     state_index: Time bin indices belonging to the state
///     bandwidth: Gaussian kernel standard deviation (position units)
///     place_bins: Position bin centers
///     bin_duration: Duration of one time bin (seconds)
///     state_channel: Trajectory column of the state (default 0)
///
/// Returns:
///     Tuple of (rate summing to 1, occupancy)
#[pyfunction]
#[pyo3(signature = (position_trajectory, spike_bin_indices, state_index, bandwidth, place_bins, bin_duration, state_channel=None))]
pub fn compute_conditional_intensity(
    py: Python<'_>,
    position_trajectory: PyReadonlyArray2<f64>,
    spike_bin_indices: PyReadonlyArray1<i64>,
    state_index: PyReadonlyArray1<i64>,
    bandwidth: f64,
    place_bins: PyReadonlyArray1<f64>,
    bin_duration: f64,
    state_channel: Option<usize>,
) -> PyResult<(Py<PyArray1<f64>>, Py<PyArray1<f64>>)> {
    // Convert inputs to Rust arrays
    let trajectory = position_trajectory.as_array().to_owned();
    let bins = place_bins.as_array().to_owned();
    let spikes = to_indices("spike_bin_indices", &spike_bin_indices.as_array().to_vec())?;
    let state = StateMembership::with_channel(
        state_channel.unwrap_or(0),
        to_indices("state_index", &state_index.as_array().to_vec())?,
    );

    // Allow Python threads to run during computation
    let result = Python::allow_threads(py, || {
        estimate_conditional_intensity(trajectory.view(), &spikes, &state, bandwidth, bins.view(), bin_duration)
    })?;

    Ok((
        result.rate.into_pyarray(py).into(),
        result.occupancy.into_pyarray(py).into(),
    ))
}

/// Compute the conditional intensity for several states in parallel
///
/// Args:
///     position_trajectory: Linear position (shape: n_time_bins × n_channels)
///     spike_bin_indices: Time bin index of every spike
///     state_indices: One array of time bin indices per state
///     state_channels: Trajectory column of each state
///     bandwidth: Gaussian kernel standard deviation (position units)
///     place_bins: Position bin centers
///     bin_duration: Duration of one time bin (seconds)
///
/// Returns:
///     List with one dictionary per state (rate, occupancy, n_spikes or error)
#[pyfunction]
pub fn compute_conditional_intensity_all_states(
    py: Python<'_>,
    position_trajectory: PyReadonlyArray2<f64>,
    spike_bin_indices: PyReadonlyArray1<i64>,
    state_indices: Vec<PyReadonlyArray1<i64>>,
    state_channels: Vec<usize>,
    bandwidth: f64,
    place_bins: PyReadonlyArray1<f64>,
    bin_duration: f64,
) -> PyResult<PyObject> {
    if state_indices.len() != state_channels.len() {
        return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
            "state_indices and state_channels must have the same length",
        ));
    }

    let trajectory = position_trajectory.as_array().to_owned();
    let bins = place_bins.as_array().to_owned();
    let spikes = to_indices("spike_bin_indices", &spike_bin_indices.as_array().to_vec())?;
    let states = state_indices
        .iter()
        .zip(&state_channels)
        .map(|(idx, &channel)| {
            Ok(StateMembership::with_channel(
                channel,
                to_indices("state_indices", &idx.as_array().to_vec())?,
            ))
        })
        .collect::<PyResult<Vec<_>>>()?;
    let config = EstimatorConfig::new(bandwidth, bin_duration);

    let results = Python::allow_threads(py, || {
        estimate_all_states(trajectory.view(), &spikes, &states, bins.view(), &config)
    });

    let state_list = PyList::empty(py);
    for result in results {
        let state_dict = PyDict::new(py);
        match result {
            Ok(estimate) => {
                state_dict.set_item("rate", estimate.rate.into_pyarray(py))?;
                state_dict.set_item("occupancy", estimate.occupancy.into_pyarray(py))?;
                state_dict.set_item("n_spikes", estimate.n_spikes)?;
            }
            Err(err) => {
                state_dict.set_item("error", err.to_string())?;
            }
        }
        state_list.append(state_dict)?;
    }

    Ok(state_list.into())
}
