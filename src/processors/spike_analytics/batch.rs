// src/processors/spike_analytics/batch.rs

use log::info;
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

use super::conditional_intensity::{estimate_with_config, ConditionalIntensity, StateMembership};
use crate::config::EstimatorConfig;
use crate::error::Result;

/// Estimate the conditional intensity of one spike set for every state in parallel
///
/// Args:
///     position_trajectory: Linear position per time bin (rows) and state channel (columns)
///     spike_bin_indices: Time bin of every spike
///     states: Discrete states to condition on
///     position_bins: Position bin centers
///     config: Bandwidth, bin duration and occupancy warning floor
///
/// Returns:
///     One result per state, in the order of `states`
pub fn estimate_all_states(
    position_trajectory: ArrayView2<'_, f64>,
    spike_bin_indices: &[usize],
    states: &[StateMembership],
    position_bins: ArrayView1<'_, f64>,
    config: &EstimatorConfig,
) -> Vec<Result<ConditionalIntensity>> {
    // One task per state; each call is single threaded
    let results: Vec<_> = states
        .par_iter()
        .map(|state| estimate_with_config(position_trajectory, spike_bin_indices, state, position_bins, config))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(
        "estimated {} states ({} failed) over {} position bins",
        states.len(),
        failed,
        position_bins.len()
    );

    results
}

/// Estimate the conditional intensity of several spike sets (units, tetrodes) for every state
///
/// Args:
///     position_trajectory: Linear position per time bin (rows) and state channel (columns)
///     spike_sets: Spike time bins, one list per unit
///     states: Discrete states to condition on
///     position_bins: Position bin centers
///     config: Bandwidth, bin duration and occupancy warning floor
///
/// Returns:
///     Results indexed `[unit][state]`
pub fn estimate_all_units(
    position_trajectory: ArrayView2<'_, f64>,
    spike_sets: &[Vec<usize>],
    states: &[StateMembership],
    position_bins: ArrayView1<'_, f64>,
    config: &EstimatorConfig,
) -> Vec<Vec<Result<ConditionalIntensity>>> {
    // Flatten unit × state so rayon can balance uneven spike counts
    let pairs: Vec<(usize, usize)> = (0..spike_sets.len())
        .flat_map(|u| (0..states.len()).map(move |s| (u, s)))
        .collect();

    let mut flat: Vec<_> = pairs
        .par_iter()
        .map(|&(u, s)| {
            estimate_with_config(position_trajectory, &spike_sets[u], &states[s], position_bins, config)
        })
        .collect();

    let mut grid = Vec::with_capacity(spike_sets.len());
    for _ in 0..spike_sets.len() {
        let rest = flat.split_off(states.len());
        grid.push(std::mem::replace(&mut flat, rest));
    }

    info!("estimated {} units × {} states", spike_sets.len(), states.len());
    grid
}
