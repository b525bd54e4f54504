// src/processors/spike_analytics/conditional_intensity.rs

use std::collections::HashSet;

use log::{debug, warn};
use ndarray::{Array1, ArrayView1, ArrayView2, Zip};

use super::kernel_density::kernel_density;
use crate::config::{check_positive, EstimatorConfig};
use crate::error::{IntensityError, Result};

/// Time bins belonging to one discrete behavioral state
///
/// `channel` selects the column of the position trajectory that carries the
/// state's linear position; `time_bins` are distinct row indices into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMembership {
    pub channel: usize,
    pub time_bins: Vec<usize>,
}

impl StateMembership {
    /// Membership read from the first trajectory column
    pub fn new(time_bins: Vec<usize>) -> Self {
        Self::with_channel(0, time_bins)
    }

    pub fn with_channel(channel: usize, time_bins: Vec<usize>) -> Self {
        Self { channel, time_bins }
    }

    pub fn len(&self) -> usize {
        self.time_bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_bins.is_empty()
    }
}

/// Position-conditioned firing intensity for one state
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalIntensity {
    /// Occupancy-normalized rate, renormalized to sum to 1 over position bins
    pub rate: Array1<f64>,
    /// Kernel-smoothed time spent near each position bin
    pub occupancy: Array1<f64>,
    /// Kernel density of the retained spike positions (not normalized)
    pub spike_density: Array1<f64>,
    /// Number of spikes that passed the membership filter
    pub n_spikes: usize,
}

impl ConditionalIntensity {
    /// Position bins whose occupancy falls below `threshold`
    pub fn undersampled_bins(&self, threshold: f64) -> Vec<usize> {
        self.occupancy
            .iter()
            .enumerate()
            .filter(|(_, occ)| **occ < threshold)
            .map(|(bin, _)| bin)
            .collect()
    }

    /// Spikes per unit time near each position, before the sum-to-one step
    pub fn unnormalized_rate(&self, bin_duration: f64) -> Array1<f64> {
        Zip::from(&self.spike_density)
            .and(&self.occupancy)
            .map_collect(|&spikes, &occ| spikes / occ / bin_duration)
    }
}

/// Keep the spikes whose time bin belongs to the state
///
/// Order and duplicates of the retained entries are preserved.
pub fn filter_spikes_to_state(spike_bin_indices: &[usize], state: &StateMembership) -> Vec<usize> {
    let members: HashSet<usize> = state.time_bins.iter().copied().collect();
    spike_bin_indices
        .iter()
        .copied()
        .filter(|bin| members.contains(bin))
        .collect()
}

/// Occupancy curve of a state over the position bins
///
/// Args:
///     position_trajectory: Linear position per time bin (rows) and state channel (columns)
///     state: Time bins and channel of the state
///     bandwidth: Gaussian kernel standard deviation
///     position_bins: Position bin centers
///
/// Returns:
///     Sum of kernels placed on the state's positions, one value per position bin
pub fn occupancy(
    position_trajectory: ArrayView2<'_, f64>,
    state: &StateMembership,
    bandwidth: f64,
    position_bins: ArrayView1<'_, f64>,
) -> Result<Array1<f64>> {
    check_positive("bandwidth", bandwidth)?;
    validate_inputs(position_trajectory, state, position_bins)?;

    let positions = position_trajectory.column(state.channel);
    Ok(kernel_density(
        position_bins,
        state.time_bins.iter().map(|&t| positions[t]),
        bandwidth,
    ))
}

/// Estimate the conditional intensity of spiking over position for one state
///
/// Args:
///     position_trajectory: Linear position per time bin (rows) and state channel (columns)
///     spike_bin_indices: Time bin of every spike; bins outside the state are dropped
///     state: Time bins and channel of the state
///     bandwidth: Gaussian kernel standard deviation, shared by occupancy and spikes
///     position_bins: Position bin centers
///     bin_duration: Duration of one time bin
///
/// Returns:
///     Rate curve summing to 1, together with the occupancy it was normalized by
pub fn estimate_conditional_intensity(
    position_trajectory: ArrayView2<'_, f64>,
    spike_bin_indices: &[usize],
    state: &StateMembership,
    bandwidth: f64,
    position_bins: ArrayView1<'_, f64>,
    bin_duration: f64,
) -> Result<ConditionalIntensity> {
    let config = EstimatorConfig::new(bandwidth, bin_duration);
    estimate_with_config(position_trajectory, spike_bin_indices, state, position_bins, &config)
}

/// Same as [`estimate_conditional_intensity`] with the scalars taken from a config
pub fn estimate_with_config(
    position_trajectory: ArrayView2<'_, f64>,
    spike_bin_indices: &[usize],
    state: &StateMembership,
    position_bins: ArrayView1<'_, f64>,
    config: &EstimatorConfig,
) -> Result<ConditionalIntensity> {
    config.validate()?;
    validate_inputs(position_trajectory, state, position_bins)?;

    let retained = filter_spikes_to_state(spike_bin_indices, state);
    debug!(
        "conditional intensity: {} state bins, {}/{} spikes retained, {} position bins",
        state.len(),
        retained.len(),
        spike_bin_indices.len(),
        position_bins.len()
    );
    if retained.is_empty() {
        return Err(IntensityError::NoData {
            state_size: state.len(),
            spikes_offered: spike_bin_indices.len(),
        });
    }

    let positions = position_trajectory.column(state.channel);
    let occupancy = kernel_density(
        position_bins,
        state.time_bins.iter().map(|&t| positions[t]),
        config.bandwidth,
    );
    let spike_density = kernel_density(
        position_bins,
        retained.iter().map(|&t| positions[t]),
        config.bandwidth,
    );

    warn_low_occupancy(&occupancy, config.min_occupancy);
    if let Some(bin) = occupancy.iter().position(|&occ| occ <= 0.0) {
        return Err(IntensityError::UndefinedResult(format!(
            "occupancy underflowed to zero at position bin {bin} ({})",
            position_bins[bin]
        )));
    }

    // Divide by occupancy and bin duration before normalizing by the total
    let mut rate = Zip::from(&spike_density)
        .and(&occupancy)
        .map_collect(|&spikes, &occ| spikes / occ / config.bin_duration);

    let total = rate.sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(IntensityError::UndefinedResult(format!(
            "rate curve cannot be normalized (total = {total})"
        )));
    }
    rate.mapv_inplace(|r| r / total);

    Ok(ConditionalIntensity {
        rate,
        occupancy,
        spike_density,
        n_spikes: retained.len(),
    })
}

fn validate_inputs(
    position_trajectory: ArrayView2<'_, f64>,
    state: &StateMembership,
    position_bins: ArrayView1<'_, f64>,
) -> Result<()> {
    if state.is_empty() {
        return Err(IntensityError::InvalidArgument(
            "state membership is empty, occupancy is undefined".to_string(),
        ));
    }
    if position_bins.is_empty() {
        return Err(IntensityError::InvalidArgument(
            "position bins are empty".to_string(),
        ));
    }
    if position_bins.iter().any(|b| !b.is_finite()) {
        return Err(IntensityError::InvalidArgument(
            "position bins must be finite".to_string(),
        ));
    }
    if position_bins.iter().zip(position_bins.iter().skip(1)).any(|(lo, hi)| hi <= lo) {
        return Err(IntensityError::InvalidArgument(
            "position bins must be strictly increasing".to_string(),
        ));
    }

    let (n_time_bins, n_channels) = position_trajectory.dim();
    if state.channel >= n_channels {
        return Err(IntensityError::InvalidArgument(format!(
            "state channel {} out of range for trajectory with {n_channels} channels",
            state.channel
        )));
    }

    let positions = position_trajectory.column(state.channel);
    let mut seen = HashSet::with_capacity(state.len());
    for &t in &state.time_bins {
        if t >= n_time_bins {
            return Err(IntensityError::InvalidArgument(format!(
                "state time bin {t} out of range for trajectory with {n_time_bins} time bins"
            )));
        }
        if !seen.insert(t) {
            return Err(IntensityError::InvalidArgument(format!(
                "state time bin {t} listed more than once"
            )));
        }
        if !positions[t].is_finite() {
            return Err(IntensityError::InvalidArgument(format!(
                "position at state time bin {t} is not finite"
            )));
        }
    }

    Ok(())
}

fn warn_low_occupancy(occupancy: &Array1<f64>, floor: f64) {
    let low: Vec<usize> = occupancy
        .iter()
        .enumerate()
        .filter(|(_, occ)| **occ < floor)
        .map(|(bin, _)| bin)
        .collect();

    if !low.is_empty() {
        warn!(
            "occupancy below {floor:e} at {} of {} position bins {:?}; rate there is numerically unstable",
            low.len(),
            occupancy.len(),
            low
        );
    }
}
