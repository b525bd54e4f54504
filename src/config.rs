// src/config.rs

//! Estimator configuration.
//!
//! [`EstimatorConfig`] bundles the scalar parameters shared by every state
//! processed in a session, so batch and CLI callers can pass one value around.

use crate::error::{IntensityError, Result};

/// Sampling frequency (Hz) of the position/spike time bins recorded upstream.
pub const DEFAULT_SAMPLING_FREQUENCY: f64 = 1500.0;

/// Scalar parameters of the conditional intensity estimate.
///
/// ```
/// use clusterless_intensity_rs::EstimatorConfig;
///
/// let cfg = EstimatorConfig {
///     bandwidth: 2.5,
///     ..EstimatorConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Standard deviation of the Gaussian position kernel, in position units.
    ///
    /// Shared by the occupancy and spike densities.
    ///
    /// Default: `1.0`.
    pub bandwidth: f64,

    /// Duration of one time bin in seconds.
    ///
    /// Default: `1 / 1500` s.
    pub bin_duration: f64,

    /// Occupancy level below which a bin is reported as numerically unstable.
    ///
    /// Only a warning is logged; values are never clamped. Set to `0.0` to
    /// silence the check.
    ///
    /// Default: `1e-9`.
    pub min_occupancy: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            bandwidth: 1.0,
            bin_duration: 1.0 / DEFAULT_SAMPLING_FREQUENCY,
            min_occupancy: 1e-9,
        }
    }
}

impl EstimatorConfig {
    /// Build a config from the two required scalars, keeping the default warning floor.
    pub fn new(bandwidth: f64, bin_duration: f64) -> Self {
        Self {
            bandwidth,
            bin_duration,
            ..Self::default()
        }
    }

    /// Reject non-positive or non-finite parameters.
    pub fn validate(&self) -> Result<()> {
        check_positive("bandwidth", self.bandwidth)?;
        check_positive("bin_duration", self.bin_duration)?;
        if !self.min_occupancy.is_finite() || self.min_occupancy < 0.0 {
            return Err(IntensityError::InvalidParameter(format!(
                "min_occupancy must be finite and non-negative, got {}",
                self.min_occupancy
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(IntensityError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}
