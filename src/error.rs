// src/error.rs

//! Error types for conditional intensity estimation

use thiserror::Error;

/// Errors raised by the estimator.
///
/// Every check runs before or immediately after the kernel sums, so no
/// partially computed curve is ever returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntensityError {
    /// Non-positive or non-finite bandwidth / bin duration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed inputs (empty membership, empty or unordered bins, bad indices)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No spike survived the state membership filter
    #[error("No spikes fall inside the state ({spikes_offered} offered, {state_size} state time bins)")]
    NoData {
        state_size: usize,
        spikes_offered: usize,
    },

    /// A division the estimator cannot carry out (zero occupancy or zero total rate)
    #[error("Undefined result: {0}")]
    UndefinedResult(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, IntensityError>;
