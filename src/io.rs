// src/io.rs

//! JSON session I/O for the command line driver.
//!
//! A session file carries the pre-computed inputs of one recording epoch:
//!
//! ```json
//! {
//!   "position_trajectory": [[0.0, 5.0], [1.0, 4.0]],
//!   "position_bins": [0.0, 1.0, 2.0],
//!   "spike_bin_indices": [0, 1, 1],
//!   "states": [{ "name": "outbound", "channel": 0, "time_bins": [0, 1] }]
//! }
//! ```
//!
//! `position_trajectory` may also be a flat list for a single channel, and
//! `position_bin_edges` may replace `position_bins`.

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use crate::config::EstimatorConfig;
use crate::error::Result as IntensityResult;
use crate::processors::spike_analytics::{bin_centers_from_edges, ConditionalIntensity, StateMembership};

/// Position samples: rows are time bins, optionally one column per state channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrajectoryInput {
    Channels(Vec<Vec<f64>>),
    Single(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateInput {
    pub name: String,
    #[serde(default)]
    pub channel: usize,
    pub time_bins: Vec<usize>,
}

/// Inputs of one session, as read from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub position_trajectory: TrajectoryInput,
    #[serde(default)]
    pub position_bins: Option<Vec<f64>>,
    #[serde(default)]
    pub position_bin_edges: Option<Vec<f64>>,
    pub spike_bin_indices: Vec<usize>,
    pub states: Vec<StateInput>,
    #[serde(default)]
    pub bandwidth: Option<f64>,
    #[serde(default)]
    pub bin_duration: Option<f64>,
}

impl SessionInput {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening session file {}", path.display()))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).context("failed to parse session JSON")
    }

    /// Trajectory as a `[time bins, channels]` array
    pub fn trajectory(&self) -> Result<Array2<f64>> {
        match &self.position_trajectory {
            TrajectoryInput::Single(samples) => Ok(Array1::from(samples.clone()).insert_axis(ndarray::Axis(1))),
            TrajectoryInput::Channels(rows) => {
                let n_channels = rows.first().map_or(0, Vec::len);
                if let Some(t) = rows.iter().position(|row| row.len() != n_channels) {
                    bail!("trajectory row {t} has {} channels, expected {n_channels}", rows[t].len());
                }
                let flat: Vec<f64> = rows.iter().flatten().copied().collect();
                Ok(Array2::from_shape_vec((rows.len(), n_channels), flat)?)
            }
        }
    }

    /// Bin centers, given directly or derived from bin edges
    pub fn position_bins(&self) -> Result<Array1<f64>> {
        match (&self.position_bins, &self.position_bin_edges) {
            (Some(bins), None) => Ok(Array1::from(bins.clone())),
            (None, Some(edges)) => Ok(bin_centers_from_edges(Array1::from(edges.clone()).view())?),
            (Some(_), Some(_)) => bail!("give either position_bins or position_bin_edges, not both"),
            (None, None) => bail!("session has neither position_bins nor position_bin_edges"),
        }
    }

    pub fn states(&self) -> Vec<StateMembership> {
        self.states
            .iter()
            .map(|s| StateMembership::with_channel(s.channel, s.time_bins.clone()))
            .collect()
    }

    /// File values override the defaults; `None` fields keep `base`
    pub fn config(&self, base: &EstimatorConfig) -> EstimatorConfig {
        EstimatorConfig {
            bandwidth: self.bandwidth.unwrap_or(base.bandwidth),
            bin_duration: self.bin_duration.unwrap_or(base.bin_duration),
            ..base.clone()
        }
    }
}

/// Per-state outcome written by the command line driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateReport {
    Estimated {
        name: String,
        rate: Vec<f64>,
        occupancy: Vec<f64>,
        n_spikes: usize,
    },
    Failed {
        name: String,
        error: String,
    },
}

impl StateReport {
    pub fn new(name: &str, result: &IntensityResult<ConditionalIntensity>) -> Self {
        match result {
            Ok(estimate) => StateReport::Estimated {
                name: name.to_string(),
                rate: estimate.rate.to_vec(),
                occupancy: estimate.occupancy.to_vec(),
                n_spikes: estimate.n_spikes,
            },
            Err(e) => StateReport::Failed {
                name: name.to_string(),
                error: e.to_string(),
            },
        }
    }
}

pub fn write_reports<W: Write>(writer: W, reports: &[StateReport]) -> Result<()> {
    serde_json::to_writer_pretty(writer, reports).context("failed to write results JSON")
}
