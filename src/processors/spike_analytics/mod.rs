// src/processors/spike_analytics/mod.rs
pub mod batch;
pub mod conditional_intensity;
pub mod kernel_density;

// Re-export conditional intensity functions
pub use conditional_intensity::{
    estimate_conditional_intensity,
    estimate_with_config,
    filter_spikes_to_state,
    occupancy,
    ConditionalIntensity,
    StateMembership,
};

// Re-export batch functions
pub use batch::{estimate_all_states, estimate_all_units};

pub use kernel_density::{bin_centers_from_edges, gaussian_pdf, kernel_density};
