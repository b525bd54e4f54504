// src/processors/mod.rs
pub mod spike_analytics;
