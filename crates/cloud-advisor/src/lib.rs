//! Cloud-agnostic workload advisory: rule evaluation, explainable scoring, and the HTTP surface
//! that exposes them.

pub mod advisory;
pub mod config;
pub mod error;
pub mod telemetry;
