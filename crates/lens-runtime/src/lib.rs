//! Runtime layer for SalaryLens.
//!
//! Reads the raw payloads asynchronously and holds the latest validated
//! session state.

pub mod loader;
pub mod session;

pub use lens_core as core;
pub use lens_data as data;
