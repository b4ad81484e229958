//! Data layer for SalaryLens.
//!
//! Validates raw inflation and USD/TRY payloads, resolves the inflation
//! sources, aligns the two series by month and runs the report pipeline.

pub mod aligner;
pub mod analysis;
pub mod collection;
pub mod validator;

pub use lens_core as core;
