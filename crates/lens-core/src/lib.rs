//! Core types and pure computations for SalaryLens.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod months;
pub mod settings;

pub use error::{LensError, Result};
pub use months::Month;
