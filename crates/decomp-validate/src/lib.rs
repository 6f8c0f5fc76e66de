//! Candidate filters for mass decomposition.
//!
//! Validators are a closed set dispatched by `match`; the thresholds behind
//! the named levels are plain data and can be overridden from configuration.

pub mod error;
pub mod validator;

pub use error::{Result, ValidateError};
pub use validator::{
    ChemicalThresholds, FilterLevel, ValidationContext, ValidatorPresets, Validator,
};
