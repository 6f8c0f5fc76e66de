use thiserror::Error;

/// Errors raised while selecting or configuring a validator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidateError {
    #[error("unknown filter '{name}'; allowed are strict, common, permissive, rdbe, none")]
    UnknownFilter { name: String },

    #[error("conflicting options: no-filter together with filter '{filter}'")]
    ConflictingFilter { filter: String },

    #[error("invalid thresholds for {preset}: {message}")]
    InvalidThresholds { preset: String, message: String },
}

pub type Result<T> = std::result::Result<T, ValidateError>;
