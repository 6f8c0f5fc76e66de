use thiserror::Error;

/// Configuration errors raised while building alphabets, bounds and deviations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("unknown element: {symbol}")]
    UnknownElement { symbol: String },

    #[error("duplicate element in alphabet: {symbol}")]
    DuplicateElement { symbol: String },

    #[error("invalid alphabet '{input}': {message}")]
    InvalidAlphabet { input: String, message: String },

    #[error("invalid formula '{input}': {message}")]
    InvalidFormula { input: String, message: String },

    #[error("invalid bound for {symbol}: minimum {min} exceeds maximum {max}")]
    InvalidBound { symbol: String, min: u32, max: u32 },

    #[error("invalid bound: minimum {min} exceeds maximum {max}")]
    InvertedBound { min: u32, max: u32 },

    #[error("expected {expected} bounds for the alphabet, got {actual}")]
    BoundsLength { expected: usize, actual: usize },

    #[error("parent formula allows at most {parent} {symbol}, but the minimum is {min}")]
    ParentConflict { symbol: String, min: u32, parent: u32 },

    #[error("invalid deviation: {message}")]
    InvalidDeviation { message: String },

    #[error("invalid mass {mass}: expected a finite, non-negative value")]
    InvalidMass { mass: f64 },

    #[error("unknown ion type: {name}")]
    UnknownIon { name: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    pub(crate) fn alphabet(input: &str, message: impl Into<String>) -> Self {
        Self::InvalidAlphabet {
            input: input.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn formula(input: &str, message: impl Into<String>) -> Self {
        Self::InvalidFormula {
            input: input.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn deviation(message: impl Into<String>) -> Self {
        Self::InvalidDeviation {
            message: message.into(),
        }
    }
}
