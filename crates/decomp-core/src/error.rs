use std::path::PathBuf;

use thiserror::Error;

use decomp_model::ModelError;
use decomp_validate::ValidateError;

#[derive(Debug, Error)]
pub enum DecompError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error("invalid mass {mass}: expected a finite, non-negative value")]
    InvalidMass { mass: f64 },

    #[error("{symbol} rounds to a non-positive integer weight at precision {precision}")]
    ZeroWeight { symbol: String, precision: u32 },

    #[error("the alphabet has {alphabet} elements but {bounds} bounds were given")]
    BoundsMismatch { alphabet: usize, bounds: usize },

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {origin}: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, DecompError>;

impl DecompError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}
