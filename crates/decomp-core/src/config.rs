//! Engine settings loaded from TOML.
//!
//! ```toml
//! ppm = 10.0
//! absolute = 0.002
//! precision = 4
//! alphabet = "CHNOPS"
//! filter = "strict"
//! ion = "[M+H]+"
//!
//! [presets.strict]
//! rdbe_max = 30.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use decomp_model::{
    ConstrainedAlphabet, DEFAULT_ABSOLUTE, DEFAULT_PPM, DEFAULT_PRECISION, Deviation, Ionization,
    PeriodicTable,
};
use decomp_validate::{FilterLevel, ValidatorPresets};

use crate::error::{DecompError, Result};

pub const DEFAULT_ALPHABET: &str = "CHNOPS";

/// Defaults for every query setting. Missing keys keep the built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecompConfig {
    pub ppm: f64,
    pub absolute: f64,
    pub precision: u32,
    pub alphabet: String,
    pub filter: FilterLevel,
    /// Ion type of measured masses.
    pub ion: String,
    pub presets: ValidatorPresets,
}

impl Default for DecompConfig {
    fn default() -> Self {
        Self {
            ppm: DEFAULT_PPM,
            absolute: DEFAULT_ABSOLUTE,
            precision: DEFAULT_PRECISION,
            alphabet: DEFAULT_ALPHABET.to_string(),
            filter: FilterLevel::default(),
            ion: Ionization::PROTONATED.name().to_string(),
            presets: ValidatorPresets::default(),
        }
    }
}

impl DecompConfig {
    /// Reads and validates a config file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid TOML for this
    /// structure, or holds invalid values.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DecompError::io(path, e))?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Parses and validates a config document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::parse(contents, "<inline>")
    }

    fn parse(contents: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| DecompError::ConfigParse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against the parsers and constructors that will
    /// consume it.
    pub fn validate(&self) -> Result<()> {
        self.deviation()?;
        self.alphabet(&PeriodicTable::default())?;
        self.ionization()?;
        self.presets.validate()?;
        Ok(())
    }

    pub fn deviation(&self) -> Result<Deviation> {
        Ok(Deviation::with_precision(
            self.ppm,
            self.absolute,
            self.precision,
        )?)
    }

    pub fn alphabet(&self, table: &PeriodicTable) -> Result<ConstrainedAlphabet> {
        Ok(ConstrainedAlphabet::parse(table, &self.alphabet)?)
    }

    pub fn ionization(&self) -> Result<Ionization> {
        Ok(Ionization::parse(&self.ion)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_default() {
        let config = DecompConfig::from_toml_str("").unwrap();
        assert_eq!(config, DecompConfig::default());
        assert_eq!(config.deviation().unwrap(), Deviation::default());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            DecompConfig::from_toml_str("ppmm = 5.0").unwrap_err(),
            DecompError::ConfigParse { .. }
        ));
        assert!(matches!(
            DecompConfig::from_toml_str("ppm = -5.0").unwrap_err(),
            DecompError::Model(_)
        ));
        assert!(matches!(
            DecompConfig::from_toml_str("filter = \"loose\"").unwrap_err(),
            DecompError::ConfigParse { .. }
        ));
        assert!(matches!(
            DecompConfig::from_toml_str("[presets.strict]\nrdbe_min = 9.0\nrdbe_max = 1.0").unwrap_err(),
            DecompError::Validate(_)
        ));
    }
}
