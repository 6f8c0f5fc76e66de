//! Stateless acceptance predicates applied to decomposition candidates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use decomp_model::{Alphabet, Compomer};

use crate::error::{Result, ValidateError};

/// Facts about the query that shift validator thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationContext {
    /// The candidate formulas describe a charged ion rather than the neutral
    /// molecule. Even-electron ions sit half a unit above their neutral RDBE.
    pub ionized: bool,
}

impl ValidationContext {
    pub fn neutral() -> Self {
        Self { ionized: false }
    }

    pub fn ionized() -> Self {
        Self { ionized: true }
    }

    fn rdbe_shift(self) -> f64 {
        if self.ionized { 0.5 } else { 0.0 }
    }
}

/// Limits applied by [`Validator::Chemical`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChemicalThresholds {
    pub rdbe_min: f64,
    pub rdbe_max: f64,
    /// Maximum ratio of heteroatoms (anything but C and H) to carbon.
    pub hetero_ratio: f64,
    /// Maximum ratio of hydrogen to carbon.
    pub hydrogen_ratio: f64,
}

impl ChemicalThresholds {
    pub const STRICT: ChemicalThresholds = ChemicalThresholds {
        rdbe_min: 0.0,
        rdbe_max: 40.0,
        hetero_ratio: 1.0,
        hydrogen_ratio: 3.0,
    };

    pub const COMMON: ChemicalThresholds = ChemicalThresholds {
        rdbe_min: 0.0,
        rdbe_max: 50.0,
        hetero_ratio: 2.0,
        hydrogen_ratio: 4.0,
    };

    pub const PERMISSIVE: ChemicalThresholds = ChemicalThresholds {
        rdbe_min: 0.0,
        rdbe_max: 60.0,
        hetero_ratio: 3.0,
        hydrogen_ratio: 6.0,
    };

    /// Checks that every threshold is finite, the ratios are non-negative
    /// and the RDBE interval is not empty.
    pub fn validate(&self, preset: &str) -> Result<()> {
        let invalid = |message: String| ValidateError::InvalidThresholds {
            preset: preset.to_string(),
            message,
        };
        let values = [
            self.rdbe_min,
            self.rdbe_max,
            self.hetero_ratio,
            self.hydrogen_ratio,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(invalid("thresholds must be finite".to_string()));
        }
        if self.rdbe_min > self.rdbe_max {
            return Err(invalid(format!(
                "rdbe_min {} exceeds rdbe_max {}",
                self.rdbe_min, self.rdbe_max
            )));
        }
        if self.hetero_ratio < 0.0 || self.hydrogen_ratio < 0.0 {
            return Err(invalid("ratios must not be negative".to_string()));
        }
        Ok(())
    }

    /// Whether every candidate these thresholds accept is also accepted by
    /// `looser`.
    pub fn is_within(&self, looser: &ChemicalThresholds) -> bool {
        self.rdbe_min >= looser.rdbe_min
            && self.rdbe_max <= looser.rdbe_max
            && self.hetero_ratio <= looser.hetero_ratio
            && self.hydrogen_ratio <= looser.hydrogen_ratio
    }
}

impl Default for ChemicalThresholds {
    fn default() -> Self {
        Self::COMMON
    }
}

/// Candidate filter. Immutable and cheap to copy, so one value can be shared
/// by any number of concurrent queries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Accepts every candidate.
    #[default]
    None,
    /// Accepts candidates with `RDBE >= min_rdbe`.
    Valence { min_rdbe: f64 },
    /// RDBE range plus heteroatom and hydrogen ratios.
    Chemical(ChemicalThresholds),
}

impl Validator {
    /// The plain RDBE check with a minimum of zero.
    pub const fn valence() -> Self {
        Self::Valence { min_rdbe: 0.0 }
    }

    pub fn accepts(&self, compomer: &Compomer, alphabet: &Alphabet, context: ValidationContext) -> bool {
        match self {
            Self::None => true,
            Self::Valence { min_rdbe } => {
                compomer.rdbe(alphabet) >= min_rdbe + context.rdbe_shift()
            }
            Self::Chemical(thresholds) => {
                let rdbe = compomer.rdbe(alphabet);
                let shift = context.rdbe_shift();
                if rdbe < thresholds.rdbe_min + shift || rdbe > thresholds.rdbe_max + shift {
                    return false;
                }
                let (carbon, hydrogen, hetero) = atom_classes(compomer, alphabet);
                // Carbon-free candidates are compared as if they had one carbon.
                let carbon = carbon.max(1) as f64;
                hetero as f64 / carbon <= thresholds.hetero_ratio
                    && hydrogen as f64 / carbon <= thresholds.hydrogen_ratio
            }
        }
    }
}

/// Counts of carbon, hydrogen and every other element.
fn atom_classes(compomer: &Compomer, alphabet: &Alphabet) -> (u64, u64, u64) {
    alphabet.iter().zip(compomer.counts()).fold(
        (0, 0, 0),
        |(carbon, hydrogen, hetero), (element, &count)| {
            let count = u64::from(count);
            if element.is_carbon() {
                (carbon + count, hydrogen, hetero)
            } else if element.is_hydrogen() {
                (carbon, hydrogen + count, hetero)
            } else {
                (carbon, hydrogen, hetero + count)
            }
        },
    )
}

/// Named filter selection, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLevel {
    Strict,
    #[default]
    Common,
    Permissive,
    Rdbe,
    None,
}

impl FilterLevel {
    pub const ALL: [FilterLevel; 5] = [
        Self::Strict,
        Self::Common,
        Self::Permissive,
        Self::Rdbe,
        Self::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Common => "common",
            Self::Permissive => "permissive",
            Self::Rdbe => "rdbe",
            Self::None => "none",
        }
    }

    /// Combines an explicit filter with a "no filter" switch.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::ConflictingFilter`] when both a filter other
    /// than `none` and the switch are given.
    pub fn resolve(filter: Option<FilterLevel>, no_filter: bool) -> Result<FilterLevel> {
        match (filter, no_filter) {
            (Some(level), true) if level != Self::None => Err(ValidateError::ConflictingFilter {
                filter: level.as_str().to_string(),
            }),
            (_, true) => Ok(Self::None),
            (Some(level), false) => Ok(level),
            (None, false) => Ok(Self::default()),
        }
    }

    /// The validator for this level using the given preset thresholds.
    pub fn validator(&self, presets: &ValidatorPresets) -> Validator {
        match self {
            Self::Strict => Validator::Chemical(presets.strict),
            Self::Common => Validator::Chemical(presets.common),
            Self::Permissive => Validator::Chemical(presets.permissive),
            Self::Rdbe => Validator::Valence {
                min_rdbe: presets.rdbe_min,
            },
            Self::None => Validator::None,
        }
    }
}

impl fmt::Display for FilterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterLevel {
    type Err = ValidateError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidateError::UnknownFilter {
                name: s.to_string(),
            })
    }
}

/// Thresholds behind the named filter levels.
///
/// Deserializes from partial overrides: every field left out keeps the
/// built-in value of its own preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PresetOverrides")]
pub struct ValidatorPresets {
    pub strict: ChemicalThresholds,
    pub common: ChemicalThresholds,
    pub permissive: ChemicalThresholds,
    /// Minimum RDBE of the `rdbe` level.
    pub rdbe_min: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PresetOverrides {
    strict: ThresholdOverrides,
    common: ThresholdOverrides,
    permissive: ThresholdOverrides,
    rdbe_min: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ThresholdOverrides {
    rdbe_min: Option<f64>,
    rdbe_max: Option<f64>,
    hetero_ratio: Option<f64>,
    hydrogen_ratio: Option<f64>,
}

impl ThresholdOverrides {
    fn apply(&self, base: ChemicalThresholds) -> ChemicalThresholds {
        ChemicalThresholds {
            rdbe_min: self.rdbe_min.unwrap_or(base.rdbe_min),
            rdbe_max: self.rdbe_max.unwrap_or(base.rdbe_max),
            hetero_ratio: self.hetero_ratio.unwrap_or(base.hetero_ratio),
            hydrogen_ratio: self.hydrogen_ratio.unwrap_or(base.hydrogen_ratio),
        }
    }
}

impl From<PresetOverrides> for ValidatorPresets {
    fn from(overrides: PresetOverrides) -> Self {
        let defaults = Self::default();
        Self {
            strict: overrides.strict.apply(defaults.strict),
            common: overrides.common.apply(defaults.common),
            permissive: overrides.permissive.apply(defaults.permissive),
            rdbe_min: overrides.rdbe_min.unwrap_or(defaults.rdbe_min),
        }
    }
}

impl ValidatorPresets {
    /// Checks each preset and their order: `strict` must accept a subset of
    /// `common`, `common` a subset of `permissive`, and `permissive` may not
    /// go below the minimum of the `rdbe` level.
    ///
    /// # Errors
    ///
    /// Returns the first preset with malformed or out-of-order thresholds.
    pub fn validate(&self) -> Result<()> {
        self.strict.validate("strict")?;
        self.common.validate("common")?;
        self.permissive.validate("permissive")?;
        if !self.rdbe_min.is_finite() {
            return Err(ValidateError::InvalidThresholds {
                preset: "rdbe".to_string(),
                message: "rdbe_min must be finite".to_string(),
            });
        }
        let ordered = [
            ("strict", &self.strict, "common", &self.common),
            ("common", &self.common, "permissive", &self.permissive),
        ];
        for (name, stricter, looser_name, looser) in ordered {
            if !stricter.is_within(looser) {
                return Err(ValidateError::InvalidThresholds {
                    preset: name.to_string(),
                    message: format!("thresholds are looser than the {looser_name} preset"),
                });
            }
        }
        if self.permissive.rdbe_min < self.rdbe_min {
            return Err(ValidateError::InvalidThresholds {
                preset: "permissive".to_string(),
                message: format!(
                    "rdbe_min {} is below the rdbe level minimum {}",
                    self.permissive.rdbe_min, self.rdbe_min
                ),
            });
        }
        Ok(())
    }
}

impl Default for ValidatorPresets {
    fn default() -> Self {
        Self {
            strict: ChemicalThresholds::STRICT,
            common: ChemicalThresholds::COMMON,
            permissive: ChemicalThresholds::PERMISSIVE,
            rdbe_min: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomp_model::PeriodicTable;

    fn chno() -> Alphabet {
        Alphabet::from_symbols(&PeriodicTable::default(), &["C", "H", "N", "O"]).unwrap()
    }

    #[test]
    fn valence_rejects_negative_rdbe() {
        let alphabet = chno();
        let ch6 = Compomer::new(vec![1, 6, 0, 0]);
        let ch4 = Compomer::new(vec![1, 4, 0, 0]);
        let ctx = ValidationContext::neutral();
        assert!(!Validator::valence().accepts(&ch6, &alphabet, ctx));
        assert!(Validator::valence().accepts(&ch4, &alphabet, ctx));
        assert!(Validator::None.accepts(&ch6, &alphabet, ctx));
    }

    #[test]
    fn ionized_context_raises_minimum() {
        let alphabet = chno();
        // CH4 has RDBE 0, below the shifted minimum of 0.5.
        let ch4 = Compomer::new(vec![1, 4, 0, 0]);
        assert!(!Validator::valence().accepts(&ch4, &alphabet, ValidationContext::ionized()));
        // CH3 (the ion of methane minus a hydride) sits at 0.5.
        let ch3 = Compomer::new(vec![1, 3, 0, 0]);
        assert!(Validator::valence().accepts(&ch3, &alphabet, ValidationContext::ionized()));
    }

    #[test]
    fn chemical_ratios_floor_carbon_at_one() {
        let alphabet = chno();
        let strict = Validator::Chemical(ChemicalThresholds::STRICT);
        let ctx = ValidationContext::neutral();
        // H2O: no carbon, 1 heteroatom over 1 is allowed, RDBE 0.
        assert!(strict.accepts(&Compomer::new(vec![0, 2, 0, 1]), &alphabet, ctx));
        // H2O2: 2 heteroatoms exceed the strict ratio of 1.
        assert!(!strict.accepts(&Compomer::new(vec![0, 2, 0, 2]), &alphabet, ctx));
        let permissive = Validator::Chemical(ChemicalThresholds::PERMISSIVE);
        assert!(permissive.accepts(&Compomer::new(vec![0, 2, 0, 2]), &alphabet, ctx));
    }

    #[test]
    fn parses_filter_names() {
        assert_eq!("STRICT".parse::<FilterLevel>().unwrap(), FilterLevel::Strict);
        assert_eq!(" rdbe ".parse::<FilterLevel>().unwrap(), FilterLevel::Rdbe);
        assert!(matches!(
            "loose".parse::<FilterLevel>().unwrap_err(),
            ValidateError::UnknownFilter { .. }
        ));
    }

    #[test]
    fn no_filter_conflicts_with_explicit_level() {
        assert_eq!(FilterLevel::resolve(None, false).unwrap(), FilterLevel::Common);
        assert_eq!(FilterLevel::resolve(None, true).unwrap(), FilterLevel::None);
        assert_eq!(
            FilterLevel::resolve(Some(FilterLevel::None), true).unwrap(),
            FilterLevel::None
        );
        assert!(matches!(
            FilterLevel::resolve(Some(FilterLevel::Strict), true).unwrap_err(),
            ValidateError::ConflictingFilter { .. }
        ));
    }

    #[test]
    fn presets_reject_inverted_rdbe_range() {
        let mut presets = ValidatorPresets::default();
        assert!(presets.validate().is_ok());
        presets.common.rdbe_min = 10.0;
        presets.common.rdbe_max = 5.0;
        assert!(matches!(
            presets.validate().unwrap_err(),
            ValidateError::InvalidThresholds { preset, .. } if preset == "common"
        ));
    }

    #[test]
    fn presets_must_stay_nested() {
        let mut presets = ValidatorPresets::default();
        presets.strict.rdbe_max = 100.0;
        assert!(matches!(
            presets.validate().unwrap_err(),
            ValidateError::InvalidThresholds { preset, .. } if preset == "strict"
        ));

        let mut presets = ValidatorPresets::default();
        presets.permissive.hydrogen_ratio = 3.5;
        assert!(matches!(
            presets.validate().unwrap_err(),
            ValidateError::InvalidThresholds { preset, .. } if preset == "common"
        ));

        let mut presets = ValidatorPresets::default();
        presets.rdbe_min = 0.5;
        assert!(matches!(
            presets.validate().unwrap_err(),
            ValidateError::InvalidThresholds { preset, .. } if preset == "permissive"
        ));
    }
}
