//! Conversion between measured ion masses and neutral molecule masses.
//!
//! Only explicit conversion for a known ion type is supported; nothing here
//! guesses the adduct of a peak.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::element::{CHLORINE_MASS, HYDROGEN_MASS, NITROGEN_MASS, POTASSIUM_MASS, SODIUM_MASS};
use crate::error::{ModelError, Result};

/// Mass of an electron in Dalton.
pub const ELECTRON_MASS: f64 = 0.000_548_579_909_46;

/// Mass of a proton in Dalton.
pub const PROTON_MASS: f64 = 1.007_276_466_812;

/// A singly charged ion type such as `[M+H]+`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ionization {
    name: &'static str,
    charge: i8,
    /// Mass added to the neutral molecule, electrons included.
    shift: f64,
}

impl Ionization {
    /// The uncharged molecule itself.
    pub const NEUTRAL: Ionization = Ionization {
        name: "[M]",
        charge: 0,
        shift: 0.0,
    };

    pub const PROTONATED: Ionization = Ionization {
        name: "[M+H]+",
        charge: 1,
        shift: PROTON_MASS,
    };

    pub const DEPROTONATED: Ionization = Ionization {
        name: "[M-H]-",
        charge: -1,
        shift: -PROTON_MASS,
    };

    /// Every ion type understood by [`Ionization::parse`].
    pub const KNOWN: &'static [Ionization] = &[
        Self::NEUTRAL,
        Self::PROTONATED,
        Ionization {
            name: "[M+Na]+",
            charge: 1,
            shift: SODIUM_MASS - ELECTRON_MASS,
        },
        Ionization {
            name: "[M+K]+",
            charge: 1,
            shift: POTASSIUM_MASS - ELECTRON_MASS,
        },
        Ionization {
            name: "[M+NH4]+",
            charge: 1,
            shift: NITROGEN_MASS + 4.0 * HYDROGEN_MASS - ELECTRON_MASS,
        },
        Ionization {
            name: "[M]+",
            charge: 1,
            shift: -ELECTRON_MASS,
        },
        Self::DEPROTONATED,
        Ionization {
            name: "[M+Cl]-",
            charge: -1,
            shift: CHLORINE_MASS + ELECTRON_MASS,
        },
        Ionization {
            name: "[M]-",
            charge: -1,
            shift: ELECTRON_MASS,
        },
    ];

    /// Looks up an ion type by name, e.g. `[M+H]+` or `M+H`.
    ///
    /// Matching ignores whitespace and the square brackets.
    pub fn parse(name: &str) -> Result<Self> {
        let wanted = normalize(name);
        Self::KNOWN
            .iter()
            .find(|ion| {
                let known = normalize(ion.name);
                // "M+H" and "[M+H]" name the positive ion.
                known == wanted || (ion.charge >= 0 && known.trim_end_matches('+') == wanted)
            })
            .copied()
            .ok_or_else(|| ModelError::UnknownIon {
                name: name.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn charge(&self) -> i8 {
        self.charge
    }

    pub fn is_ionized(&self) -> bool {
        self.charge != 0
    }

    /// Neutral molecule mass for a measured precursor mass.
    pub fn precursor_to_neutral(&self, precursor: f64) -> f64 {
        precursor - self.shift
    }

    /// Precursor mass of the ion formed from a neutral molecule.
    pub fn neutral_to_precursor(&self, neutral: f64) -> f64 {
        neutral + self.shift
    }
}

impl Default for Ionization {
    fn default() -> Self {
        Self::PROTONATED
    }
}

impl fmt::Display for Ionization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for Ionization {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '[' && *c != ']')
        .collect::<String>()
        .to_ascii_uppercase()
}
