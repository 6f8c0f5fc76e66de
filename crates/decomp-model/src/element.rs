//! Chemical elements and the periodic table they are looked up in.
//!
//! There is no process-wide table: callers construct a [`PeriodicTable`]
//! (usually [`PeriodicTable::default`]) and pass it to the alphabet and
//! formula parsers. Tables are immutable once built.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A chemical element with its monoisotopic mass and default valence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    symbol: String,
    name: String,
    mass: f64,
    valence: u8,
}

impl Element {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, mass: f64, valence: u8) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            mass,
            valence,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Monoisotopic mass in Dalton.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn valence(&self) -> u8 {
        self.valence
    }

    pub fn is_carbon(&self) -> bool {
        self.symbol == "C"
    }

    pub fn is_hydrogen(&self) -> bool {
        self.symbol == "H"
    }
}

// Masses compare bitwise so elements can take part in hashed cache keys.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.valence == other.valence
            && self.mass.to_bits() == other.mass.to_bits()
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
        self.valence.hash(state);
        self.mass.to_bits().hash(state);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

pub(crate) const HYDROGEN_MASS: f64 = 1.007_825_032_07;
pub(crate) const NITROGEN_MASS: f64 = 14.003_074_004_8;
pub(crate) const SODIUM_MASS: f64 = 22.989_769_280_9;
pub(crate) const CHLORINE_MASS: f64 = 34.968_852_68;
pub(crate) const POTASSIUM_MASS: f64 = 38.963_706_68;

/// Symbol, name, monoisotopic mass and valence of the built-in elements.
const STANDARD_ELEMENTS: &[(&str, &str, f64, u8)] = &[
    ("H", "Hydrogen", HYDROGEN_MASS, 1),
    ("Li", "Lithium", 7.016_004_55, 1),
    ("B", "Boron", 11.009_305_4, 3),
    ("C", "Carbon", 12.0, 4),
    ("N", "Nitrogen", NITROGEN_MASS, 3),
    ("O", "Oxygen", 15.994_914_619_56, 2),
    ("F", "Fluorine", 18.998_403_22, 1),
    ("Na", "Sodium", SODIUM_MASS, 1),
    ("Mg", "Magnesium", 23.985_041_7, 2),
    ("Si", "Silicon", 27.976_926_532_5, 4),
    ("P", "Phosphorus", 30.973_761_63, 3),
    ("S", "Sulfur", 31.972_071, 2),
    ("Cl", "Chlorine", CHLORINE_MASS, 1),
    ("K", "Potassium", POTASSIUM_MASS, 1),
    ("Ca", "Calcium", 39.962_590_98, 2),
    ("Fe", "Iron", 55.934_937_5, 2),
    ("Cu", "Copper", 62.929_597_5, 2),
    ("Zn", "Zinc", 63.929_142_2, 2),
    ("As", "Arsenic", 74.921_596_5, 3),
    ("Br", "Bromine", 78.918_337_1, 1),
    ("Se", "Selenium", 79.916_521_3, 2),
    ("I", "Iodine", 126.904_473, 1),
];

/// Immutable lookup table from element symbol to [`Element`].
#[derive(Debug, Clone)]
pub struct PeriodicTable {
    elements: Vec<Element>,
    by_symbol: HashMap<String, usize>,
}

impl PeriodicTable {
    /// Builds a table from the given elements.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateElement`] if a symbol occurs twice, or
    /// [`ModelError::InvalidAlphabet`] if a symbol is not an uppercase letter
    /// followed by lowercase letters.
    pub fn new(elements: Vec<Element>) -> Result<Self> {
        let mut by_symbol = HashMap::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            if !is_symbol(element.symbol()) {
                return Err(ModelError::alphabet(
                    element.symbol(),
                    "element symbols must be an uppercase letter followed by lowercase letters",
                ));
            }
            if by_symbol.insert(element.symbol.clone(), index).is_some() {
                return Err(ModelError::DuplicateElement {
                    symbol: element.symbol.clone(),
                });
            }
        }
        Ok(Self {
            elements,
            by_symbol,
        })
    }

    pub fn get(&self, symbol: &str) -> Option<&Element> {
        self.by_symbol.get(symbol).map(|&index| &self.elements[index])
    }

    /// Looks up an element, failing with [`ModelError::UnknownElement`].
    pub fn require(&self, symbol: &str) -> Result<&Element> {
        self.get(symbol).ok_or_else(|| ModelError::UnknownElement {
            symbol: symbol.to_string(),
        })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Reads the element symbol starting at byte `start` of `input`.
    ///
    /// Prefers the longest symbol known to this table, so `Cl` wins over `C`
    /// followed by a stray `l`. Returns the element and the end offset.
    pub(crate) fn scan_symbol<'t>(
        &'t self,
        input: &str,
        start: usize,
    ) -> Option<(&'t Element, usize)> {
        let bytes = input.as_bytes();
        if !bytes.get(start)?.is_ascii_uppercase() {
            return None;
        }
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_lowercase() {
            end += 1;
        }
        (start + 1..=end)
            .rev()
            .find_map(|stop| self.get(&input[start..stop]).map(|element| (element, stop)))
    }
}

impl Default for PeriodicTable {
    fn default() -> Self {
        let elements = STANDARD_ELEMENTS
            .iter()
            .map(|&(symbol, name, mass, valence)| Element::new(symbol, name, mass, valence))
            .collect::<Vec<_>>();
        let by_symbol = elements
            .iter()
            .enumerate()
            .map(|(index, element)| (element.symbol.clone(), index))
            .collect();
        Self {
            elements,
            by_symbol,
        }
    }
}

fn is_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_lowercase())
}
