//! Alphabets, per-element count bounds, and the compact alphabet syntax.
//!
//! The syntax follows the decomposition tools' convention:
//!
//! - `CHNOPS`: every element with bounds `[0, unbounded]`
//! - `C[2-10]`: between 2 and 10 carbons
//! - `N[1-]`: at least one nitrogen
//! - `O[-5]` or `O[5]`: at most five oxygens
//! - `Cl[0]`: the element is dropped from the alphabet
//!
//! Commas and whitespace between entries are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::{Element, PeriodicTable};
use crate::error::{ModelError, Result};
use crate::formula::MolecularFormula;

/// Inclusive count interval for one element of an alphabet.
///
/// `min <= max` always holds; deserialization goes through [`Bound::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBound")]
pub struct Bound {
    min: u32,
    max: u32,
}

impl Bound {
    /// Upper-bound sentinel meaning "no upper limit".
    pub const UNBOUNDED: u32 = u32::MAX;

    /// The default `[0, UNBOUNDED]` interval.
    pub const ANY: Bound = Bound {
        min: 0,
        max: Self::UNBOUNDED,
    };

    /// Returns `None` when `min > max`.
    pub const fn new(min: u32, max: u32) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    pub const fn at_most(max: u32) -> Self {
        Self { min: 0, max }
    }

    pub const fn at_least(min: u32) -> Self {
        Self {
            min,
            max: Self::UNBOUNDED,
        }
    }

    pub const fn exactly(count: u32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    pub const fn min(&self) -> u32 {
        self.min
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    pub const fn is_bounded(&self) -> bool {
        self.max != Self::UNBOUNDED
    }

    pub const fn contains(&self, count: u32) -> bool {
        count >= self.min && count <= self.max
    }

    /// Width of the interval, `None` when the upper end is unbounded.
    pub const fn span(&self) -> Option<u32> {
        if self.is_bounded() {
            Some(self.max - self.min)
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBound {
    #[serde(default)]
    min: u32,
    #[serde(default = "unbounded_max")]
    max: u32,
}

fn unbounded_max() -> u32 {
    Bound::UNBOUNDED
}

impl TryFrom<RawBound> for Bound {
    type Error = ModelError;

    fn try_from(raw: RawBound) -> Result<Self> {
        Bound::new(raw.min, raw.max).ok_or(ModelError::InvertedBound {
            min: raw.min,
            max: raw.max,
        })
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self::ANY
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.is_bounded()) {
            (0, false) => Ok(()),
            (min, false) => write!(f, "[{min}-]"),
            (0, true) => write!(f, "[{}]", self.max),
            (min, true) => write!(f, "[{min}-{}]", self.max),
        }
    }
}

/// Ordered, duplicate-free sequence of elements.
///
/// Positions in the alphabet index every count vector produced for it.
/// Equality and hashing are structural, so an alphabet can key a cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAlphabet")]
pub struct Alphabet {
    elements: Vec<Element>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAlphabet {
    elements: Vec<Element>,
}

impl TryFrom<RawAlphabet> for Alphabet {
    type Error = ModelError;

    fn try_from(raw: RawAlphabet) -> Result<Self> {
        Alphabet::new(raw.elements)
    }
}

impl Alphabet {
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateElement`] if a symbol repeats.
    pub fn new(elements: Vec<Element>) -> Result<Self> {
        for (index, element) in elements.iter().enumerate() {
            if elements[..index]
                .iter()
                .any(|other| other.symbol() == element.symbol())
            {
                return Err(ModelError::DuplicateElement {
                    symbol: element.symbol().to_string(),
                });
            }
        }
        Ok(Self { elements })
    }

    /// Builds an alphabet from symbols looked up in `table`.
    pub fn from_symbols(table: &PeriodicTable, symbols: &[&str]) -> Result<Self> {
        let elements = symbols
            .iter()
            .map(|symbol| table.require(symbol).cloned())
            .collect::<Result<Vec<_>>>()?;
        Self::new(elements)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.symbol() == symbol)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> + Clone {
        self.elements.iter()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            f.write_str(element.symbol())?;
        }
        Ok(())
    }
}

/// One [`Bound`] per alphabet position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    bounds: Vec<Bound>,
}

impl Bounds {
    /// Default `[0, UNBOUNDED]` bounds for every element of `alphabet`.
    pub fn unbounded(alphabet: &Alphabet) -> Self {
        Self {
            bounds: vec![Bound::ANY; alphabet.len()],
        }
    }

    /// # Errors
    ///
    /// Returns [`ModelError::BoundsLength`] when the lengths differ.
    pub fn new(alphabet: &Alphabet, bounds: Vec<Bound>) -> Result<Self> {
        if bounds.len() != alphabet.len() {
            return Err(ModelError::BoundsLength {
                expected: alphabet.len(),
                actual: bounds.len(),
            });
        }
        Ok(Self { bounds })
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn get(&self, index: usize) -> Bound {
        self.bounds[index]
    }

    pub fn as_slice(&self) -> &[Bound] {
        &self.bounds
    }

    pub fn iter(&self) -> impl Iterator<Item = Bound> + Clone + '_ {
        self.bounds.iter().copied()
    }

    /// Replaces the bound of the element at `index`.
    #[must_use]
    pub fn with(mut self, index: usize, bound: Bound) -> Self {
        self.bounds[index] = bound;
        self
    }

    /// Caps every upper bound at the element count of `parent`.
    ///
    /// Elements absent from the parent are capped at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ParentConflict`] when a minimum exceeds the
    /// parent's count for that element.
    pub fn tightened_by(&self, alphabet: &Alphabet, parent: &MolecularFormula) -> Result<Self> {
        let bounds = alphabet
            .iter()
            .zip(&self.bounds)
            .map(|(element, bound)| {
                let parent_count = parent.count_of(element.symbol());
                Bound::new(bound.min, bound.max.min(parent_count)).ok_or_else(|| {
                    ModelError::ParentConflict {
                        symbol: element.symbol().to_string(),
                        min: bound.min,
                        parent: parent_count,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bounds })
    }
}

/// An alphabet together with its bounds, as written in the compact syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawConstrainedAlphabet")]
pub struct ConstrainedAlphabet {
    pub alphabet: Alphabet,
    pub bounds: Bounds,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConstrainedAlphabet {
    alphabet: Alphabet,
    bounds: Bounds,
}

impl TryFrom<RawConstrainedAlphabet> for ConstrainedAlphabet {
    type Error = ModelError;

    fn try_from(raw: RawConstrainedAlphabet) -> Result<Self> {
        let bounds = Bounds::new(&raw.alphabet, raw.bounds.bounds)?;
        Ok(Self {
            alphabet: raw.alphabet,
            bounds,
        })
    }
}

impl ConstrainedAlphabet {
    /// Every element of `alphabet` without limits.
    pub fn unbounded(alphabet: Alphabet) -> Self {
        let bounds = Bounds::unbounded(&alphabet);
        Self { alphabet, bounds }
    }

    /// Parses the compact alphabet syntax, e.g. `CH[0-20]N[1-]O[-5]P[3]`.
    ///
    /// # Errors
    ///
    /// Fails on unknown symbols, repeated elements, malformed intervals or
    /// intervals with `max < min`.
    pub fn parse(table: &PeriodicTable, input: &str) -> Result<Self> {
        let cleaned: String = input
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(ModelError::alphabet(input, "alphabet is empty"));
        }
        let mut elements = Vec::new();
        let mut bounds = Vec::new();
        // Every symbol seen so far, including those dropped with `[0]`.
        let mut seen: Vec<&str> = Vec::new();
        let mut pos = 0;
        while pos < cleaned.len() {
            let Some((element, end)) = table.scan_symbol(&cleaned, pos) else {
                return Err(unknown_symbol(table, input, &cleaned, pos));
            };
            if seen.contains(&element.symbol()) {
                return Err(ModelError::DuplicateElement {
                    symbol: element.symbol().to_string(),
                });
            }
            seen.push(element.symbol());
            pos = end;
            let bound = if cleaned[pos..].starts_with('[') {
                let close = cleaned[pos..]
                    .find(']')
                    .map(|offset| pos + offset)
                    .ok_or_else(|| ModelError::alphabet(input, "missing ']'"))?;
                let bound = parse_interval(input, element, &cleaned[pos + 1..close])?;
                pos = close + 1;
                bound
            } else {
                Bound::ANY
            };
            // X[0] removes the element.
            if bound.max() > 0 {
                elements.push(element.clone());
                bounds.push(bound);
            }
        }
        let alphabet = Alphabet::new(elements)?;
        let bounds = Bounds::new(&alphabet, bounds)?;
        Ok(Self { alphabet, bounds })
    }

    /// Bounds tightened against `parent`, see [`Bounds::tightened_by`].
    pub fn with_parent(&self, parent: &MolecularFormula) -> Result<Self> {
        Ok(Self {
            alphabet: self.alphabet.clone(),
            bounds: self.bounds.tightened_by(&self.alphabet, parent)?,
        })
    }
}

impl fmt::Display for ConstrainedAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (element, bound) in self.alphabet.iter().zip(self.bounds.iter()) {
            write!(f, "{}{bound}", element.symbol())?;
        }
        Ok(())
    }
}

fn parse_interval(input: &str, element: &Element, body: &str) -> Result<Bound> {
    let parse_count = |text: &str| -> Result<Option<u32>> {
        if text.is_empty() {
            return Ok(None);
        }
        text.parse::<u32>().map(Some).map_err(|_| {
            ModelError::alphabet(
                input,
                format!("invalid count '{text}' for {}", element.symbol()),
            )
        })
    };
    let (min, max) = match body.split_once('-') {
        Some((min, max)) => (parse_count(min)?.unwrap_or(0), parse_count(max)?),
        None => (0, parse_count(body)?),
    };
    let max = max.unwrap_or(Bound::UNBOUNDED);
    Bound::new(min, max).ok_or_else(|| ModelError::InvalidBound {
        symbol: element.symbol().to_string(),
        min,
        max,
    })
}

fn unknown_symbol(table: &PeriodicTable, input: &str, cleaned: &str, pos: usize) -> ModelError {
    let rest = &cleaned[pos..];
    let token: String = rest
        .char_indices()
        .take_while(|&(i, c)| if i == 0 { c.is_ascii_alphabetic() } else { c.is_ascii_lowercase() })
        .map(|(_, c)| c)
        .collect();
    if token.is_empty() || !token.starts_with(|c: char| c.is_ascii_uppercase()) {
        let found = rest.chars().next().unwrap_or(' ');
        return ModelError::alphabet(input, format!("unexpected character '{found}'"));
    }
    if table.contains(&token) {
        ModelError::alphabet(input, format!("unexpected text after '{token}'"))
    } else {
        ModelError::UnknownElement { symbol: token }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PeriodicTable {
        PeriodicTable::default()
    }

    #[test]
    fn parses_plain_symbols_as_unbounded() {
        let parsed = ConstrainedAlphabet::parse(&table(), "CHNOPS").unwrap();
        assert_eq!(parsed.alphabet.to_string(), "CHNOPS");
        assert!(parsed.bounds.iter().all(|b| b == Bound::ANY));
    }

    #[test]
    fn parses_interval_forms() {
        let parsed = ConstrainedAlphabet::parse(&table(), "CH[2-20]N[1-]O[-5]P[3]").unwrap();
        let bound = |symbol| parsed.bounds.get(parsed.alphabet.index_of(symbol).unwrap());
        assert_eq!(bound("C"), Bound::ANY);
        assert_eq!(bound("H"), Bound::new(2, 20).unwrap());
        assert_eq!(bound("N"), Bound::at_least(1));
        assert_eq!(bound("O"), Bound::at_most(5));
        assert_eq!(bound("P"), Bound::at_most(3));
    }

    #[test]
    fn zero_upper_bound_drops_element() {
        let parsed = ConstrainedAlphabet::parse(&table(), "C, H, Cl[0], N").unwrap();
        assert_eq!(parsed.alphabet.to_string(), "CHN");
    }

    #[test]
    fn rejects_bad_input() {
        let t = table();
        assert!(matches!(
            ConstrainedAlphabet::parse(&t, "CXq").unwrap_err(),
            ModelError::UnknownElement { .. }
        ));
        assert!(matches!(
            ConstrainedAlphabet::parse(&t, "C[5-2]").unwrap_err(),
            ModelError::InvalidBound { .. }
        ));
        assert!(matches!(
            ConstrainedAlphabet::parse(&t, "CC").unwrap_err(),
            ModelError::DuplicateElement { .. }
        ));
        for repeated in ["C[0]C", "CHC[0]", "Cl[0]NCl[2]"] {
            assert!(
                matches!(
                    ConstrainedAlphabet::parse(&t, repeated).unwrap_err(),
                    ModelError::DuplicateElement { .. }
                ),
                "{repeated}"
            );
        }
        assert!(matches!(
            ConstrainedAlphabet::parse(&t, "C[1-").unwrap_err(),
            ModelError::InvalidAlphabet { .. }
        ));
        assert!(matches!(
            ConstrainedAlphabet::parse(&t, "C6").unwrap_err(),
            ModelError::InvalidAlphabet { .. }
        ));
    }

    #[test]
    fn deserialized_bounds_keep_min_below_max() {
        let bound: Bound = serde_json::from_str(r#"{"min": 2, "max": 5}"#).unwrap();
        assert_eq!(bound, Bound::new(2, 5).unwrap());
        let open: Bound = serde_json::from_str(r#"{"min": 3}"#).unwrap();
        assert_eq!(open, Bound::at_least(3));
        assert!(serde_json::from_str::<Bound>(r#"{"min": 5, "max": 2}"#).is_err());
    }

    #[test]
    fn deserialized_alphabets_are_validated() {
        let duplicate = r#"{"elements": [
            {"symbol": "C", "name": "Carbon", "mass": 12.0, "valence": 4},
            {"symbol": "C", "name": "Carbon", "mass": 12.0, "valence": 4}
        ]}"#;
        assert!(serde_json::from_str::<Alphabet>(duplicate).is_err());

        let mismatched = r#"{
            "alphabet": {"elements": [{"symbol": "C", "name": "Carbon", "mass": 12.0, "valence": 4}]},
            "bounds": {"bounds": []}
        }"#;
        assert!(serde_json::from_str::<ConstrainedAlphabet>(mismatched).is_err());

        let parsed = ConstrainedAlphabet::parse(&table(), "CH[2-20]N[1-]").unwrap();
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(serde_json::from_str::<ConstrainedAlphabet>(&json).unwrap(), parsed);
    }

    #[test]
    fn iterators_can_be_replayed() {
        let parsed = ConstrainedAlphabet::parse(&table(), "CH[2-20]O").unwrap();
        let masses = parsed.alphabet.iter().map(Element::mass);
        let total: f64 = masses.clone().sum();
        assert_eq!(masses.count(), 3);
        assert!(total > 29.0);

        let bounds = parsed.bounds.iter();
        assert_eq!(bounds.clone().nth(1), Some(Bound::new(2, 20).unwrap()));
        assert_eq!(bounds.count(), 3);
    }

    #[test]
    fn display_round_trips() {
        let input = "CH[2-20]N[1-]O[5]";
        let parsed = ConstrainedAlphabet::parse(&table(), input).unwrap();
        assert_eq!(parsed.to_string(), input);
    }
}
