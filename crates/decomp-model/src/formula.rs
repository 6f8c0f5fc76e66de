//! Molecular formulas such as `C6H12O6`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::element::{Element, PeriodicTable};
use crate::error::{ModelError, Result};

/// Element counts of a molecule, kept in Hill order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MolecularFormula {
    entries: Vec<(Element, u32)>,
}

impl MolecularFormula {
    /// Collects `(element, count)` pairs, summing repeated elements and
    /// dropping zero counts.
    pub fn from_counts<'a>(counts: impl IntoIterator<Item = (&'a Element, u32)>) -> Self {
        let mut entries: Vec<(Element, u32)> = Vec::new();
        for (element, count) in counts {
            if count == 0 {
                continue;
            }
            match entries.iter_mut().find(|(e, _)| e.symbol() == element.symbol()) {
                Some((_, existing)) => *existing += count,
                None => entries.push((element.clone(), count)),
            }
        }
        let mut formula = Self { entries };
        formula.sort_hill();
        formula
    }

    /// Parses a formula like `C6H12O6` or `CH3COOH`.
    ///
    /// # Errors
    ///
    /// Fails on unknown elements, stray characters or an empty input.
    pub fn parse(table: &PeriodicTable, input: &str) -> Result<Self> {
        let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() {
            return Err(ModelError::formula(input, "formula is empty"));
        }
        let bytes = cleaned.as_bytes();
        let mut counts = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let Some((element, end)) = table.scan_symbol(&cleaned, pos) else {
                return Err(if bytes[pos].is_ascii_uppercase() {
                    let symbol: String = cleaned[pos..]
                        .char_indices()
                        .take_while(|&(i, c)| i == 0 || c.is_ascii_lowercase())
                        .map(|(_, c)| c)
                        .collect();
                    ModelError::UnknownElement { symbol }
                } else {
                    ModelError::formula(
                        input,
                        format!("unexpected character '{}'", char::from(bytes[pos])),
                    )
                });
            };
            pos = end;
            let digits_end = cleaned[pos..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(cleaned.len(), |offset| pos + offset);
            let count = if digits_end == pos {
                1
            } else {
                cleaned[pos..digits_end]
                    .parse::<u32>()
                    .map_err(|_| ModelError::formula(input, "element count out of range"))?
            };
            pos = digits_end;
            counts.push((element, count));
        }
        Ok(Self::from_counts(counts))
    }

    /// Number of atoms of `symbol`, zero when absent.
    pub fn count_of(&self, symbol: &str) -> u32 {
        self.entries
            .iter()
            .find(|(element, _)| element.symbol() == symbol)
            .map_or(0, |&(_, count)| count)
    }

    /// Monoisotopic mass in Dalton.
    pub fn mass(&self) -> f64 {
        self.entries
            .iter()
            .map(|(element, count)| element.mass() * f64::from(*count))
            .sum()
    }

    /// Ring and double bond equivalents, `1 + Σ n·(valence − 2)/2`.
    pub fn rdbe(&self) -> f64 {
        let doubled: i64 = self
            .entries
            .iter()
            .map(|(element, count)| i64::from(*count) * (i64::from(element.valence()) - 2))
            .sum();
        1.0 + doubled as f64 / 2.0
    }

    pub fn atom_count(&self) -> u64 {
        self.entries.iter().map(|&(_, count)| u64::from(count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Element, u32)> {
        self.entries.iter().map(|(element, count)| (element, *count))
    }

    /// Whether every element count is at most the count in `other`.
    pub fn is_subformula_of(&self, other: &MolecularFormula) -> bool {
        self.iter()
            .all(|(element, count)| count <= other.count_of(element.symbol()))
    }

    fn sort_hill(&mut self) {
        let has_carbon = self.entries.iter().any(|(e, _)| e.is_carbon());
        self.entries
            .sort_by(|(a, _), (b, _)| hill_key(a, has_carbon).cmp(&hill_key(b, has_carbon)));
    }
}

/// Hill order: carbon, then hydrogen, then alphabetical. Without carbon
/// every element is alphabetical.
fn hill_key(element: &Element, has_carbon: bool) -> (u8, &str) {
    let rank = match (has_carbon, element.symbol()) {
        (true, "C") => 0,
        (true, "H") => 1,
        _ => 2,
    };
    (rank, element.symbol())
}

impl fmt::Display for MolecularFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (element, count) in self.iter() {
            f.write_str(element.symbol())?;
            if count != 1 {
                write!(f, "{count}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for MolecularFormula {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_in_hill_order() {
        let table = PeriodicTable::default();
        let glucose = MolecularFormula::parse(&table, "O6H12C6").unwrap();
        assert_eq!(glucose.to_string(), "C6H12O6");
        assert!((glucose.mass() - 180.063_388).abs() < 1e-5);
        assert_eq!(glucose.rdbe(), 1.0);
    }

    #[test]
    fn repeated_elements_are_summed() {
        let table = PeriodicTable::default();
        let acetic = MolecularFormula::parse(&table, "CH3COOH").unwrap();
        assert_eq!(acetic.to_string(), "C2H4O2");
        assert_eq!(acetic.count_of("H"), 4);
        assert_eq!(acetic.count_of("N"), 0);
    }

    #[test]
    fn without_carbon_everything_is_alphabetical() {
        let table = PeriodicTable::default();
        let formula = MolecularFormula::parse(&table, "H2SO4").unwrap();
        assert_eq!(formula.to_string(), "H2O4S");
    }

    #[test]
    fn rejects_unknown_elements() {
        let table = PeriodicTable::default();
        assert!(matches!(
            MolecularFormula::parse(&table, "C6Xx2").unwrap_err(),
            ModelError::UnknownElement { .. }
        ));
        assert!(matches!(
            MolecularFormula::parse(&table, "C6(OH)2").unwrap_err(),
            ModelError::InvalidFormula { .. }
        ));
    }
}
