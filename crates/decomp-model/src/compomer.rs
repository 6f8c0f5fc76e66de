//! Integer composition vectors produced by the decomposer.

use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, Bounds};
use crate::formula::MolecularFormula;

/// Per-element atom counts, indexed by alphabet position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Compomer {
    counts: Vec<u32>,
}

impl Compomer {
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn count(&self, index: usize) -> u32 {
        self.counts[index]
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Exact monoisotopic mass over `alphabet`.
    pub fn mass(&self, alphabet: &Alphabet) -> f64 {
        debug_assert_eq!(self.counts.len(), alphabet.len());
        alphabet
            .iter()
            .zip(&self.counts)
            .map(|(element, &count)| element.mass() * f64::from(count))
            .sum()
    }

    /// Ring and double bond equivalents over `alphabet`.
    pub fn rdbe(&self, alphabet: &Alphabet) -> f64 {
        let doubled: i64 = alphabet
            .iter()
            .zip(&self.counts)
            .map(|(element, &count)| i64::from(count) * (i64::from(element.valence()) - 2))
            .sum();
        1.0 + doubled as f64 / 2.0
    }

    /// Count of the element with `symbol`, zero if it is not in `alphabet`.
    pub fn count_of(&self, alphabet: &Alphabet, symbol: &str) -> u32 {
        alphabet.index_of(symbol).map_or(0, |index| self.counts[index])
    }

    pub fn to_formula(&self, alphabet: &Alphabet) -> MolecularFormula {
        MolecularFormula::from_counts(alphabet.iter().zip(self.counts.iter().copied()))
    }

    pub fn is_within(&self, bounds: &Bounds) -> bool {
        self.counts.len() == bounds.len()
            && self
                .counts
                .iter()
                .zip(bounds.iter())
                .all(|(&count, bound)| bound.contains(count))
    }
}
