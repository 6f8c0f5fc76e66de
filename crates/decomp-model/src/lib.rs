//! Core types for mass decomposition: elements, alphabets with count bounds,
//! mass deviations, compomers and molecular formulas.

pub mod alphabet;
pub mod compomer;
pub mod deviation;
pub mod element;
pub mod error;
pub mod formula;
pub mod ionization;

pub use alphabet::{Alphabet, Bound, Bounds, ConstrainedAlphabet};
pub use compomer::Compomer;
pub use deviation::{
    DEFAULT_ABSOLUTE, DEFAULT_PPM, DEFAULT_PRECISION, Deviation, MAX_PRECISION, MassWindow,
};
pub use element::{Element, PeriodicTable};
pub use error::{ModelError, Result};
pub use formula::MolecularFormula;
pub use ionization::{ELECTRON_MASS, Ionization, PROTON_MASS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constrained_alphabet_serializes() {
        let table = PeriodicTable::default();
        let parsed = ConstrainedAlphabet::parse(&table, "CH[0-20]O[5]").unwrap();
        let json = serde_json::to_string(&parsed).expect("serialize alphabet");
        let round: ConstrainedAlphabet = serde_json::from_str(&json).expect("deserialize alphabet");
        assert_eq!(round, parsed);
    }
}
