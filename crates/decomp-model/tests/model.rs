#![allow(missing_docs)]

use decomp_model::{
    Alphabet, Bound, Compomer, ConstrainedAlphabet, Deviation, Element, Ionization, ModelError,
    MolecularFormula, PeriodicTable,
};

#[test]
fn custom_table_supports_isotope_like_symbols() {
    let table = PeriodicTable::new(vec![
        Element::new("C", "Carbon", 12.0, 4),
        Element::new("H", "Hydrogen", 1.007_825_032_07, 1),
        Element::new("D", "Deuterium", 2.014_101_778, 1),
    ])
    .unwrap();
    let parsed = ConstrainedAlphabet::parse(&table, "CHD[2]").unwrap();
    assert_eq!(parsed.alphabet.len(), 3);
    assert_eq!(parsed.bounds.get(2), Bound::at_most(2));

    // Not in this table even though it is in the standard one.
    assert!(matches!(
        ConstrainedAlphabet::parse(&table, "CHN").unwrap_err(),
        ModelError::UnknownElement { symbol } if symbol == "N"
    ));
}

#[test]
fn duplicate_symbols_are_rejected_by_table() {
    let err = PeriodicTable::new(vec![
        Element::new("C", "Carbon", 12.0, 4),
        Element::new("C", "Carbon", 12.0, 4),
    ])
    .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateElement { .. }));
}

#[test]
fn two_letter_symbols_win_over_prefixes() {
    let table = PeriodicTable::default();
    let parsed = ConstrainedAlphabet::parse(&table, "CClNa[1]").unwrap();
    assert_eq!(parsed.alphabet.to_string(), "CClNa");

    let salt = MolecularFormula::parse(&table, "NaCl").unwrap();
    assert_eq!(salt.to_string(), "ClNa");
    assert!((salt.mass() - 57.958_622).abs() < 1e-5);
}

#[test]
fn parent_formula_caps_bounds() {
    let table = PeriodicTable::default();
    let constrained = ConstrainedAlphabet::parse(&table, "CHN[1-]O").unwrap();
    let parent = MolecularFormula::parse(&table, "C6H12O6N2").unwrap();
    let capped = constrained.with_parent(&parent).unwrap();
    assert_eq!(capped.bounds.get(0), Bound::at_most(6));
    assert_eq!(capped.bounds.get(2), Bound::new(1, 2).unwrap());

    let no_nitrogen = MolecularFormula::parse(&table, "C6H12O6").unwrap();
    assert!(matches!(
        constrained.with_parent(&no_nitrogen).unwrap_err(),
        ModelError::ParentConflict { symbol, min: 1, parent: 0 } if symbol == "N"
    ));
}

#[test]
fn compomer_respects_bounds() {
    let table = PeriodicTable::default();
    let constrained = ConstrainedAlphabet::parse(&table, "C[1-3]H").unwrap();
    assert!(Compomer::new(vec![2, 40]).is_within(&constrained.bounds));
    assert!(!Compomer::new(vec![0, 4]).is_within(&constrained.bounds));
    assert!(!Compomer::new(vec![2]).is_within(&constrained.bounds));
}

#[test]
fn formula_subset_check() {
    let table = PeriodicTable::default();
    let small = MolecularFormula::parse(&table, "C2H6O").unwrap();
    let large = MolecularFormula::parse(&table, "C6H12O6").unwrap();
    assert!(small.is_subformula_of(&large));
    assert!(!large.is_subformula_of(&small));
    assert_eq!(large.atom_count(), 24);
}

#[test]
fn protonated_glucose_window() {
    let table = PeriodicTable::default();
    let glucose = MolecularFormula::parse(&table, "C6H12O6").unwrap();
    let ion = Ionization::default();
    let precursor = ion.neutral_to_precursor(glucose.mass());
    assert!((precursor - 181.070_665).abs() < 1e-5);

    let deviation = Deviation::default();
    let window = deviation.window(ion.precursor_to_neutral(precursor));
    assert!(window.contains(glucose.mass()));
    assert!(window.width() > 0.0);
}

#[test]
fn alphabet_equality_is_structural() {
    let table = PeriodicTable::default();
    let a = Alphabet::from_symbols(&table, &["C", "H", "O"]).unwrap();
    let b = Alphabet::from_symbols(&table, &["C", "H", "O"]).unwrap();
    let c = Alphabet::from_symbols(&table, &["H", "C", "O"]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}
