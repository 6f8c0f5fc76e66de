#![allow(missing_docs)]

use std::collections::BTreeSet;

use decomp_core::{DecompositionRequest, Decomposer};
use decomp_model::{Alphabet, Bound, Bounds, Compomer, Deviation, PeriodicTable};
use proptest::prelude::*;

const SYMBOLS: [&str; 6] = ["H", "C", "N", "O", "P", "S"];

/// Every in-bounds vector whose exact mass lies in the window.
fn brute_force(alphabet: &Alphabet, bounds: &Bounds, deviation: &Deviation, mass: f64) -> BTreeSet<Compomer> {
    let window = deviation.window(mass);
    let mut found = BTreeSet::new();
    let mut counts: Vec<u32> = bounds.iter().map(|bound| bound.min()).collect();
    loop {
        let compomer = Compomer::new(counts.clone());
        if window.contains(compomer.mass(alphabet)) {
            found.insert(compomer);
        }
        let mut position = 0;
        loop {
            if position == counts.len() {
                return found;
            }
            if counts[position] < bounds.get(position).max() {
                counts[position] += 1;
                break;
            }
            counts[position] = bounds.get(position).min();
            position += 1;
        }
    }
}

fn scenario() -> impl Strategy<Value = (Vec<usize>, Vec<(u32, u32)>, Vec<u32>, f64, f64, f64, u32)> {
    prop::sample::subsequence((0..SYMBOLS.len()).collect::<Vec<_>>(), 1..=4).prop_flat_map(|picked| {
        let len = picked.len();
        (
            Just(picked),
            prop::collection::vec((0u32..3, 0u32..6), len),
            prop::collection::vec(0u32..8, len),
            -0.02f64..0.02,
            0.0f64..50.0,
            0.0f64..0.01,
            2u32..=4,
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn search_matches_brute_force(
        (picked, ranges, seed, offset, ppm, absolute, precision) in scenario()
    ) {
        let table = PeriodicTable::default();
        let symbols: Vec<&str> = picked.iter().map(|&index| SYMBOLS[index]).collect();
        let alphabet = Alphabet::from_symbols(&table, &symbols).unwrap();
        let bound_list: Vec<Bound> = ranges
            .iter()
            .map(|&(min, extra)| Bound::new(min, min + extra).unwrap())
            .collect();
        let bounds = Bounds::new(&alphabet, bound_list).unwrap();

        // Aim near a real composition so windows are rarely empty.
        let target: Vec<u32> = seed
            .iter()
            .zip(bounds.iter())
            .map(|(&count, bound)| count.clamp(bound.min(), bound.max()))
            .collect();
        let mass = (Compomer::new(target).mass(&alphabet) + offset).max(0.0);
        let deviation = Deviation::with_precision(ppm, absolute, precision).unwrap();

        let request = DecompositionRequest::new(mass, &alphabet, &bounds).with_deviation(deviation);
        let found = Decomposer::new().decompose(&request).unwrap();
        let unique: BTreeSet<Compomer> = found.iter().cloned().collect();
        prop_assert_eq!(unique.len(), found.len(), "duplicates in result");

        let expected = if mass == 0.0 {
            BTreeSet::new()
        } else {
            brute_force(&alphabet, &bounds, &deviation, mass)
        };
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn pre_check_never_rejects_a_solvable_mass(
        (picked, ranges, seed, _offset, ppm, absolute, precision) in scenario()
    ) {
        let table = PeriodicTable::default();
        let symbols: Vec<&str> = picked.iter().map(|&index| SYMBOLS[index]).collect();
        let alphabet = Alphabet::from_symbols(&table, &symbols).unwrap();
        let bound_list: Vec<Bound> = ranges
            .iter()
            .map(|&(min, extra)| Bound::new(min, min + extra).unwrap())
            .collect();
        let bounds = Bounds::new(&alphabet, bound_list).unwrap();
        let target: Vec<u32> = seed
            .iter()
            .zip(bounds.iter())
            .map(|(&count, bound)| count.clamp(bound.min(), bound.max()))
            .collect();
        let mass = Compomer::new(target).mass(&alphabet);
        prop_assume!(mass > 0.0);
        let deviation = Deviation::with_precision(ppm, absolute, precision).unwrap();

        let request = DecompositionRequest::new(mass, &alphabet, &bounds).with_deviation(deviation);
        let decomposer = Decomposer::new();
        prop_assert!(decomposer.maybe_decomposable(&request).unwrap());
        prop_assert!(!decomposer.decompose(&request).unwrap().is_empty());
    }
}
