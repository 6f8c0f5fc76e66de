//! Ranking and text/JSON rendering of decomposition results.

use std::fmt::Write as _;

use serde::Serialize;

use decomp_model::{Alphabet, Compomer, MolecularFormula};

/// One reported formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub formula: MolecularFormula,
    /// Neutral monoisotopic mass of the formula.
    pub mass: f64,
    /// Query mass minus formula mass, in Dalton.
    pub error: f64,
    pub ppm: f64,
    pub rdbe: f64,
}

/// Everything reported for one input mass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Mass as given on the command line.
    pub query: f64,
    pub neutral_mass: f64,
    pub ion: String,
    pub candidates: Vec<Candidate>,
}

/// Turns raw compomers into candidates ordered by absolute error, then by
/// formula text.
pub fn rank_candidates(
    alphabet: &Alphabet,
    neutral_mass: f64,
    compomers: &[Compomer],
) -> Vec<Candidate> {
    let mut candidates: Vec<(String, Candidate)> = compomers
        .iter()
        .map(|compomer| {
            let formula = compomer.to_formula(alphabet);
            let mass = compomer.mass(alphabet);
            let error = neutral_mass - mass;
            let ppm = if neutral_mass > 0.0 {
                error / neutral_mass * 1e6
            } else {
                0.0
            };
            let candidate = Candidate {
                rdbe: compomer.rdbe(alphabet),
                formula,
                mass,
                error,
                ppm,
            };
            (candidate.formula.to_string(), candidate)
        })
        .collect();
    candidates.sort_by(|(left_name, left), (right_name, right)| {
        left.error
            .abs()
            .total_cmp(&right.error.abs())
            .then_with(|| left_name.cmp(right_name))
    });
    candidates.into_iter().map(|(_, candidate)| candidate).collect()
}

/// One formula per line. With several queries each block starts with a
/// `# <mass>` header line.
pub fn render_plain(results: &[QueryResult], with_errors: bool) -> String {
    let mut out = String::new();
    let headers = results.len() > 1;
    for result in results {
        if headers {
            let _ = writeln!(out, "# {}", result.query);
        }
        for candidate in &result.candidates {
            if with_errors {
                let _ = writeln!(
                    out,
                    "{}\t{:.6}\t{:.2}",
                    candidate.formula, candidate.error, candidate.ppm
                );
            } else {
                let _ = writeln!(out, "{}", candidate.formula);
            }
        }
    }
    out
}

/// Pretty-printed JSON array with one object per query.
pub fn render_json(results: &[QueryResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomp_model::PeriodicTable;

    #[test]
    fn zero_mass_has_zero_ppm() {
        let table = PeriodicTable::default();
        let alphabet = Alphabet::from_symbols(&table, &["C"]).unwrap();
        let ranked = rank_candidates(&alphabet, 0.0, &[Compomer::new(vec![0])]);
        assert_eq!(ranked[0].ppm, 0.0);
        assert!(ranked[0].formula.is_empty());
    }

    #[test]
    fn single_query_has_no_header() {
        let result = QueryResult {
            query: 1.0,
            neutral_mass: 1.0,
            ion: "[M]".to_string(),
            candidates: Vec::new(),
        };
        assert_eq!(render_plain(&[result], false), "");
    }
}
