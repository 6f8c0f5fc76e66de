use decomp_cli::report::{QueryResult, rank_candidates, render_json, render_plain};
use decomp_model::{Alphabet, Compomer, Element, PeriodicTable};

fn integer_alphabet() -> Alphabet {
    Alphabet::new(vec![
        Element::new("C", "Carbon", 12.0, 4),
        Element::new("H", "Hydrogen", 1.0, 1),
    ])
    .unwrap()
}

fn query(alphabet: &Alphabet, mass: f64, compomers: &[Compomer]) -> QueryResult {
    QueryResult {
        query: mass,
        neutral_mass: mass,
        ion: "[M]".to_string(),
        candidates: rank_candidates(alphabet, mass, compomers),
    }
}

#[test]
fn candidates_are_ranked_by_absolute_error() {
    let table = PeriodicTable::default();
    let alphabet = Alphabet::from_symbols(&table, &["C", "H", "O"]).unwrap();
    let glucose = Compomer::new(vec![6, 12, 6]);
    let target = glucose.mass(&alphabet) + 0.000_2;
    let far = Compomer::new(vec![7, 16, 5]);
    let ranked = rank_candidates(&alphabet, target, &[far, glucose]);

    assert_eq!(ranked[0].formula.to_string(), "C6H12O6");
    assert!((ranked[0].error - 0.000_2).abs() < 1e-9);
    assert!(ranked[0].ppm > 0.0);
    assert_eq!(ranked[0].rdbe, 1.0);
    assert!(ranked[1].error.abs() > ranked[0].error.abs());
}

#[test]
fn equal_errors_fall_back_to_formula_order() {
    let alphabet = integer_alphabet();
    let ranked = rank_candidates(
        &alphabet,
        14.0,
        &[Compomer::new(vec![0, 14]), Compomer::new(vec![1, 2])],
    );
    let names: Vec<String> = ranked.iter().map(|c| c.formula.to_string()).collect();
    assert_eq!(names, vec!["CH2", "H14"]);
}

#[test]
fn plain_output_for_several_masses() {
    let alphabet = integer_alphabet();
    let results = vec![
        query(&alphabet, 14.0, &[Compomer::new(vec![0, 14]), Compomer::new(vec![1, 2])]),
        query(&alphabet, 13.0, &[Compomer::new(vec![1, 1])]),
    ];
    insta::assert_snapshot!(render_plain(&results, false), @r"
    # 14
    CH2
    H14
    # 13
    CH
    ");
}

#[test]
fn plain_output_with_errors() {
    let alphabet = integer_alphabet();
    let results = vec![query(&alphabet, 14.0, &[Compomer::new(vec![1, 2])])];
    assert_eq!(render_plain(&results, true), "CH2\t0.000000\t0.00\n");
}

#[test]
fn json_output_lists_every_field() {
    let alphabet = integer_alphabet();
    let results = vec![query(&alphabet, 14.0, &[Compomer::new(vec![1, 2])])];
    let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();

    let first = &json[0];
    assert_eq!(first["query"], 14.0);
    assert_eq!(first["ion"], "[M]");
    let candidate = &first["candidates"][0];
    assert_eq!(candidate["formula"], "CH2");
    assert_eq!(candidate["mass"], 14.0);
    assert_eq!(candidate["error"], 0.0);
    assert_eq!(candidate["rdbe"], 1.0);
}
