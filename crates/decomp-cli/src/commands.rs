//! Command implementations.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use decomp_cli::report::{QueryResult, rank_candidates};
use decomp_core::{DecompConfig, DecompositionRequest, Decomposer};
use decomp_model::{ConstrainedAlphabet, Deviation, Ionization, MolecularFormula, PeriodicTable};
use decomp_validate::{FilterLevel, ValidationContext};

use crate::cli::DecomposeArgs;

/// Loads the config file when one is given, else the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<DecompConfig> {
    match path {
        Some(path) => DecompConfig::from_path(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(DecompConfig::default()),
    }
}

/// Flags override the config file; the config file overrides built-ins.
fn resolve_filter(args: &DecomposeArgs, config: &DecompConfig) -> Result<FilterLevel> {
    match (args.filter, args.no_filter) {
        (None, false) => Ok(config.filter),
        (filter, no_filter) => Ok(FilterLevel::resolve(filter.map(Into::into), no_filter)?),
    }
}

fn resolve_ionization(args: &DecomposeArgs, config: &DecompConfig) -> Result<Ionization> {
    if args.neutral {
        return Ok(Ionization::NEUTRAL);
    }
    match &args.ion {
        Some(name) => Ionization::parse(name).with_context(|| format!("parse ion type {name}")),
        None => config.ionization().context("ion type from config"),
    }
}

pub fn run_decompose(args: &DecomposeArgs, config: &DecompConfig) -> Result<Vec<QueryResult>> {
    let table = PeriodicTable::default();
    let deviation = Deviation::with_precision(
        args.ppm.unwrap_or(config.ppm),
        args.absolute.unwrap_or(config.absolute),
        args.precision.unwrap_or(config.precision),
    )
    .context("invalid tolerance")?;
    let alphabet_text = args.alphabet.as_deref().unwrap_or(&config.alphabet);
    let constrained = ConstrainedAlphabet::parse(&table, alphabet_text)
        .with_context(|| format!("parse alphabet {alphabet_text}"))?;
    let parent = args
        .parent
        .as_deref()
        .map(|text| {
            MolecularFormula::parse(&table, text)
                .with_context(|| format!("parse parent formula {text}"))
        })
        .transpose()?;
    let filter = resolve_filter(args, config)?;
    let ionization = resolve_ionization(args, config)?;

    let span = info_span!(
        "decompose",
        alphabet = %constrained,
        filter = %filter,
        ion = %ionization,
        masses = args.masses.len()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let neutral_masses: Vec<f64> = args
        .masses
        .iter()
        .map(|&mass| ionization.precursor_to_neutral(mass))
        .collect();
    for (query, neutral) in args.masses.iter().zip(&neutral_masses) {
        if *neutral < 0.0 {
            warn!(query, neutral, "mass is below the ion adduct mass");
        }
    }

    let mut template = DecompositionRequest::new(0.0, &constrained.alphabet, &constrained.bounds)
        .with_deviation(deviation)
        .with_validator(filter.validator(&config.presets))
        .with_context(ValidationContext::neutral());
    if let Some(parent) = &parent {
        template = template.with_parent(parent);
    }

    let decomposer = Decomposer::new();
    let found = decomposer
        .decompose_batch(&neutral_masses, &template, args.threads)
        .context("decomposition failed")?;

    let results: Vec<QueryResult> = args
        .masses
        .iter()
        .zip(&neutral_masses)
        .zip(found)
        .map(|((&query, &neutral_mass), compomers)| QueryResult {
            query,
            neutral_mass,
            ion: ionization.name().to_string(),
            candidates: rank_candidates(&constrained.alphabet, neutral_mass, &compomers),
        })
        .collect();

    let total: usize = results.iter().map(|result| result.candidates.len()).sum();
    info!(
        candidates = total,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "decomposition complete"
    );
    Ok(results)
}

pub fn run_elements() -> Result<()> {
    crate::summary::print_elements(&PeriodicTable::default());
    Ok(())
}
