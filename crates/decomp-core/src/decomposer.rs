//! Query facade over cached residue tables.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread;

use tracing::{debug, trace};

use decomp_model::{Alphabet, Bounds, Compomer, Deviation, MassWindow, MolecularFormula};
use decomp_validate::{ValidationContext, Validator};

use crate::error::{DecompError, Result};
use crate::residue::{ResidueTable, shifted_caps};
use crate::search::{Search, SearchStats};
use crate::weights::IntegerWeights;

/// Everything one decomposition query needs.
#[derive(Debug, Clone, Copy)]
pub struct DecompositionRequest<'a> {
    /// Neutral mass in Dalton.
    pub mass: f64,
    pub deviation: Deviation,
    pub alphabet: &'a Alphabet,
    pub bounds: &'a Bounds,
    /// Known parent formula; caps every upper bound at its counts.
    pub parent: Option<&'a MolecularFormula>,
    pub validator: Validator,
    pub context: ValidationContext,
}

impl<'a> DecompositionRequest<'a> {
    /// A request with the default deviation and no validator.
    pub fn new(mass: f64, alphabet: &'a Alphabet, bounds: &'a Bounds) -> Self {
        Self {
            mass,
            deviation: Deviation::default(),
            alphabet,
            bounds,
            parent: None,
            validator: Validator::None,
            context: ValidationContext::default(),
        }
    }

    pub fn with_deviation(mut self, deviation: Deviation) -> Self {
        self.deviation = deviation;
        self
    }

    pub fn with_parent(mut self, parent: &'a MolecularFormula) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }

    /// The same request for a different mass.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableKey {
    alphabet: Alphabet,
    bounds: Bounds,
    precision: u32,
}

type TableSlot = Arc<OnceLock<Arc<ResidueTable>>>;

/// Decomposes masses into element compositions.
///
/// Residue tables are built on first use of an (alphabet, bounds, precision)
/// combination and shared by every later query. The decomposer is `Send +
/// Sync`; queries only take the cache lock long enough to find their slot,
/// and a table is built exactly once even when many threads ask for it at
/// the same time.
#[derive(Debug, Default)]
pub struct Decomposer {
    tables: Mutex<HashMap<TableKey, TableSlot>>,
}

/// Query inputs after bounds, window and table have been resolved.
struct Prepared<'q> {
    window: MassWindow,
    bounds: Cow<'q, Bounds>,
    table: Arc<ResidueTable>,
    integer_window: (i64, i64),
}

impl Decomposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every compomer whose exact mass lies in the tolerance window and
    /// which the request's validator accepts. The order is unspecified.
    ///
    /// # Errors
    ///
    /// Fails for negative or non-finite masses, mismatched bounds, a parent
    /// formula conflicting with the lower bounds, or a precision too coarse
    /// for an element of the alphabet.
    pub fn decompose(&self, request: &DecompositionRequest<'_>) -> Result<Vec<Compomer>> {
        self.decompose_with_stats(request)
            .map(|(compomers, _)| compomers)
    }

    /// Like [`Decomposer::decompose`], also returning the search counters.
    pub fn decompose_with_stats(
        &self,
        request: &DecompositionRequest<'_>,
    ) -> Result<(Vec<Compomer>, SearchStats)> {
        let Some(prepared) = self.prepare(request)? else {
            return Ok((Vec::new(), SearchStats::default()));
        };
        let alphabet = request.alphabet;
        let order = prepared.table.weights().order();
        let minimums: Vec<u32> = prepared.bounds.iter().map(|bound| bound.min()).collect();

        let mut results = Vec::new();
        let mut rejected_exact = 0;
        let mut rejected_filter = 0;
        let mut search = Search::new(&prepared.table);
        let (lo, hi) = prepared.integer_window;
        search.run(lo, hi, |shifted| {
            let mut counts = minimums.clone();
            for (position, &count) in shifted.iter().enumerate() {
                counts[order[position]] += count;
            }
            let compomer = Compomer::new(counts);
            if !prepared.window.contains(compomer.mass(alphabet)) {
                rejected_exact += 1;
                return;
            }
            if !request.validator.accepts(&compomer, alphabet, request.context) {
                rejected_filter += 1;
                return;
            }
            results.push(compomer);
        });

        let mut stats = search.stats();
        stats.rejected_exact = rejected_exact;
        stats.rejected_filter = rejected_filter;
        debug!(
            mass = request.mass,
            alphabet = %alphabet,
            candidates = results.len(),
            nodes = stats.nodes,
            pruned = stats.pruned,
            emitted = stats.emitted,
            rejected_exact = stats.rejected_exact,
            rejected_filter = stats.rejected_filter,
            "decomposed mass"
        );
        Ok((results, stats))
    }

    /// Cheap pre-check: `false` means [`Decomposer::decompose`] would find
    /// nothing before validation, `true` means it may find something.
    ///
    /// # Errors
    ///
    /// Same as [`Decomposer::decompose`].
    pub fn maybe_decomposable(&self, request: &DecompositionRequest<'_>) -> Result<bool> {
        let Some(prepared) = self.prepare(request)? else {
            return Ok(false);
        };
        let (lo, hi) = prepared.integer_window;
        Ok(prepared.table.reachable(prepared.table.len() - 1, lo, hi))
    }

    /// Decomposes every mass with the settings of `template`, spreading the
    /// work over up to `threads` scoped threads. Results keep the input
    /// order.
    ///
    /// # Errors
    ///
    /// Returns the first error in input order.
    pub fn decompose_batch(
        &self,
        masses: &[f64],
        template: &DecompositionRequest<'_>,
        threads: usize,
    ) -> Result<Vec<Vec<Compomer>>> {
        let threads = threads.clamp(1, masses.len().max(1));
        if threads == 1 {
            return masses
                .iter()
                .map(|&mass| self.decompose(&template.with_mass(mass)))
                .collect();
        }
        let chunk_size = masses.len().div_ceil(threads);
        debug!(masses = masses.len(), threads, "decomposing batch");
        let chunks: Vec<Vec<Result<Vec<Compomer>>>> = thread::scope(|scope| {
            let handles: Vec<_> = masses
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|&mass| self.decompose(&template.with_mass(mass)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });
        chunks.into_iter().flatten().collect()
    }

    /// Number of residue tables in the cache.
    pub fn cached_tables(&self) -> usize {
        self.lock_tables().len()
    }

    /// Drops every cached table. Queries still holding a table keep it.
    pub fn clear_cache(&self) {
        self.lock_tables().clear();
    }

    fn prepare<'q>(&self, request: &'q DecompositionRequest<'_>) -> Result<Option<Prepared<'q>>> {
        let mass = request.mass;
        if !mass.is_finite() || mass < 0.0 {
            return Err(DecompError::InvalidMass { mass });
        }
        let alphabet = request.alphabet;
        if request.bounds.len() != alphabet.len() {
            return Err(DecompError::BoundsMismatch {
                alphabet: alphabet.len(),
                bounds: request.bounds.len(),
            });
        }
        let bounds = match request.parent {
            Some(parent) => Cow::Owned(request.bounds.tightened_by(alphabet, parent)?),
            None => Cow::Borrowed(request.bounds),
        };
        if mass == 0.0 || alphabet.is_empty() {
            return Ok(None);
        }

        let window = request.deviation.window(mass);
        let masses = alphabet.iter().map(|element| element.mass());
        let min_mass: f64 = masses
            .clone()
            .zip(bounds.iter())
            .map(|(m, bound)| m * f64::from(bound.min()))
            .sum();
        if window.hi < min_mass {
            trace!(mass, min_mass, "window below the lower bounds");
            return Ok(None);
        }
        if bounds.iter().all(|bound| bound.is_bounded()) {
            let max_mass: f64 = masses
                .zip(bounds.iter())
                .map(|(m, bound)| m * f64::from(bound.max()))
                .sum();
            if window.lo > max_mass {
                trace!(mass, max_mass, "window above the upper bounds");
                return Ok(None);
            }
        }

        let table = self.table_for(alphabet, &bounds, request.deviation.precision())?;
        let Some(integer_window) = table.weights().integer_window(window.shifted_down(min_mass))
        else {
            return Ok(None);
        };
        Ok(Some(Prepared {
            window,
            bounds,
            table,
            integer_window,
        }))
    }

    fn table_for(
        &self,
        alphabet: &Alphabet,
        bounds: &Bounds,
        precision: u32,
    ) -> Result<Arc<ResidueTable>> {
        let key = TableKey {
            alphabet: alphabet.clone(),
            bounds: bounds.clone(),
            precision,
        };
        let slot = Arc::clone(self.lock_tables().entry(key).or_default());
        if let Some(table) = slot.get() {
            return Ok(Arc::clone(table));
        }
        // Weights are checked outside the once-cell so a bad precision fails
        // the query instead of poisoning the slot.
        let weights = IntegerWeights::new(alphabet, precision)?;
        let table = slot.get_or_init(|| {
            let caps = shifted_caps(&weights, bounds.as_slice());
            debug!(
                alphabet = %alphabet,
                precision,
                modulus = weights.base(),
                "building residue table"
            );
            Arc::new(ResidueTable::build(weights, caps))
        });
        Ok(Arc::clone(table))
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, HashMap<TableKey, TableSlot>> {
        // Slots are only ever inserted, so a poisoned map is still consistent.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
