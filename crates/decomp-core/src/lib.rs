//! Mass decomposition engine.
//!
//! Given a mass and a tolerance, [`Decomposer`] enumerates every element
//! composition over a bounded alphabet whose exact mass falls inside the
//! tolerance window. Masses are rounded onto an integer lattice
//! ([`IntegerWeights`]), a residue table prunes infeasible branches
//! ([`ResidueTable`]), and every candidate is re-checked against the real
//! window before validation.

pub mod config;
pub mod decomposer;
pub mod error;
pub mod residue;
pub mod search;
pub mod weights;

pub use config::{DEFAULT_ALPHABET, DecompConfig};
pub use decomposer::{DecompositionRequest, Decomposer};
pub use error::{DecompError, Result};
pub use residue::ResidueTable;
pub use search::SearchStats;
pub use weights::IntegerWeights;
