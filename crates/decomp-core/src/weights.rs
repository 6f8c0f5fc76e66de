//! Real element masses rounded onto a common integer lattice.

use decomp_model::{Alphabet, MassWindow};

use crate::error::{DecompError, Result};

/// Integer weights of an alphabet at one precision, sorted ascending.
///
/// Search position 0 holds the lightest element (the base of the residue
/// table). `order` maps each search position back to its alphabet index.
#[derive(Debug, Clone)]
pub struct IntegerWeights {
    precision: u32,
    scale: f64,
    order: Vec<usize>,
    weights: Vec<i64>,
    residuals: Vec<f64>,
    min_error: f64,
    max_error: f64,
}

impl IntegerWeights {
    /// Rounds every element mass of `alphabet` to `round(mass · 10^precision)`.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::ZeroWeight`] if an element rounds to a weight
    /// below one, i.e. the precision is too coarse for it.
    pub fn new(alphabet: &Alphabet, precision: u32) -> Result<Self> {
        let scale = 10f64.powi(precision as i32);
        let mut entries = Vec::with_capacity(alphabet.len());
        for (index, element) in alphabet.iter().enumerate() {
            let scaled = element.mass() * scale;
            let weight = scaled.round();
            if !weight.is_finite() || weight < 1.0 {
                return Err(DecompError::ZeroWeight {
                    symbol: element.symbol().to_string(),
                    precision,
                });
            }
            entries.push((index, weight as i64, scaled));
        }
        entries.sort_by_key(|&(index, weight, _)| (weight, index));

        let mut min_error = 0.0_f64;
        let mut max_error = 0.0_f64;
        let mut order = Vec::with_capacity(entries.len());
        let mut weights = Vec::with_capacity(entries.len());
        let mut residuals = Vec::with_capacity(entries.len());
        for (index, weight, scaled) in entries {
            let residual = scaled - weight as f64;
            let relative = -residual / scaled;
            min_error = min_error.min(relative);
            max_error = max_error.max(relative);
            order.push(index);
            weights.push(weight);
            residuals.push(residual);
        }
        Ok(Self {
            precision,
            scale,
            order,
            weights,
            residuals,
            min_error,
            max_error,
        })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Weight of the lightest element, the modulus of the residue table.
    pub fn base(&self) -> i64 {
        self.weights[0]
    }

    pub fn weights(&self) -> &[i64] {
        &self.weights
    }

    pub fn weight(&self, position: usize) -> i64 {
        self.weights[position]
    }

    /// Alphabet index of each search position.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// `mass · scale − weight` per search position.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Smallest relative rounding error `(weight − mass·scale) / (mass·scale)`,
    /// never above zero.
    pub fn min_error(&self) -> f64 {
        self.min_error
    }

    /// Largest relative rounding error, never below zero.
    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    /// Integer interval containing the integer mass of every composition
    /// whose real mass lies in `window`.
    ///
    /// Returns `None` when the window lies entirely below zero.
    pub fn integer_window(&self, window: MassWindow) -> Option<(i64, i64)> {
        if window.hi < 0.0 {
            return None;
        }
        // One unit of slack each side absorbs floating-point error; every
        // candidate is re-checked against the real window anyway.
        let lo = (window.lo.max(0.0) * self.scale * (1.0 + self.min_error)).floor() as i64;
        let hi = (window.hi * self.scale * (1.0 + self.max_error)).ceil() as i64;
        Some((lo.max(0), hi))
    }
}
