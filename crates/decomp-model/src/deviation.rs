//! Mass tolerances and the integer lattice precision used to search them.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Default relative tolerance in parts per million.
pub const DEFAULT_PPM: f64 = 20.0;

/// Default absolute tolerance in Dalton.
pub const DEFAULT_ABSOLUTE: f64 = 0.001;

/// Default number of decimal digits kept when rounding masses to integers.
pub const DEFAULT_PRECISION: u32 = 4;

/// Largest precision whose residue tables stay tractable in memory.
pub const MAX_PRECISION: u32 = 6;

/// Allowed mass deviation plus the precision of the integer lattice.
///
/// The half window around a mass `m` is `max(absolute, ppm · m · 1e-6)`.
/// Deserialization goes through [`Deviation::with_precision`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDeviation")]
pub struct Deviation {
    ppm: f64,
    absolute: f64,
    precision: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeviation {
    ppm: f64,
    absolute: f64,
    #[serde(default = "default_precision")]
    precision: u32,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl TryFrom<RawDeviation> for Deviation {
    type Error = ModelError;

    fn try_from(raw: RawDeviation) -> Result<Self> {
        Deviation::with_precision(raw.ppm, raw.absolute, raw.precision)
    }
}

impl Deviation {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidDeviation`] for negative or non-finite
    /// tolerances.
    pub fn new(ppm: f64, absolute: f64) -> Result<Self> {
        Self::with_precision(ppm, absolute, DEFAULT_PRECISION)
    }

    /// # Errors
    ///
    /// Additionally rejects a precision of zero or above [`MAX_PRECISION`].
    pub fn with_precision(ppm: f64, absolute: f64, precision: u32) -> Result<Self> {
        if !ppm.is_finite() || ppm < 0.0 {
            return Err(ModelError::deviation(format!(
                "ppm must be a finite, non-negative number (got {ppm})"
            )));
        }
        if !absolute.is_finite() || absolute < 0.0 {
            return Err(ModelError::deviation(format!(
                "absolute deviation must be a finite, non-negative number (got {absolute})"
            )));
        }
        if precision == 0 || precision > MAX_PRECISION {
            return Err(ModelError::deviation(format!(
                "precision must be between 1 and {MAX_PRECISION} (got {precision})"
            )));
        }
        Ok(Self {
            ppm,
            absolute,
            precision,
        })
    }

    /// Relative tolerance only.
    pub fn ppm(ppm: f64) -> Result<Self> {
        Self::new(ppm, 0.0)
    }

    /// Absolute tolerance only.
    pub fn absolute(absolute: f64) -> Result<Self> {
        Self::new(0.0, absolute)
    }

    pub fn ppm_value(&self) -> f64 {
        self.ppm
    }

    pub fn absolute_value(&self) -> f64 {
        self.absolute
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Integer blow-up factor `10^precision`.
    pub fn scale(&self) -> f64 {
        10f64.powi(self.precision as i32)
    }

    pub fn half_window(&self, mass: f64) -> f64 {
        self.absolute.max(self.ppm * mass * 1e-6)
    }

    /// Symmetric window around `mass`.
    pub fn window(&self, mass: f64) -> MassWindow {
        let half = self.half_window(mass);
        MassWindow {
            lo: mass - half,
            hi: mass + half,
        }
    }

    /// Same tolerance with a different lattice precision.
    pub fn at_precision(self, precision: u32) -> Result<Self> {
        Self::with_precision(self.ppm, self.absolute, precision)
    }
}

impl Default for Deviation {
    fn default() -> Self {
        Self {
            ppm: DEFAULT_PPM,
            absolute: DEFAULT_ABSOLUTE,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Closed real-valued mass interval `[lo, hi]` in Dalton.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassWindow {
    pub lo: f64,
    pub hi: f64,
}

impl MassWindow {
    pub fn contains(&self, mass: f64) -> bool {
        mass >= self.lo && mass <= self.hi
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    /// The window moved down by `mass`.
    #[must_use]
    pub fn shifted_down(&self, mass: f64) -> Self {
        Self {
            lo: self.lo - mass,
            hi: self.hi - mass,
        }
    }
}
