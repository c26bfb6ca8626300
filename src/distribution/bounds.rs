//! Search-domain bounds and out-of-range correction.

use crate::error::{ConfigError, Result};
use rand::{Rng, RngCore};

/// Per-dimension closed interval `[lower[i], upper[i]]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from explicit lower and upper vectors.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(ConfigError::BoundsMismatch {
                lower_len: lower.len(),
                upper_len: upper.len(),
            });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(ConfigError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Creates the hypercube `[lower, upper]^dimension`.
    pub fn hypercube(dimension: usize, lower: f64, upper: f64) -> Result<Self> {
        Self::new(vec![lower; dimension], vec![upper; dimension])
    }

    /// Number of dimensions.
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Lower bounds.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Whether every gene lies inside the bounds.
    pub fn contains(&self, genes: &[f64]) -> bool {
        genes.len() == self.dimension()
            && genes
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&g, (&lo, &hi))| lo <= g && g <= hi)
    }
}

/// Policy applied to sampled genes that fall outside the search domain.
///
/// Out-of-range draws are corrected rather than rejected, so sampling
/// always terminates.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bounder {
    /// No correction.
    #[default]
    Unbounded,
    /// Fold out-of-range values back into the interval, as a mirror would.
    Reflect(Bounds),
    /// Clamp out-of-range values to the nearest bound.
    Clamp(Bounds),
    /// Replace out-of-range values with a uniform draw inside the interval.
    Redraw(Bounds),
}

impl Bounder {
    /// The bounds this policy enforces, if any.
    pub fn bounds(&self) -> Option<&Bounds> {
        match self {
            Bounder::Unbounded => None,
            Bounder::Reflect(b) | Bounder::Clamp(b) | Bounder::Redraw(b) => Some(b),
        }
    }

    /// Corrects `genes` in place.
    ///
    /// # Panics
    /// Panics if `genes` and the bounds differ in dimension.
    pub fn apply(&self, genes: &mut [f64], rng: &mut dyn RngCore) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        assert_eq!(
            genes.len(),
            bounds.dimension(),
            "solution dimension does not match bounds"
        );

        for (g, (&lo, &hi)) in genes.iter_mut().zip(bounds.lower.iter().zip(&bounds.upper)) {
            if lo <= *g && *g <= hi {
                continue;
            }
            *g = match self {
                Bounder::Reflect(_) => reflect(*g, lo, hi),
                Bounder::Clamp(_) => clamp(*g, lo, hi),
                Bounder::Redraw(_) => {
                    if hi > lo {
                        rng.random_range(lo..=hi)
                    } else {
                        lo
                    }
                }
                Bounder::Unbounded => unreachable!("unbounded policy returns early"),
            };
        }
    }
}

/// Folds `x` into `[lo, hi]` by repeated mirroring at the bounds.
fn reflect(x: f64, lo: f64, hi: f64) -> f64 {
    let width = hi - lo;
    if width <= 0.0 {
        return lo;
    }
    if !x.is_finite() {
        return clamp(x, lo, hi);
    }

    let period = 2.0 * width;
    let mut t = (x - lo).rem_euclid(period);
    if t > width {
        t = period - t;
    }
    (lo + t).clamp(lo, hi)
}

/// Clamps `x` into `[lo, hi]`; NaN maps to the midpoint.
fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        lo + (hi - lo) / 2.0
    } else {
        x.clamp(lo, hi)
    }
}
