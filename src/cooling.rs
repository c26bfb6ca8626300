//! Cooling schedules.
//!
//! A cooling schedule updates the annealing temperature once per outer
//! iteration and reports whether the run may continue. It is one of the
//! three outer stopping conditions.
//!
//! # References
//!
//! - Geometric: standard textbook approach
//! - Linear: fixed-duration cooling
//! - LundyMees: Lundy & Mees (1986), with convergence proof

use crate::error::{ConfigError, Result};

/// Updates the temperature in place.
pub trait CoolingSchedule {
    /// Lowers `temperature`. Returns `false` once it is at or below the
    /// terminal threshold.
    fn cool(&mut self, temperature: &mut f64) -> bool;
}

fn check_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ConfigError::InvalidThreshold {
            name: "threshold",
            value: threshold,
        });
    }
    Ok(())
}

/// Geometric (exponential) cooling: `T_{k+1} = (1 - alpha) * T_k`.
///
/// # Examples
///
/// ```
/// use cma_sa::cooling::{CoolingSchedule, GeometricCooling};
///
/// let mut cooling = GeometricCooling::new(0.5, 1.0).unwrap();
/// let mut t = 4.0;
/// assert!(cooling.cool(&mut t)); // 2.0
/// assert!(!cooling.cool(&mut t)); // 1.0, at the threshold
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometricCooling {
    alpha: f64,
    threshold: f64,
}

impl GeometricCooling {
    /// Creates a schedule with decrease rate `alpha` in (0, 1).
    pub fn new(alpha: f64, threshold: f64) -> Result<Self> {
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(ConfigError::InvalidCooling {
                name: "alpha",
                value: alpha,
                expected: "must be in (0, 1)",
            });
        }
        check_threshold(threshold)?;
        Ok(Self { alpha, threshold })
    }

    /// Decrease rate.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Terminal temperature.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl CoolingSchedule for GeometricCooling {
    fn cool(&mut self, temperature: &mut f64) -> bool {
        *temperature *= 1.0 - self.alpha;
        *temperature > self.threshold
    }
}

/// Linear cooling: `T_{k+1} = T_k - decrement`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearCooling {
    decrement: f64,
    threshold: f64,
}

impl LinearCooling {
    /// Creates a schedule lowering the temperature by `decrement` each step.
    pub fn new(decrement: f64, threshold: f64) -> Result<Self> {
        if !decrement.is_finite() || decrement <= 0.0 {
            return Err(ConfigError::InvalidCooling {
                name: "decrement",
                value: decrement,
                expected: "must be positive",
            });
        }
        check_threshold(threshold)?;
        Ok(Self {
            decrement,
            threshold,
        })
    }

    /// Schedule reaching `threshold` from `initial` in exactly `steps` calls.
    pub fn with_steps(initial: f64, threshold: f64, steps: usize) -> Result<Self> {
        if steps == 0 {
            return Err(ConfigError::ZeroCount { name: "steps" });
        }
        Self::new((initial - threshold) / steps as f64, threshold)
    }
}

impl CoolingSchedule for LinearCooling {
    fn cool(&mut self, temperature: &mut f64) -> bool {
        *temperature = (*temperature - self.decrement).max(self.threshold);
        *temperature > self.threshold
    }
}

/// Lundy-Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`.
///
/// Cools fast at high T, slow at low T.
///
/// Reference: Lundy & Mees (1986)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LundyMeesCooling {
    beta: f64,
    threshold: f64,
}

impl LundyMeesCooling {
    /// Creates a schedule with cooling parameter `beta > 0`.
    ///
    /// Typically `beta = (T_0 - T_min) / (steps * T_0 * T_min)`.
    pub fn new(beta: f64, threshold: f64) -> Result<Self> {
        if !beta.is_finite() || beta <= 0.0 {
            return Err(ConfigError::InvalidCooling {
                name: "beta",
                value: beta,
                expected: "must be positive",
            });
        }
        check_threshold(threshold)?;
        Ok(Self { beta, threshold })
    }
}

impl CoolingSchedule for LundyMeesCooling {
    fn cool(&mut self, temperature: &mut f64) -> bool {
        *temperature /= 1.0 + self.beta * *temperature;
        *temperature > self.threshold
    }
}
