//! CMA-SA configuration.

use crate::error::{ConfigError, Result};

/// Rule deciding whether a non-improving candidate replaces the reference.
///
/// Strictly improving candidates are always accepted; this rule only
/// covers the remaining ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Acceptance {
    /// Metropolis criterion: accept with probability `exp(-|delta| / T)`.
    #[default]
    Metropolis,

    /// Positive exponent `exp(|delta| / T)`.
    ///
    /// The probability is never below one, so every candidate is accepted
    /// and the search degenerates into a random walk over the sampled
    /// distribution. Kept to reproduce historical runs.
    Legacy,
}

impl Acceptance {
    /// Acceptance probability for a fitness difference `delta`
    /// (candidate minus reference) at `temperature`.
    ///
    /// The result is compared against a uniform draw in `[0, 1)`, so values
    /// above one mean "always".
    pub fn probability(&self, delta: f64, temperature: f64) -> f64 {
        match self {
            Acceptance::Metropolis => {
                if temperature > 0.0 {
                    (-delta.abs() / temperature).exp()
                } else {
                    0.0
                }
            }
            Acceptance::Legacy => (delta.abs() / temperature).exp(),
        }
    }
}

/// Configuration for the CMA-SA optimizer.
///
/// The strategy objects carry their own parameters; this only holds what
/// the loop itself needs.
///
/// # Examples
///
/// ```
/// use cma_sa::cmasa::{Acceptance, CmaSaConfig};
///
/// let config = CmaSaConfig::default()
///     .with_initial_temperature(1e5)
///     .with_acceptance(Acceptance::Metropolis)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmaSaConfig {
    /// Starting temperature. Must be positive and finite.
    pub initial_temperature: f64,

    /// Acceptance rule for non-improving candidates.
    pub acceptance: Acceptance,

    /// Random seed used by [`CmaSa::run`](super::CmaSa::run).
    pub seed: Option<u64>,
}

impl Default for CmaSaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 10e5,
            acceptance: Acceptance::default(),
            seed: None,
        }
    }
}

impl CmaSaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(ConfigError::InvalidTemperature(self.initial_temperature));
        }
        Ok(())
    }
}
