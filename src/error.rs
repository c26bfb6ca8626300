//! Configuration errors.
//!
//! Misconfigured parameters are reported through [`ConfigError`]. Contract
//! violations inside the optimizer loop (empty populations, mismatched
//! dimensions) are programming errors and panic instead.

use thiserror::Error;

/// Errors raised while validating configuration or constructing strategies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The initial temperature is not a positive finite number.
    #[error("initial_temperature must be positive and finite, got {0}")]
    InvalidTemperature(f64),

    /// A cooling schedule parameter is outside its valid range.
    #[error("invalid cooling parameter {name}: {value} ({expected})")]
    InvalidCooling {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Human readable description of the valid range.
        expected: &'static str,
    },

    /// A selection or replacement rate is outside its valid range.
    #[error("invalid rate {name}: {value} ({expected})")]
    InvalidRate {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Human readable description of the valid range.
        expected: &'static str,
    },

    /// A count parameter must be at least one.
    #[error("{name} must be at least 1")]
    ZeroCount {
        /// Parameter name.
        name: &'static str,
    },

    /// Lower and upper bounds have different lengths.
    #[error("bounds mismatch: lower has {lower_len} elements, upper has {upper_len}")]
    BoundsMismatch {
        /// Length of the lower bound vector.
        lower_len: usize,
        /// Length of the upper bound vector.
        upper_len: usize,
    },

    /// A lower bound exceeds its upper bound, or a bound is not finite.
    #[error("invalid bounds at index {index}: lower ({lower}) > upper ({upper})")]
    InvalidBounds {
        /// Dimension index.
        index: usize,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// A threshold must be non-negative and finite.
    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidThreshold {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Returns `true` for bound-related errors.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            ConfigError::BoundsMismatch { .. } | ConfigError::InvalidBounds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConfigError::InvalidTemperature(-1.0);
        assert_eq!(
            err.to_string(),
            "initial_temperature must be positive and finite, got -1"
        );

        let err = ConfigError::BoundsMismatch {
            lower_len: 2,
            upper_len: 3,
        };
        assert!(err.to_string().contains("lower has 2"));
        assert!(err.is_bounds_error());
        assert!(!ConfigError::ZeroCount { name: "size" }.is_bounds_error());
    }
}
