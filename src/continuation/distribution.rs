//! Convergence predicate over the fitted distribution.

use super::Continue;
use crate::distribution::Distribution;

/// Stops once the distribution has collapsed: every dimension's spread is
/// below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadContinue {
    threshold: f64,
}

impl SpreadContinue {
    /// Creates a spread threshold predicate.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl<D: Distribution> Continue<D> for SpreadContinue {
    fn should_continue(&mut self, distribution: &D) -> bool {
        let spread = distribution.spread();
        let widest = spread.iter().cloned().fold(0.0, f64::max);
        if widest < self.threshold {
            log::info!(
                "stop: distribution spread {widest:.3e} below threshold {:.3e}",
                self.threshold
            );
            return false;
        }
        true
    }
}
