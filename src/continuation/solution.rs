//! Inner-loop predicates over the reference solution.

use super::Continue;
use crate::population::{Population, Solution};

/// Allows a fixed number of inner iterations.
///
/// The inner loop samples before consulting its predicate, so with
/// `MaxSamples::new(n)` and `n >= 1` it performs exactly `n` samples per
/// outer iteration. A budget of zero still allows one sample.
#[derive(Debug, Clone)]
pub struct MaxSamples {
    max: usize,
    current: usize,
}

impl MaxSamples {
    /// Creates a sample budget.
    pub fn new(max: usize) -> Self {
        Self { max, current: 0 }
    }
}

impl Continue<Solution> for MaxSamples {
    fn init(&mut self) {
        self.current = 0;
    }

    fn should_continue(&mut self, _solution: &Solution) -> bool {
        self.current += 1;
        self.current < self.max
    }
}

/// Stops once a fitness target is reached.
///
/// Usable both as an inner predicate (on the reference solution) and as a
/// monitoring predicate (on the best member of the population).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFitness {
    target: f64,
}

impl TargetFitness {
    /// Stops once fitness `<= target`.
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl Continue<Solution> for TargetFitness {
    fn should_continue(&mut self, solution: &Solution) -> bool {
        solution.fitness_or_worst() > self.target
    }
}

impl Continue<Population> for TargetFitness {
    fn should_continue(&mut self, population: &Population) -> bool {
        match population.best().and_then(Solution::fitness) {
            Some(best) if best <= self.target => {
                log::info!("stop: target fitness {:.6e} reached ({best:.6e})", self.target);
                false
            }
            _ => true,
        }
    }
}
