//! Fitness evaluation.
//!
//! The optimizer treats the objective as a black box: an [`Evaluator`]
//! maps a gene vector to a fitness (lower is better) and
//! [`Evaluator::evaluate`] caches that value on the solution.
//!
//! Any `Fn(&[f64]) -> f64` closure is an evaluator:
//!
//! ```
//! use cma_sa::eval::Evaluator;
//! use cma_sa::population::Solution;
//!
//! let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
//! let mut s = Solution::new(vec![1.0, 2.0]);
//! sphere.evaluate(&mut s);
//! assert_eq!(s.fitness(), Some(5.0));
//! ```

use crate::population::Solution;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Computes the fitness of candidate solutions.
pub trait Evaluator {
    /// Computes the fitness of a gene vector. Lower is better.
    fn fitness(&self, genes: &[f64]) -> f64;

    /// Computes and caches the fitness of `solution` unless it is already
    /// evaluated.
    fn evaluate(&self, solution: &mut Solution) {
        if !solution.is_evaluated() {
            let f = self.fitness(solution.genes());
            solution.set_fitness(f);
        }
    }
}

impl<F> Evaluator for F
where
    F: Fn(&[f64]) -> f64,
{
    fn fitness(&self, genes: &[f64]) -> f64 {
        self(genes)
    }
}

/// Shared handle to an evaluation count.
///
/// Cloning the handle shares the underlying counter, so a
/// [`CountingEvaluator`] and a
/// [`MaxEvaluations`](crate::continuation::MaxEvaluations) predicate can
/// observe the same number.
#[derive(Debug, Clone, Default)]
pub struct EvalCounter(Arc<AtomicUsize>);

impl EvalCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Resets the count to zero.
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Wraps an evaluator and counts the fitness computations it performs.
///
/// Cached fitness values are not recomputed and therefore not counted.
#[derive(Debug, Clone)]
pub struct CountingEvaluator<E> {
    inner: E,
    counter: EvalCounter,
}

impl<E: Evaluator> CountingEvaluator<E> {
    /// Wraps `inner` with a fresh counter.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            counter: EvalCounter::new(),
        }
    }

    /// A handle to the shared evaluation counter.
    pub fn counter(&self) -> EvalCounter {
        self.counter.clone()
    }

    /// Number of fitness computations so far.
    pub fn count(&self) -> usize {
        self.counter.get()
    }
}

impl<E: Evaluator> Evaluator for CountingEvaluator<E> {
    fn fitness(&self, genes: &[f64]) -> f64 {
        self.counter.increment();
        self.inner.fitness(genes)
    }
}

/// Sphere function: `f(x) = sum(x_i^2)`, minimum 0 at the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sphere;

impl Evaluator for Sphere {
    fn fitness(&self, genes: &[f64]) -> f64 {
        genes.iter().map(|x| x * x).sum()
    }
}

/// Rosenbrock function:
/// `f(x) = sum(100 (x_{i+1} - x_i^2)^2 + (1 - x_i)^2)`, minimum 0 at `(1, ..., 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rosenbrock;

impl Evaluator for Rosenbrock {
    fn fitness(&self, genes: &[f64]) -> f64 {
        genes
            .windows(2)
            .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere() {
        assert_eq!(Sphere.fitness(&[0.0, 0.0]), 0.0);
        assert_eq!(Sphere.fitness(&[1.0, -2.0, 3.0]), 14.0);
    }

    #[test]
    fn test_rosenbrock_minimum() {
        assert_eq!(Rosenbrock.fitness(&[1.0, 1.0, 1.0]), 0.0);
        assert!((Rosenbrock.fitness(&[0.0, 0.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_counting_skips_cached() {
        let eval = CountingEvaluator::new(Sphere);
        let counter = eval.counter();

        let mut a = Solution::new(vec![1.0, 1.0]);
        eval.evaluate(&mut a);
        eval.evaluate(&mut a);
        assert_eq!(counter.get(), 1);

        a.genes_mut()[0] = 2.0;
        eval.evaluate(&mut a);
        assert_eq!(eval.count(), 2);
        assert_eq!(a.fitness(), Some(5.0));

        counter.reset();
        assert_eq!(eval.count(), 0);
    }
}
