//! Monitoring predicates over the genitor population.

use super::Continue;
use crate::eval::EvalCounter;
use crate::population::Population;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stops after a fixed number of generations.
#[derive(Debug, Clone)]
pub struct MaxGenerations {
    max: usize,
    current: usize,
}

impl MaxGenerations {
    /// Allows `max` calls; the `max`-th call returns `false`.
    pub fn new(max: usize) -> Self {
        Self { max, current: 0 }
    }

    /// Generations counted since the last `init`.
    pub fn current(&self) -> usize {
        self.current
    }
}

impl Continue<Population> for MaxGenerations {
    fn init(&mut self) {
        self.current = 0;
    }

    fn should_continue(&mut self, _population: &Population) -> bool {
        self.current += 1;
        if self.current >= self.max {
            log::info!(
                "stop: reached maximum number of generations [{}/{}]",
                self.current,
                self.max
            );
            return false;
        }
        true
    }
}

/// Stops once the shared evaluation counter reaches a budget.
#[derive(Debug, Clone)]
pub struct MaxEvaluations {
    counter: EvalCounter,
    max: usize,
}

impl MaxEvaluations {
    /// Stops once `counter` reaches `max`.
    pub fn new(counter: EvalCounter, max: usize) -> Self {
        Self { counter, max }
    }
}

impl Continue<Population> for MaxEvaluations {
    fn should_continue(&mut self, _population: &Population) -> bool {
        let used = self.counter.get();
        if used >= self.max {
            log::info!("stop: reached maximum number of evaluations [{used}/{}]", self.max);
            return false;
        }
        true
    }
}

/// Stops when the best fitness has not improved for `steady_generations`
/// generations, once at least `min_generations` have passed.
#[derive(Debug, Clone)]
pub struct SteadyFitness {
    min_generations: usize,
    steady_generations: usize,
    current: usize,
    last_improvement: usize,
    best: f64,
}

impl SteadyFitness {
    /// Creates a stagnation predicate.
    pub fn new(min_generations: usize, steady_generations: usize) -> Self {
        Self {
            min_generations,
            steady_generations,
            current: 0,
            last_improvement: 0,
            best: f64::INFINITY,
        }
    }
}

impl Continue<Population> for SteadyFitness {
    fn init(&mut self) {
        self.current = 0;
        self.last_improvement = 0;
        self.best = f64::INFINITY;
    }

    fn should_continue(&mut self, population: &Population) -> bool {
        self.current += 1;
        let best = population
            .best()
            .map_or(f64::INFINITY, |s| s.fitness_or_worst());
        if best < self.best {
            self.best = best;
            self.last_improvement = self.current;
        }

        if self.current < self.min_generations {
            return true;
        }
        let steady = self.current - self.last_improvement;
        if steady >= self.steady_generations {
            log::info!(
                "stop: no improvement for {steady} generations (best {:.6e})",
                self.best
            );
            return false;
        }
        true
    }
}

/// Stops after a wall-clock duration, measured from the last `init`.
#[derive(Debug, Clone)]
pub struct TimeLimit {
    limit: Duration,
    start: Instant,
}

impl TimeLimit {
    /// Creates a time limit starting now.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            start: Instant::now(),
        }
    }
}

impl Continue<Population> for TimeLimit {
    fn init(&mut self) {
        self.start = Instant::now();
    }

    fn should_continue(&mut self, _population: &Population) -> bool {
        let elapsed = self.start.elapsed();
        if elapsed >= self.limit {
            log::info!(
                "stop: reached maximum time [{:.3}s/{:.3}s]",
                elapsed.as_secs_f64(),
                self.limit.as_secs_f64()
            );
            return false;
        }
        true
    }
}

/// Stops when an external flag is raised.
#[derive(Debug, Clone)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Watches `flag`; the run stops at the end of the outer iteration in
    /// which it becomes `true`.
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl Continue<Population> for CancelFlag {
    fn should_continue(&mut self, _population: &Population) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            log::info!("stop: cancelled");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{CountingEvaluator, Evaluator, Sphere};
    use crate::population::Solution;

    fn with_best(f: f64) -> Population {
        vec![Solution::with_fitness(vec![0.0], f)].into()
    }

    #[test]
    fn test_max_generations() {
        let pop = Population::new();
        let mut c = MaxGenerations::new(3);
        assert!(c.should_continue(&pop));
        assert!(c.should_continue(&pop));
        assert!(!c.should_continue(&pop));
        assert_eq!(c.current(), 3);
        c.init();
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn test_max_evaluations_reads_shared_counter() {
        let eval = CountingEvaluator::new(Sphere);
        let mut c = MaxEvaluations::new(eval.counter(), 2);
        let pop = Population::new();

        assert!(c.should_continue(&pop));
        eval.evaluate(&mut Solution::new(vec![1.0]));
        assert!(c.should_continue(&pop));
        eval.evaluate(&mut Solution::new(vec![2.0]));
        assert!(!c.should_continue(&pop));
    }

    #[test]
    fn test_steady_fitness() {
        let mut c = SteadyFitness::new(2, 2);
        assert!(c.should_continue(&with_best(5.0))); // gen 1, improvement
        assert!(c.should_continue(&with_best(4.0))); // gen 2, improvement
        assert!(c.should_continue(&with_best(4.0))); // gen 3, steady 1
        assert!(!c.should_continue(&with_best(4.5))); // gen 4, steady 2

        c.init();
        assert!(c.should_continue(&with_best(9.0)));
    }

    #[test]
    fn test_steady_fitness_respects_minimum() {
        let mut c = SteadyFitness::new(5, 1);
        for _ in 0..4 {
            assert!(c.should_continue(&with_best(1.0)));
        }
        assert!(!c.should_continue(&with_best(1.0)));
    }

    #[test]
    fn test_time_limit() {
        let pop = Population::new();
        let mut c = TimeLimit::new(Duration::ZERO);
        assert!(!c.should_continue(&pop));
        let mut c = TimeLimit::new(Duration::from_secs(3600));
        assert!(c.should_continue(&pop));
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut c = CancelFlag::new(flag.clone());
        let pop = Population::new();
        assert!(c.should_continue(&pop));
        flag.store(true, Ordering::Relaxed);
        assert!(!c.should_continue(&pop));
    }
}
