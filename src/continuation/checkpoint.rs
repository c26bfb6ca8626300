//! Observation hooks around a monitoring predicate.

use super::Continue;
use crate::population::{Population, PopulationStats};

/// Observes a population snapshot once per outer iteration.
///
/// Used by [`Checkpoint`] on the genitors and by the optimizer's
/// `snapshot` hook on the refined set of the inner loop.
pub trait Monitor {
    /// Called with the 1-based outer iteration, the observed population,
    /// and its fitness statistics (`None` if no member is evaluated, e.g.
    /// an empty refined set).
    fn record(&mut self, iteration: usize, population: &Population, stats: Option<&PopulationStats>);
}

/// Writes one `info` log line per iteration.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    label: String,
}

impl LogMonitor {
    /// Creates a logger prefixing each line with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new("cma-sa")
    }
}

impl Monitor for LogMonitor {
    fn record(&mut self, iteration: usize, population: &Population, stats: Option<&PopulationStats>) {
        match stats {
            Some(s) => log::info!(
                "[{}] iter {iteration}: size={} best={:.6e} mean={:.6e} std={:.3e}",
                self.label,
                s.size,
                s.best,
                s.mean,
                s.std_dev
            ),
            None => log::info!(
                "[{}] iter {iteration}: size={} (unevaluated)",
                self.label,
                population.len()
            ),
        }
    }
}

/// Keeps the statistics of every recorded iteration.
#[derive(Debug, Clone, Default)]
pub struct HistoryMonitor {
    entries: Vec<(usize, PopulationStats)>,
}

impl HistoryMonitor {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(iteration, stats)` pairs in call order.
    pub fn entries(&self) -> &[(usize, PopulationStats)] {
        &self.entries
    }

    /// Best fitness per recorded iteration.
    pub fn best_curve(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, s)| s.best).collect()
    }

    /// Number of recorded iterations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Monitor for HistoryMonitor {
    fn record(&mut self, iteration: usize, _population: &Population, stats: Option<&PopulationStats>) {
        if let Some(s) = stats {
            self.entries.push((iteration, *s));
        }
    }
}

/// Monitoring predicate that reports to a set of monitors before
/// delegating to an inner predicate.
pub struct Checkpoint<'a, C> {
    inner: C,
    monitors: Vec<&'a mut dyn Monitor>,
    iteration: usize,
}

impl<'a, C: Continue<Population>> Checkpoint<'a, C> {
    /// Wraps `inner` with no monitors.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            monitors: Vec::new(),
            iteration: 0,
        }
    }

    /// Adds a monitor.
    pub fn with(mut self, monitor: &'a mut dyn Monitor) -> Self {
        self.monitors.push(monitor);
        self
    }

    /// Adds a monitor.
    pub fn add(&mut self, monitor: &'a mut dyn Monitor) {
        self.monitors.push(monitor);
    }

    /// Iterations observed since the last `init`.
    pub fn iteration(&self) -> usize {
        self.iteration
    }
}

impl<C: Continue<Population>> Continue<Population> for Checkpoint<'_, C> {
    fn init(&mut self) {
        self.iteration = 0;
        self.inner.init();
    }

    fn should_continue(&mut self, population: &Population) -> bool {
        self.iteration += 1;
        let stats = population.stats();
        for monitor in &mut self.monitors {
            monitor.record(self.iteration, population, stats.as_ref());
        }
        self.inner.should_continue(population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuation::{Always, MaxGenerations};
    use crate::population::Solution;

    fn with_best(f: f64) -> Population {
        vec![
            Solution::with_fitness(vec![0.0], f),
            Solution::with_fitness(vec![1.0], f + 2.0),
        ]
        .into()
    }

    #[test]
    fn test_checkpoint_records_then_delegates() {
        let mut history = HistoryMonitor::new();
        {
            let mut c = Checkpoint::new(MaxGenerations::new(2)).with(&mut history);
            assert!(c.should_continue(&with_best(3.0)));
            assert!(!c.should_continue(&with_best(1.0)));
            assert_eq!(c.iteration(), 2);
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].0, 1);
        assert_eq!(history.best_curve(), vec![3.0, 1.0]);
        assert!((history.entries()[1].1.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_history_skips_unevaluated() {
        let mut history = HistoryMonitor::new();
        let mut log = LogMonitor::default();
        {
            let mut c = Checkpoint::new(Always).with(&mut history);
            c.add(&mut log);
            assert!(c.should_continue(&Population::from_genes(vec![vec![0.0]])));
        }
        assert!(history.is_empty());
    }

    #[test]
    fn test_init_resets_iteration() {
        let mut c = Checkpoint::new(MaxGenerations::new(5));
        c.should_continue(&with_best(1.0));
        c.init();
        assert_eq!(c.iteration(), 0);
    }
}
