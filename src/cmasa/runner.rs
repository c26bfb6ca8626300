//! CMA-SA execution loop.

use super::config::CmaSaConfig;
use crate::continuation::{Continue, Monitor};
use crate::cooling::CoolingSchedule;
use crate::distribution::{Distribution, Estimator, Modifier, Sampler};
use crate::error::Result;
use crate::eval::Evaluator;
use crate::population::{Population, Solution};
use crate::random::rng_from_seed;
use crate::replacement::Replacement;
use crate::selection::{Select, SelectOne};
use rand::{Rng, RngCore};

/// Which outer stopping condition ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The cooling schedule reached its terminal temperature.
    Cooling,
    /// The distribution predicate reported convergence.
    Distribution,
    /// The monitoring predicate on the genitors stopped the run.
    Monitoring,
}

/// Result of a CMA-SA run.
#[derive(Debug, Clone)]
pub struct CmaSaResult {
    /// Best solution evaluated during the run, initial members included.
    pub best: Solution,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Number of outer iterations.
    pub iterations: usize,

    /// Total number of sampled candidates.
    pub samples: usize,

    /// Number of accepted candidates (including improvements).
    pub accepted: usize,

    /// Number of candidates strictly better than the reference.
    pub improving: usize,

    /// Temperature after the last cooling step.
    pub final_temperature: f64,

    /// Condition that ended the run.
    pub stop_reason: StopReason,

    /// Best fitness so far: the initial value, then one entry per outer
    /// iteration.
    pub fitness_history: Vec<f64>,
}

/// The CMA-SA optimizer.
///
/// Borrows one object per strategy role. `D` is the distribution family
/// shared by the estimator, modifier, sampler and distribution predicate.
///
/// Each outer iteration selects genitors from the working population, fits
/// a fresh distribution to them, biases it toward a reference genitor, and
/// runs an inner loop that samples candidates and accepts them against the
/// reference under the current temperature. Accepted candidates form the
/// refined set, which the replacement merges into the next working
/// population. The run ends as soon as cooling, the distribution predicate
/// or the monitoring predicate says stop, checked in that order.
pub struct CmaSa<'a, D: Distribution> {
    /// Extracts the genitors from the working population.
    pub selector: &'a dyn Select,
    /// Fits a distribution to the genitors.
    pub estimator: &'a dyn Estimator<D>,
    /// Picks the reference solution among the genitors.
    pub select_one: &'a dyn SelectOne,
    /// Biases the distribution toward the reference.
    pub modifier: &'a dyn Modifier<D>,
    /// Draws candidates.
    pub sampler: &'a dyn Sampler<D>,
    /// Outer predicate over the genitors.
    pub monitoring_continue: &'a mut dyn Continue<Population>,
    /// Outer predicate over the fitted distribution.
    pub distribution_continue: &'a mut dyn Continue<D>,
    /// Objective function.
    pub evaluator: &'a dyn Evaluator,
    /// Inner predicate over the reference solution.
    pub sa_continue: &'a mut dyn Continue<Solution>,
    /// Temperature update, also an outer predicate.
    pub cooling: &'a mut dyn CoolingSchedule,
    /// Merges the working population with the refined set.
    pub replacement: &'a dyn Replacement,
    /// Receives the refined set after every inner loop.
    pub snapshot: Option<&'a mut dyn Monitor>,
    /// Loop parameters.
    pub config: CmaSaConfig,
}

impl<D: Distribution> CmaSa<'_, D> {
    /// Runs the optimizer with a generator seeded from `config.seed`.
    ///
    /// On success `population` holds the final working population.
    ///
    /// # Panics
    ///
    /// Panics if `population` is empty or its members differ in dimension.
    pub fn run(&mut self, population: &mut Population) -> Result<CmaSaResult> {
        let mut rng = rng_from_seed(self.config.seed);
        self.run_with_rng(population, &mut rng)
    }

    /// Runs the optimizer with an injected random source.
    pub fn run_with_rng(
        &mut self,
        population: &mut Population,
        rng: &mut dyn RngCore,
    ) -> Result<CmaSaResult> {
        self.config.validate()?;
        assert!(!population.is_empty(), "cannot optimize an empty population");
        assert!(
            population.is_uniform(),
            "population members must share one dimension"
        );

        population.evaluate_all(self.evaluator);
        let mut working = population.clone();
        let mut refined = Population::with_capacity(working.len());
        let mut temperature = self.config.initial_temperature;

        let initial = self.estimator.estimate(&working);
        assert!(initial.size() > 0, "estimated distribution has size 0");

        log::info!(
            "cma-sa: starting with {} solutions of dimension {}, T0={:.3e}, acceptance={:?}",
            working.len(),
            initial.size(),
            temperature,
            self.config.acceptance
        );

        let mut best = working
            .best()
            .cloned()
            .expect("non-empty population has a best member");
        let mut best_fitness = best.fitness_or_worst();
        let mut fitness_history = vec![best_fitness];

        self.monitoring_continue.init();
        self.distribution_continue.init();

        let mut iterations = 0usize;
        let mut samples = 0usize;
        let mut accepted = 0usize;
        let mut improving = 0usize;

        let stop_reason = loop {
            iterations += 1;

            // the first iteration works on the caller's population as is
            if iterations > 1 {
                self.replacement.replace(&working, &mut refined, rng);
                working = std::mem::take(&mut refined);
            }
            refined.clear();

            let genitors = self.selector.select(&working, rng);
            assert!(!genitors.is_empty(), "selector returned no genitors");

            self.sa_continue.init();

            let mut distribution = self.estimator.estimate(&genitors);
            assert!(distribution.size() > 0, "estimated distribution has size 0");

            let mut reference = self.select_one.select_one(&genitors, rng).clone();
            self.modifier.modify(&mut distribution, &reference);

            let accepted_before = accepted;
            loop {
                let mut candidate = self.sampler.sample(&distribution, rng);
                self.evaluator.evaluate(&mut candidate);
                self.evaluator.evaluate(&mut reference);
                samples += 1;

                let candidate_fitness = candidate.fitness_or_worst();
                let delta = candidate_fitness - reference.fitness_or_worst();
                let improves = delta < 0.0;
                if improves
                    || rng.random::<f64>()
                        < self.config.acceptance.probability(delta, temperature)
                {
                    accepted += 1;
                    if improves {
                        improving += 1;
                    }
                    if candidate_fitness < best_fitness {
                        best_fitness = candidate_fitness;
                        best = candidate.clone();
                    }
                    reference = candidate.clone();
                    refined.push(candidate);
                }

                if !self.sa_continue.should_continue(&reference) {
                    break;
                }
            }

            if let Some(monitor) = self.snapshot.as_deref_mut() {
                let stats = refined.stats();
                monitor.record(iterations, &refined, stats.as_ref());
            }

            fitness_history.push(best_fitness);
            log::debug!(
                "iter {iterations}: T={temperature:.3e} genitors={} accepted={} best={best_fitness:.6e}",
                genitors.len(),
                accepted - accepted_before
            );

            if !self.cooling.cool(&mut temperature) {
                log::info!("stop: temperature {temperature:.3e} reached the cooling threshold");
                break StopReason::Cooling;
            }
            if !self.distribution_continue.should_continue(&distribution) {
                break StopReason::Distribution;
            }
            if !self.monitoring_continue.should_continue(&genitors) {
                break StopReason::Monitoring;
            }
        };

        self.replacement.replace(&working, &mut refined, rng);
        *population = refined;

        log::info!(
            "cma-sa: finished after {iterations} iterations ({samples} samples, {accepted} accepted), best={best_fitness:.6e}, reason={stop_reason:?}"
        );

        Ok(CmaSaResult {
            best,
            best_fitness,
            iterations,
            samples,
            accepted,
            improving,
            final_temperature: temperature,
            stop_reason,
            fitness_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmasa::Acceptance;
    use crate::continuation::{
        Always, CancelFlag, Checkpoint, HistoryMonitor, MaxGenerations, MaxSamples,
        SpreadContinue,
    };
    use crate::cooling::GeometricCooling;
    use crate::distribution::{
        Bounder, Bounds, Normal, NormalCenter, NormalEstimator, NormalSampler, Uniform,
        UniformCenter, UniformEstimator, UniformSampler,
    };
    use crate::error::ConfigError;
    use crate::eval::{CountingEvaluator, Sphere};
    use crate::population::PopulationStats;
    use crate::random::create_rng;
    use crate::replacement::PlusReplacement;
    use crate::selection::{DetSelect, Selection};
    use rand::Rng;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn initial_population(size: usize, dimension: usize, seed: u64) -> Population {
        let mut rng = create_rng(seed);
        Population::from_genes(
            (0..size).map(|_| (0..dimension).map(|_| rng.random_range(-5.0..5.0)).collect()),
        )
    }

    fn reflect() -> Bounder {
        Bounder::Reflect(Bounds::hypercube(2, -5.0, 5.0).unwrap())
    }

    /// Owned strategies for a uniform-family run on the sphere.
    struct UniformSetup {
        selector: DetSelect,
        estimator: UniformEstimator,
        select_one: Selection,
        modifier: UniformCenter,
        sampler: UniformSampler,
        evaluator: Sphere,
        cooling: GeometricCooling,
        replacement: PlusReplacement,
    }

    impl UniformSetup {
        fn new() -> Self {
            Self {
                selector: DetSelect::rate(0.6).unwrap(),
                estimator: UniformEstimator,
                select_one: Selection::DetTournament(2),
                modifier: UniformCenter,
                sampler: UniformSampler::new(reflect()),
                evaluator: Sphere,
                cooling: GeometricCooling::new(0.1, 0.1).unwrap(),
                replacement: PlusReplacement::keep_size(),
            }
        }

        fn optimizer<'a>(
            &'a mut self,
            sa_continue: &'a mut dyn Continue<Solution>,
            monitoring_continue: &'a mut dyn Continue<Population>,
            distribution_continue: &'a mut dyn Continue<Uniform>,
        ) -> CmaSa<'a, Uniform> {
            CmaSa {
                selector: &self.selector,
                estimator: &self.estimator,
                select_one: &self.select_one,
                modifier: &self.modifier,
                sampler: &self.sampler,
                monitoring_continue,
                distribution_continue,
                evaluator: &self.evaluator,
                sa_continue,
                cooling: &mut self.cooling,
                replacement: &self.replacement,
                snapshot: None,
                config: CmaSaConfig::default()
                    .with_initial_temperature(1e5)
                    .with_seed(42),
            }
        }
    }

    /// Records the fitness trajectory of every refined set.
    #[derive(Default)]
    struct Trajectories {
        runs: Vec<Vec<f64>>,
    }

    impl Monitor for Trajectories {
        fn record(
            &mut self,
            _iteration: usize,
            population: &Population,
            _stats: Option<&PopulationStats>,
        ) {
            self.runs
                .push(population.iter().map(Solution::fitness_or_worst).collect());
        }
    }

    #[test]
    fn test_sphere_terminates_by_cooling() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut population = initial_population(5, 2, 1);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(3);
        let mut monitoring = Always;
        let mut spread = Always;
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);

        let mut evaluated = population.clone();
        evaluated.evaluate_all(&Sphere);
        let initial_best = evaluated.best().unwrap().fitness().unwrap();

        let result = optimizer.run(&mut population).unwrap();

        // first k with 1e5 * 0.9^k <= 0.1
        assert_eq!(result.iterations, 132);
        assert_eq!(result.stop_reason, StopReason::Cooling);
        assert!(result.final_temperature <= 0.1);
        assert_eq!(result.fitness_history.len(), 133);

        assert_eq!(population.len(), 5);
        let final_best = population.best().unwrap().fitness().unwrap();
        assert!(final_best <= initial_best);
        assert!(result.best_fitness <= final_best);
        assert!(population.iter().all(|s| s.genes().iter().all(|g| (-5.0..=5.0).contains(g))));
    }

    #[test]
    fn test_inner_loop_samples_exactly_budget() {
        let mut population = initial_population(5, 2, 2);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(3);
        let mut monitoring = Always;
        let mut spread = Always;
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);

        let result = optimizer.run(&mut population).unwrap();
        assert_eq!(result.samples, result.iterations * 3);
        assert!(result.accepted <= result.samples);
        assert!(result.improving <= result.accepted);
    }

    #[test]
    fn test_zero_sample_budget_still_samples_once() {
        let mut population = initial_population(4, 2, 3);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(0);
        let mut monitoring = MaxGenerations::new(10);
        let mut spread = Always;
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);

        let result = optimizer.run(&mut population).unwrap();
        assert_eq!(result.iterations, 10);
        assert_eq!(result.samples, 10);
        assert_eq!(result.stop_reason, StopReason::Monitoring);
    }

    #[test]
    fn test_legacy_acceptance_accepts_everything() {
        let mut population = initial_population(5, 2, 4);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(3);
        let mut monitoring = Always;
        let mut spread = Always;
        let mut trajectories = Trajectories::default();
        {
            let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);
            optimizer.config = optimizer.config.clone().with_acceptance(Acceptance::Legacy);
            optimizer.snapshot = Some(&mut trajectories);

            let result = optimizer.run(&mut population).unwrap();
            assert_eq!(result.accepted, result.samples);
            assert!(result.improving < result.accepted);
        }

        assert_eq!(trajectories.runs.len(), 132);
        assert!(trajectories.runs.iter().all(|r| r.len() == 3));
        // every candidate replaces the reference, so fitness goes up as well
        let worsened = trajectories
            .runs
            .iter()
            .any(|r| r.windows(2).any(|w| w[1] > w[0]));
        assert!(worsened);
    }

    #[test]
    fn test_metropolis_improves_reference_at_low_temperature() {
        let mut population = initial_population(5, 2, 5);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(3);
        let mut monitoring = Always;
        let mut spread = Always;
        let mut trajectories = Trajectories::default();
        {
            let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);
            optimizer.config = optimizer.config.clone().with_initial_temperature(1e-300);
            optimizer.snapshot = Some(&mut trajectories);
            let result = optimizer.run(&mut population).unwrap();
            assert_eq!(result.iterations, 1);
        }
        // at T ~ 0 only non-worsening candidates are accepted
        for run in &trajectories.runs {
            assert!(run.windows(2).all(|w| w[1] <= w[0]));
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let run = || {
            let mut population = initial_population(6, 2, 7);
            let mut setup = UniformSetup::new();
            let mut inner = MaxSamples::new(2);
            let mut monitoring = MaxGenerations::new(20);
            let mut spread = Always;
            let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);
            let result = optimizer.run(&mut population).unwrap();
            (result.best_fitness, result.accepted, population)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_nan_objective_does_not_duplicate_members() {
        let mut population = initial_population(5, 2, 14);
        let mut initial: Vec<Vec<f64>> = population.iter().map(|s| s.genes().to_vec()).collect();
        let nan = |_: &[f64]| f64::NAN;

        let selector = DetSelect::rate(0.6).unwrap();
        let select_one = Selection::Best;
        let sampler = UniformSampler::new(reflect());
        let replacement = PlusReplacement::keep_size();
        let mut cooling = GeometricCooling::new(0.1, 0.1).unwrap();
        let mut inner = MaxSamples::new(3);
        let mut monitoring = MaxGenerations::new(1);
        let mut spread = Always;

        let result = {
            let mut optimizer: CmaSa<'_, Uniform> = CmaSa {
                selector: &selector,
                estimator: &UniformEstimator,
                select_one: &select_one,
                modifier: &UniformCenter,
                sampler: &sampler,
                monitoring_continue: &mut monitoring,
                distribution_continue: &mut spread,
                evaluator: &nan,
                sa_continue: &mut inner,
                cooling: &mut cooling,
                replacement: &replacement,
                snapshot: None,
                config: CmaSaConfig::default().with_seed(5),
            };
            optimizer.run(&mut population).unwrap()
        };

        assert_eq!(result.iterations, 1);
        assert_eq!(result.accepted, 0);
        let mut after: Vec<Vec<f64>> = population.iter().map(|s| s.genes().to_vec()).collect();
        let by_genes = |a: &Vec<f64>, b: &Vec<f64>| a.partial_cmp(b).unwrap();
        initial.sort_by(by_genes);
        after.sort_by(by_genes);
        assert_eq!(after, initial);
    }

    #[test]
    fn test_population_of_one() {
        let mut population = initial_population(1, 2, 8);
        let mut setup = UniformSetup::new();
        setup.selector = DetSelect::rate(0.1).unwrap();
        let mut inner = MaxSamples::new(2);
        let mut monitoring = MaxGenerations::new(5);
        let mut spread = Always;
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);

        let result = optimizer.run(&mut population).unwrap();
        assert_eq!(result.iterations, 5);
        assert_eq!(population.len(), 1);
        assert!(result.best_fitness.is_finite());
    }

    #[test]
    #[should_panic(expected = "empty population")]
    fn test_empty_population_panics() {
        let mut population = Population::new();
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(2);
        let mut monitoring = Always;
        let mut spread = Always;
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);
        let _ = optimizer.run(&mut population);
    }

    #[test]
    fn test_invalid_config_leaves_population_untouched() {
        let mut population = initial_population(3, 2, 9);
        let before = population.clone();
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(2);
        let mut monitoring = Always;
        let mut spread = Always;
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);
        optimizer.config.initial_temperature = -1.0;

        let err = optimizer.run(&mut population).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTemperature(-1.0));
        assert_eq!(population, before);
    }

    #[test]
    fn test_cancel_flag_stops_after_first_iteration() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut population = initial_population(5, 2, 10);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(3);
        let mut monitoring = CancelFlag::new(flag);
        let mut spread = Always;
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);

        let result = optimizer.run(&mut population).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.stop_reason, StopReason::Monitoring);
    }

    #[test]
    fn test_checkpoint_sees_every_iteration() {
        let mut history = HistoryMonitor::new();
        let mut population = initial_population(5, 2, 11);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(3);
        let mut spread = Always;
        let result = {
            let mut monitoring = Checkpoint::new(MaxGenerations::new(8)).with(&mut history);
            let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);
            optimizer.run(&mut population).unwrap()
        };
        assert_eq!(result.iterations, 8);
        assert_eq!(history.len(), 8);
    }

    #[test]
    fn test_spread_convergence_stops_run() {
        let mut population = initial_population(5, 2, 12);
        let mut setup = UniformSetup::new();
        let mut inner = MaxSamples::new(3);
        let mut monitoring = Always;
        // any box is narrower than this
        let mut spread = SpreadContinue::new(1e3);
        let mut optimizer = setup.optimizer(&mut inner, &mut monitoring, &mut spread);

        let result = optimizer.run(&mut population).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.stop_reason, StopReason::Distribution);
    }

    #[test]
    fn test_normal_family_counts_evaluations() {
        let mut population = initial_population(8, 2, 13);
        let selector = DetSelect::rate(0.5).unwrap();
        let select_one = Selection::Best;
        let evaluator = CountingEvaluator::new(Sphere);
        let sampler = NormalSampler::new(reflect());
        let replacement = PlusReplacement::keep_size();
        let mut cooling = GeometricCooling::new(0.1, 0.1).unwrap();
        let mut inner = MaxSamples::new(4);
        let mut monitoring = MaxGenerations::new(30);
        let mut spread = SpreadContinue::new(1e-9);

        let result = {
            let mut optimizer: CmaSa<'_, Normal> = CmaSa {
                selector: &selector,
                estimator: &NormalEstimator,
                select_one: &select_one,
                modifier: &NormalCenter,
                sampler: &sampler,
                monitoring_continue: &mut monitoring,
                distribution_continue: &mut spread,
                evaluator: &evaluator,
                sa_continue: &mut inner,
                cooling: &mut cooling,
                replacement: &replacement,
                snapshot: None,
                config: CmaSaConfig::default().with_seed(3),
            };
            optimizer.run(&mut population).unwrap()
        };

        // initial members plus every candidate, each exactly once
        assert_eq!(evaluator.count(), 8 + result.samples);
        assert_eq!(population.len(), 8);
        assert!(result.best_fitness <= result.fitness_history[0]);
        assert!(result
            .fitness_history
            .windows(2)
            .all(|w| w[1] <= w[0]));
    }
}
