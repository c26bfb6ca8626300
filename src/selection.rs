//! Selection strategies.
//!
//! Two roles are involved in every outer iteration:
//!
//! - a [`Select`] strategy extracts the genitors (the sub-population the
//!   next distribution is fitted to);
//! - a [`SelectOne`] strategy picks the reference solution from the
//!   genitors.
//!
//! All strategies assume **minimization** (lower fitness = better).
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use crate::error::{ConfigError, Result};
use crate::population::{compare_fitness, Population, Solution};
use rand::{Rng, RngCore};

/// Extracts a sub-population from a population.
pub trait Select {
    /// Selects genitors from `source`.
    ///
    /// The result is never empty for a non-empty `source`.
    fn select(&self, source: &Population, rng: &mut dyn RngCore) -> Population;
}

/// Picks a single solution from a population.
pub trait SelectOne {
    /// Picks one member of `population`.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    fn select_one<'p>(&self, population: &'p Population, rng: &mut dyn RngCore) -> &'p Solution;
}

/// Largest accepted [`HowMany::Rate`]: at most this many copies of the
/// source per selection.
pub const MAX_RATE: f64 = 100.0;

/// Number of individuals to select, as a rate of the source size or as an
/// absolute count.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HowMany {
    /// `floor(rate * source_size)`, with `rate` in `[0, MAX_RATE]`.
    Rate(f64),
    /// A fixed number.
    Count(usize),
}

impl HowMany {
    /// Target size for a source of `source_size` members.
    ///
    /// May be zero; selectors clamp it. Rates are capped at [`MAX_RATE`].
    pub fn target(&self, source_size: usize) -> usize {
        match *self {
            HowMany::Rate(rate) => (rate.min(MAX_RATE) * source_size as f64) as usize,
            HowMany::Count(n) => n,
        }
    }

    /// Validates the rate.
    pub fn validate(&self) -> Result<()> {
        match *self {
            HowMany::Rate(rate) if !(0.0..=MAX_RATE).contains(&rate) => {
                Err(ConfigError::InvalidRate {
                    name: "how_many",
                    value: rate,
                    expected: "must be in [0, 100]",
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for HowMany {
    fn default() -> Self {
        HowMany::Rate(1.0)
    }
}

/// Clamps a zero target to one, logging the adjustment.
fn clamp_target(target: usize, source_size: usize) -> usize {
    if target == 0 {
        log::warn!(
            "selection target is 0 for a source of {source_size}; selecting 1 individual instead"
        );
        1
    } else {
        target
    }
}

/// Deterministic truncation selection.
///
/// Sorts the source best-first and copies the first `target` members. When
/// the target exceeds the source size the sorted source is copied
/// repeatedly.
///
/// # Examples
///
/// ```
/// use cma_sa::selection::DetSelect;
///
/// // keep the best 10%
/// let select = DetSelect::rate(0.1).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetSelect {
    how_many: HowMany,
}

impl DetSelect {
    /// Creates a truncation selector.
    pub fn new(how_many: HowMany) -> Result<Self> {
        how_many.validate()?;
        Ok(Self { how_many })
    }

    /// Selects `floor(rate * n)` individuals.
    pub fn rate(rate: f64) -> Result<Self> {
        Self::new(HowMany::Rate(rate))
    }

    /// Selects `n` individuals.
    pub fn count(n: usize) -> Self {
        Self {
            how_many: HowMany::Count(n),
        }
    }
}

impl Select for DetSelect {
    fn select(&self, source: &Population, _rng: &mut dyn RngCore) -> Population {
        if source.is_empty() {
            return Population::new();
        }
        let target = clamp_target(self.how_many.target(source.len()), source.len());

        let mut sorted = source.clone();
        sorted.sort_by_fitness();

        sorted.iter().cycle().take(target).cloned().collect()
    }
}

/// Repeatedly applies a [`SelectOne`] strategy.
#[derive(Debug, Clone)]
pub struct SelectMany<S> {
    one: S,
    how_many: HowMany,
}

impl<S: SelectOne> SelectMany<S> {
    /// Creates a selector that draws `how_many` individuals with `one`.
    pub fn new(one: S, how_many: HowMany) -> Result<Self> {
        how_many.validate()?;
        Ok(Self { one, how_many })
    }
}

impl<S: SelectOne> Select for SelectMany<S> {
    fn select(&self, source: &Population, rng: &mut dyn RngCore) -> Population {
        if source.is_empty() {
            return Population::new();
        }
        let target = clamp_target(self.how_many.target(source.len()), source.len());
        (0..target)
            .map(|_| self.one.select_one(source, rng).clone())
            .collect()
    }
}

/// Strategy for picking one individual.
///
/// # Examples
///
/// ```
/// use cma_sa::selection::Selection;
///
/// // Binary deterministic tournament
/// let sel = Selection::DetTournament(2);
///
/// // Roulette wheel (fitness-proportionate)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Always the best individual.
    Best,

    /// Deterministic tournament: pick `k` individuals at random, select the
    /// best.
    ///
    /// Higher `k` = stronger selection pressure.
    ///
    /// # Complexity
    /// O(k) per selection
    DetTournament(usize),

    /// Binary stochastic tournament: the better of two random individuals
    /// wins with probability `rate`.
    ///
    /// The rate is clamped into `[0.55, 1.0]`.
    StochTournament(f64),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Since we minimize, uses inverse fitness transformation.
    ///
    /// # Complexity
    /// O(n) per selection (linear scan)
    Roulette,

    /// Rank-based selection.
    ///
    /// Selection probability is proportional to rank position, not raw
    /// fitness value. Uses linear ranking with weight `n - rank`.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::DetTournament(2)
    }
}

impl Selection {
    /// Picks an index into `population`.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select_index(&self, population: &[Solution], rng: &mut dyn RngCore) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match *self {
            Selection::Best => best(population),
            Selection::DetTournament(k) => tournament(population, k, rng),
            Selection::StochTournament(rate) => stoch_tournament(population, rate, rng),
            Selection::Roulette => roulette(population, rng),
            Selection::Rank => rank(population, rng),
        }
    }
}

impl SelectOne for Selection {
    fn select_one<'p>(&self, population: &'p Population, rng: &mut dyn RngCore) -> &'p Solution {
        &population[self.select_index(population, rng)]
    }
}

/// Index of the lowest fitness.
fn best(population: &[Solution]) -> usize {
    population
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| compare_fitness(a, b))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Tournament selection: pick k random individuals, return best.
fn tournament(population: &[Solution], k: usize, rng: &mut dyn RngCore) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness_or_worst() < population[best_idx].fitness_or_worst() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Binary stochastic tournament.
fn stoch_tournament(population: &[Solution], rate: f64, rng: &mut dyn RngCore) -> usize {
    let rate = if rate.is_nan() { 1.0 } else { rate.clamp(0.55, 1.0) };
    let n = population.len();

    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    let (better, worse) = if population[i].fitness_or_worst() <= population[j].fitness_or_worst() {
        (i, j)
    } else {
        (j, i)
    };

    if rng.random_bool(rate) {
        better
    } else {
        worse
    }
}

/// Roulette wheel selection using inverse fitness transformation.
///
/// For minimization: weight_i = max_fitness - fitness_i + epsilon
/// This ensures the best (lowest fitness) individual gets the highest weight.
/// Unevaluated or non-finite members only get epsilon weight.
fn roulette(population: &[Solution], rng: &mut dyn RngCore) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let fitnesses: Vec<f64> = population.iter().map(Solution::fitness_or_worst).collect();

    let max_fitness = fitnesses
        .iter()
        .cloned()
        .filter(|f| f.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    let epsilon = 1e-10;

    // Invert: lower fitness -> higher weight
    let weights: Vec<f64> = fitnesses
        .iter()
        .map(|&f| {
            let w = max_fitness - f + epsilon;
            if f.is_finite() && w > 0.0 {
                w
            } else {
                epsilon
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

/// Rank-based selection using linear ranking.
///
/// Individuals are sorted by fitness (best first), then selection
/// probability is proportional to rank.
fn rank(population: &[Solution], rng: &mut dyn RngCore) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let mut indexed: Vec<usize> = (0..n).collect();
    indexed.sort_by(|&a, &b| compare_fitness(&population[a], &population[b]));

    // Linear ranking: rank 0 (best) gets highest weight
    // weight_i = n - rank_i
    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &original_idx) in indexed.iter().enumerate() {
        let weight = (n - rank) as f64;
        cumulative += weight;
        if cumulative > threshold {
            return original_idx;
        }
    }

    indexed[n - 1] // fallback
}
