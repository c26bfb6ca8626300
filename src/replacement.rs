//! Replacement strategies.
//!
//! Between two outer iterations the survivors of the previous working
//! population are merged with the refined set produced by the inner loop.
//! The merged population becomes the next working population.
//!
//! # References
//!
//! - Fogel (1995), *Evolutionary Computation* (EP tournament replacement)
//! - Schwefel (1981), (mu + lambda) selection

use crate::error::{ConfigError, Result};
use crate::population::{compare_fitness, Population};
use rand::{Rng, RngCore};

/// Merges survivors and refined solutions.
pub trait Replacement {
    /// Writes the next working population into `refined`.
    ///
    /// Both populations are expected to be evaluated.
    fn replace(&self, survivors: &Population, refined: &mut Population, rng: &mut dyn RngCore);
}

/// The refined set replaces the survivors entirely.
///
/// When the inner loop accepted nothing the survivors are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationalReplacement;

impl Replacement for GenerationalReplacement {
    fn replace(&self, survivors: &Population, refined: &mut Population, _rng: &mut dyn RngCore) {
        if refined.is_empty() {
            *refined = survivors.clone();
        }
    }
}

/// Elitist `(mu + lambda)` replacement: keeps the best of the union.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlusReplacement {
    size: Option<usize>,
}

impl PlusReplacement {
    /// Keeps the `size` best of the union.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(ConfigError::ZeroCount { name: "size" });
        }
        Ok(Self { size: Some(size) })
    }

    /// Keeps as many members as the survivors had.
    pub fn keep_size() -> Self {
        Self { size: None }
    }
}

impl Replacement for PlusReplacement {
    fn replace(&self, survivors: &Population, refined: &mut Population, _rng: &mut dyn RngCore) {
        let size = self.size.unwrap_or(survivors.len());
        refined.extend(survivors.iter().cloned());
        refined.sort_by_fitness();
        refined.truncate(size);
    }
}

/// Evolutionary-Programming stochastic tournament replacement.
///
/// Every member of the union meets `tournament` random opponents and scores
/// one point per opponent it is at least as good as. The `size` highest
/// scores survive, ties broken by fitness.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpReplacement {
    size: Option<usize>,
    tournament: usize,
}

impl EpReplacement {
    /// Keeps `size` members, scoring each against `tournament` opponents.
    pub fn new(size: usize, tournament: usize) -> Result<Self> {
        if size == 0 {
            return Err(ConfigError::ZeroCount { name: "size" });
        }
        if tournament == 0 {
            return Err(ConfigError::ZeroCount { name: "tournament" });
        }
        Ok(Self {
            size: Some(size),
            tournament,
        })
    }

    /// Keeps as many members as the survivors had, with 6 opponents each.
    pub fn keep_size() -> Self {
        Self {
            size: None,
            tournament: 6,
        }
    }
}

impl Default for EpReplacement {
    fn default() -> Self {
        Self::keep_size()
    }
}

impl Replacement for EpReplacement {
    fn replace(&self, survivors: &Population, refined: &mut Population, rng: &mut dyn RngCore) {
        let size = self.size.unwrap_or(survivors.len());
        refined.extend(survivors.iter().cloned());

        let n = refined.len();
        if n <= size {
            refined.sort_by_fitness();
            return;
        }

        let scores: Vec<usize> = (0..n)
            .map(|i| {
                let own = refined[i].fitness_or_worst();
                (0..self.tournament)
                    .filter(|_| own <= refined[rng.random_range(0..n)].fitness_or_worst())
                    .count()
            })
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .cmp(&scores[a])
                .then_with(|| compare_fitness(&refined[a], &refined[b]))
        });

        let merged: Population = order[..size].iter().map(|&i| refined[i].clone()).collect();
        *refined = merged;
    }
}
