//! Candidate solutions and populations.
//!
//! A [`Solution`] is a real-valued gene vector with a lazily computed
//! fitness. Lower fitness is better (minimization). The fitness is cached
//! as an `Option`: `None` means "not evaluated yet", and any mutable access
//! to the genes resets it to `None`.

use crate::eval::Evaluator;
use std::cmp::Ordering;
use std::ops::{Deref, Index};

/// A candidate solution to a continuous minimization problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    genes: Vec<f64>,
    fitness: Option<f64>,
}

impl Solution {
    /// Creates an unevaluated solution.
    pub fn new(genes: Vec<f64>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Creates a solution with a known fitness.
    pub fn with_fitness(genes: Vec<f64>, fitness: f64) -> Self {
        Self {
            genes,
            fitness: Some(fitness),
        }
    }

    /// Number of genes.
    pub fn dimension(&self) -> usize {
        self.genes.len()
    }

    /// Read-only access to the genes.
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    /// Mutable access to the genes. Invalidates the cached fitness.
    pub fn genes_mut(&mut self) -> &mut [f64] {
        self.fitness = None;
        &mut self.genes
    }

    /// Consumes the solution and returns its genes.
    pub fn into_genes(self) -> Vec<f64> {
        self.genes
    }

    /// Cached fitness, if the solution has been evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Cached fitness, or `+inf` for unevaluated solutions.
    ///
    /// Used for ranking, where an unevaluated solution is never preferred.
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// Stores a freshly computed fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Whether the cached fitness is authoritative.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Discards the cached fitness.
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }
}

/// Compares two solutions by fitness, best (lowest) first.
///
/// Unevaluated solutions sort last; NaN compares equal.
pub fn compare_fitness(a: &Solution, b: &Solution) -> Ordering {
    a.fitness_or_worst()
        .partial_cmp(&b.fitness_or_worst())
        .unwrap_or(Ordering::Equal)
}

/// Summary statistics over the fitness values of a population.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationStats {
    /// Number of members.
    pub size: usize,
    /// Lowest fitness.
    pub best: f64,
    /// Highest fitness.
    pub worst: f64,
    /// Mean fitness.
    pub mean: f64,
    /// Population standard deviation of the fitness.
    pub std_dev: f64,
}

/// An ordered collection of solutions of uniform dimension.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    members: Vec<Solution>,
}

impl Population {
    /// Creates an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty population with room for `capacity` members.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
        }
    }

    /// Builds a population of unevaluated solutions from raw gene vectors.
    pub fn from_genes<I>(genes: I) -> Self
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        genes.into_iter().map(Solution::new).collect()
    }

    /// Appends a solution.
    pub fn push(&mut self, solution: Solution) {
        self.members.push(solution);
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Keeps only the first `len` members.
    pub fn truncate(&mut self, len: usize) {
        self.members.truncate(len);
    }

    /// Mutable access to the members.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Solution> {
        self.members.iter_mut()
    }

    /// Consumes the population and returns its members.
    pub fn into_vec(self) -> Vec<Solution> {
        self.members
    }

    /// Dimension of the members, or `None` when the population is empty.
    pub fn dimension(&self) -> Option<usize> {
        self.members.first().map(Solution::dimension)
    }

    /// Whether every member has the same dimension.
    pub fn is_uniform(&self) -> bool {
        match self.dimension() {
            Some(d) => self.members.iter().all(|s| s.dimension() == d),
            None => true,
        }
    }

    /// Evaluates every member whose fitness is not cached.
    pub fn evaluate_all<E: Evaluator + ?Sized>(&mut self, evaluator: &E) {
        for solution in &mut self.members {
            evaluator.evaluate(solution);
        }
    }

    /// Sorts the members by fitness, best first.
    pub fn sort_by_fitness(&mut self) {
        self.members.sort_by(compare_fitness);
    }

    /// The member with the lowest fitness.
    pub fn best(&self) -> Option<&Solution> {
        self.members.iter().min_by(|a, b| compare_fitness(a, b))
    }

    /// Fitness statistics over the evaluated members.
    ///
    /// Returns `None` if no member has been evaluated.
    pub fn stats(&self) -> Option<PopulationStats> {
        let fitnesses: Vec<f64> = self.members.iter().filter_map(Solution::fitness).collect();
        if fitnesses.is_empty() {
            return None;
        }

        let n = fitnesses.len() as f64;
        let best = fitnesses.iter().cloned().fold(f64::INFINITY, f64::min);
        let worst = fitnesses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = fitnesses.iter().sum::<f64>() / n;
        let variance = fitnesses.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;

        Some(PopulationStats {
            size: self.members.len(),
            best,
            worst,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

impl Deref for Population {
    type Target = [Solution];

    fn deref(&self) -> &[Solution] {
        &self.members
    }
}

impl Index<usize> for Population {
    type Output = Solution;

    fn index(&self, index: usize) -> &Solution {
        &self.members[index]
    }
}

impl From<Vec<Solution>> for Population {
    fn from(members: Vec<Solution>) -> Self {
        Self { members }
    }
}

impl FromIterator<Solution> for Population {
    fn from_iter<I: IntoIterator<Item = Solution>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl Extend<Solution> for Population {
    fn extend<I: IntoIterator<Item = Solution>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

impl IntoIterator for Population {
    type Item = Solution;
    type IntoIter = std::vec::IntoIter<Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
