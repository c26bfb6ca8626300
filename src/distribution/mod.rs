//! Parametric distributions over the solution space.
//!
//! Each outer iteration of the optimizer fits a distribution to the
//! genitors, biases it toward a reference solution, and then draws new
//! candidates from it. Those three steps are separate strategy roles:
//!
//! - [`Estimator`]: fits a fresh distribution to a population
//! - [`Modifier`]: adjusts a fitted distribution in place
//! - [`Sampler`]: draws one candidate solution
//!
//! Two families are provided:
//!
//! - [`Uniform`]: an axis-aligned box `[lower, upper]`
//! - [`Normal`]: a multivariate normal with full covariance
//!
//! Samplers pass every draw through a [`Bounder`] so candidates stay inside
//! the search domain.

mod bounds;
mod normal;
mod uniform;

pub use bounds::{Bounder, Bounds};
pub use normal::{Normal, NormalCenter, NormalEstimator, NormalSampler, MIN_VARIANCE};
pub use uniform::{Uniform, UniformCenter, UniformEstimator, UniformSampler, MIN_WIDTH};

use crate::population::{Population, Solution};
use rand::RngCore;

/// A parametric statistical model over `size`-dimensional real vectors.
pub trait Distribution: Clone + std::fmt::Debug {
    /// Dimension of the modelled space.
    fn size(&self) -> usize;

    /// Per-dimension dispersion (standard deviation or box width).
    ///
    /// Used by convergence predicates to detect a collapsed search.
    fn spread(&self) -> Vec<f64>;
}

/// Fits a distribution to a population.
pub trait Estimator<D: Distribution> {
    /// Estimates the parameters of a new distribution from `population`.
    ///
    /// The result has `size() == population.dimension()`.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    fn estimate(&self, population: &Population) -> D;
}

/// Adjusts a distribution in place given a reference solution.
pub trait Modifier<D: Distribution> {
    /// Biases `distribution` toward `reference`. Must preserve its size.
    fn modify(&self, distribution: &mut D, reference: &Solution);
}

/// Draws candidate solutions from a distribution.
pub trait Sampler<D: Distribution> {
    /// Draws one unevaluated solution.
    fn sample(&self, distribution: &D, rng: &mut dyn RngCore) -> Solution;
}

/// Transposes a population into per-dimension gene columns.
fn columns(population: &Population) -> Vec<Vec<f64>> {
    assert!(
        !population.is_empty(),
        "cannot estimate a distribution from an empty population"
    );
    assert!(
        population.is_uniform(),
        "population members must share one dimension"
    );

    let d = population[0].dimension();
    assert!(d > 0, "solutions must have at least one gene");

    let mut cols = vec![Vec::with_capacity(population.len()); d];
    for solution in population {
        for (col, &g) in cols.iter_mut().zip(solution.genes()) {
            col.push(g);
        }
    }
    cols
}
