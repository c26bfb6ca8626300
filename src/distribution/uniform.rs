//! Uniform (box) distribution family.

use super::{columns, Bounder, Distribution, Estimator, Modifier, Sampler};
use crate::population::{Population, Solution};
use rand::{Rng, RngCore};

/// Minimum box width enforced by [`UniformEstimator`].
pub const MIN_WIDTH: f64 = 1e-10;

/// Smallest half-width around `center` that still yields `lo < hi`.
///
/// [`MIN_WIDTH`] alone vanishes below one ulp once `|center|` is large.
fn min_half_width(center: f64) -> f64 {
    (MIN_WIDTH / 2.0).max(center.abs() * f64::EPSILON)
}

/// Uniform distribution over the box `[lower[i], upper[i]]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uniform {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Uniform {
    /// Creates a box distribution.
    ///
    /// # Panics
    /// Panics if the vectors are empty, differ in length, or `lower > upper`
    /// in some dimension.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        assert!(!lower.is_empty(), "distribution size must be positive");
        assert_eq!(lower.len(), upper.len(), "lower and upper differ in size");
        assert!(
            lower.iter().zip(&upper).all(|(lo, hi)| lo <= hi),
            "lower bound exceeds upper bound"
        );
        Self { lower, upper }
    }

    /// Lower corner of the box.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper corner of the box.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Center of the box.
    pub fn center(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(lo, hi)| lo + (hi - lo) / 2.0)
            .collect()
    }

    /// Box width per dimension.
    pub fn widths(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(lo, hi)| hi - lo)
            .collect()
    }
}

impl Distribution for Uniform {
    fn size(&self) -> usize {
        self.lower.len()
    }

    fn spread(&self) -> Vec<f64> {
        self.widths()
    }
}

/// Fits the bounding box of a population.
///
/// Dimensions whose width collapses below [`MIN_WIDTH`] are widened
/// symmetrically around their midpoint, by more than [`MIN_WIDTH`] where
/// the midpoint is large enough that it would round away.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEstimator;

impl Estimator<Uniform> for UniformEstimator {
    fn estimate(&self, population: &Population) -> Uniform {
        let (lower, upper) = columns(population)
            .into_iter()
            .map(|col| {
                let lo = col.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = col.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                if hi - lo < MIN_WIDTH {
                    let mid = lo + (hi - lo) / 2.0;
                    let half = min_half_width(mid);
                    (mid - half, mid + half)
                } else {
                    (lo, hi)
                }
            })
            .unzip();
        Uniform::new(lower, upper)
    }
}

/// Moves the box so that it is centered on the reference, keeping widths.
///
/// A width too small to survive at the reference's magnitude is raised
/// so the box keeps `lower < upper`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCenter;

impl Modifier<Uniform> for UniformCenter {
    fn modify(&self, distribution: &mut Uniform, reference: &Solution) {
        assert_eq!(
            reference.dimension(),
            distribution.size(),
            "reference dimension does not match distribution size"
        );
        for ((lo, hi), &r) in distribution
            .lower
            .iter_mut()
            .zip(distribution.upper.iter_mut())
            .zip(reference.genes())
        {
            let half = ((*hi - *lo) / 2.0).max(min_half_width(r));
            *lo = r - half;
            *hi = r + half;
        }
    }
}

/// Draws each gene uniformly inside the box, then applies the bounder.
#[derive(Debug, Clone, Default)]
pub struct UniformSampler {
    bounder: Bounder,
}

impl UniformSampler {
    /// Creates a sampler that corrects draws with `bounder`.
    pub fn new(bounder: Bounder) -> Self {
        Self { bounder }
    }
}

impl Sampler<Uniform> for UniformSampler {
    fn sample(&self, distribution: &Uniform, rng: &mut dyn RngCore) -> Solution {
        let mut genes: Vec<f64> = distribution
            .lower
            .iter()
            .zip(&distribution.upper)
            .map(|(&lo, &hi)| if hi > lo { rng.random_range(lo..hi) } else { lo })
            .collect();
        self.bounder.apply(&mut genes, rng);
        Solution::new(genes)
    }
}
