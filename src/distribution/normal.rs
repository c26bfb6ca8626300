//! Multivariate normal distribution family.

use super::{columns, Bounder, Distribution, Estimator, Modifier, Sampler};
use crate::population::{Population, Solution};
use rand::RngCore;
use rand_distr::{Distribution as _, StandardNormal};

/// Minimum variance enforced on the covariance diagonal.
pub const MIN_VARIANCE: f64 = 1e-12;

/// Multivariate normal `N(mean, covariance)`.
///
/// The covariance is stored row-major together with its lower-triangular
/// Cholesky factor, which is what sampling needs. When the covariance is
/// not positive definite the factor falls back to the square root of the
/// (floored) diagonal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Normal {
    mean: Vec<f64>,
    covariance: Vec<f64>,
    factor: Vec<f64>,
}

impl Normal {
    /// Creates a normal distribution from a mean and a row-major covariance.
    ///
    /// # Panics
    /// Panics if `mean` is empty or `covariance` is not `n * n`.
    pub fn new(mean: Vec<f64>, covariance: Vec<f64>) -> Self {
        let n = mean.len();
        assert!(n > 0, "distribution size must be positive");
        assert_eq!(covariance.len(), n * n, "covariance must be n x n");

        let factor = cholesky(&covariance, n).unwrap_or_else(|| {
            let mut diag = vec![0.0; n * n];
            for i in 0..n {
                diag[i * n + i] = covariance[i * n + i].max(MIN_VARIANCE).sqrt();
            }
            diag
        });

        Self {
            mean,
            covariance,
            factor,
        }
    }

    /// Creates `N(mean, sigma^2 I)`.
    pub fn isotropic(mean: Vec<f64>, sigma: f64) -> Self {
        let n = mean.len();
        let mut covariance = vec![0.0; n * n];
        for i in 0..n {
            covariance[i * n + i] = sigma * sigma;
        }
        Self::new(mean, covariance)
    }

    /// Mean vector.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Row-major covariance matrix.
    pub fn covariance(&self) -> &[f64] {
        &self.covariance
    }

    /// Variance of dimension `i`.
    pub fn variance(&self, i: usize) -> f64 {
        self.covariance[i * self.size() + i]
    }

    /// Replaces the mean, keeping the covariance.
    ///
    /// # Panics
    /// Panics if `mean` has the wrong length.
    pub fn set_mean(&mut self, mean: &[f64]) {
        assert_eq!(
            mean.len(),
            self.mean.len(),
            "mean dimension does not match distribution size"
        );
        self.mean.copy_from_slice(mean);
    }

    /// Maps a standard normal vector `z` to `mean + L z`.
    fn transform(&self, z: &[f64]) -> Vec<f64> {
        let n = self.size();
        (0..n)
            .map(|i| {
                let row = &self.factor[i * n..i * n + i + 1];
                self.mean[i] + row.iter().zip(z).map(|(l, z)| l * z).sum::<f64>()
            })
            .collect()
    }
}

impl Distribution for Normal {
    fn size(&self) -> usize {
        self.mean.len()
    }

    fn spread(&self) -> Vec<f64> {
        (0..self.size()).map(|i| self.variance(i).sqrt()).collect()
    }
}

/// Cholesky decomposition `A = L L^T` of a row-major `n x n` matrix.
///
/// Returns `None` if `A` is not (numerically) positive definite.
fn cholesky(a: &[f64], n: usize) -> Option<Vec<f64>> {
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum();
            if i == j {
                let d = a[i * n + i] - dot;
                if !d.is_finite() || d <= 0.0 {
                    return None;
                }
                l[i * n + j] = d.sqrt();
            } else {
                l[i * n + j] = (a[i * n + j] - dot) / l[j * n + j];
            }
        }
    }
    Some(l)
}

/// Fits mean and covariance (divisor `n`) to a population.
///
/// Variances below [`MIN_VARIANCE`] are raised to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalEstimator;

impl Estimator<Normal> for NormalEstimator {
    fn estimate(&self, population: &Population) -> Normal {
        let cols = columns(population);
        let n = cols.len();
        let count = population.len() as f64;

        let mean: Vec<f64> = cols.iter().map(|c| c.iter().sum::<f64>() / count).collect();

        let mut covariance = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                let c = cols[i]
                    .iter()
                    .zip(&cols[j])
                    .map(|(a, b)| (a - mean[i]) * (b - mean[j]))
                    .sum::<f64>()
                    / count;
                covariance[i * n + j] = c;
                covariance[j * n + i] = c;
            }
            covariance[i * n + i] = covariance[i * n + i].max(MIN_VARIANCE);
        }

        Normal::new(mean, covariance)
    }
}

/// Moves the mean onto the reference solution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalCenter;

impl Modifier<Normal> for NormalCenter {
    fn modify(&self, distribution: &mut Normal, reference: &Solution) {
        distribution.set_mean(reference.genes());
    }
}

/// Draws `mean + L z` with `z ~ N(0, I)`, then applies the bounder.
#[derive(Debug, Clone, Default)]
pub struct NormalSampler {
    bounder: Bounder,
}

impl NormalSampler {
    /// Creates a sampler that corrects draws with `bounder`.
    pub fn new(bounder: Bounder) -> Self {
        Self { bounder }
    }
}

impl Sampler<Normal> for NormalSampler {
    fn sample(&self, distribution: &Normal, rng: &mut dyn RngCore) -> Solution {
        let z: Vec<f64> = (0..distribution.size())
            .map(|_| StandardNormal.sample(&mut *rng))
            .collect();
        let mut genes = distribution.transform(&z);
        self.bounder.apply(&mut genes, rng);
        Solution::new(genes)
    }
}
