//! Estimation-of-distribution search with simulated-annealing refinement.
//!
//! The optimizer ([`cmasa::CmaSa`]) is assembled from independent strategy
//! objects, one per role:
//!
//! - **Selection**: [`selection::Select`] extracts genitors,
//!   [`selection::SelectOne`] picks the reference solution.
//! - **Distribution**: an [`distribution::Estimator`] fits a model,
//!   a [`distribution::Modifier`] biases it toward the reference and a
//!   [`distribution::Sampler`] draws candidates inside optional bounds.
//!   Uniform-box and multivariate normal families are provided.
//! - **Cooling**: [`cooling::CoolingSchedule`] lowers the temperature and
//!   is the primary stopping condition.
//! - **Continuation**: [`continuation::Continue`] predicates over the
//!   population, the distribution and the inner reference solution.
//! - **Replacement**: [`replacement::Replacement`] merges the refined set
//!   into the next working population.
//!
//! Fitness is minimized. Randomness is always injected; see [`random`].
//!
//! # Examples
//!
//! ```
//! use cma_sa::cmasa::{CmaSa, CmaSaConfig};
//! use cma_sa::continuation::{Always, MaxSamples};
//! use cma_sa::cooling::GeometricCooling;
//! use cma_sa::distribution::{
//!     Bounder, Bounds, Uniform, UniformCenter, UniformEstimator, UniformSampler,
//! };
//! use cma_sa::eval::Sphere;
//! use cma_sa::population::Population;
//! use cma_sa::replacement::PlusReplacement;
//! use cma_sa::selection::{DetSelect, Selection};
//!
//! let bounds = Bounds::hypercube(2, -5.0, 5.0).unwrap();
//! let sampler = UniformSampler::new(Bounder::Reflect(bounds));
//! let selector = DetSelect::rate(0.5).unwrap();
//! let replacement = PlusReplacement::keep_size();
//! let mut cooling = GeometricCooling::new(0.1, 0.1).unwrap();
//! let mut inner = MaxSamples::new(3);
//! let mut monitoring = Always;
//! let mut spread = Always;
//!
//! let mut optimizer: CmaSa<'_, Uniform> = CmaSa {
//!     selector: &selector,
//!     estimator: &UniformEstimator,
//!     select_one: &Selection::DetTournament(2),
//!     modifier: &UniformCenter,
//!     sampler: &sampler,
//!     monitoring_continue: &mut monitoring,
//!     distribution_continue: &mut spread,
//!     evaluator: &Sphere,
//!     sa_continue: &mut inner,
//!     cooling: &mut cooling,
//!     replacement: &replacement,
//!     snapshot: None,
//!     config: CmaSaConfig::default().with_initial_temperature(1e5).with_seed(7),
//! };
//!
//! let mut population = Population::from_genes(vec![
//!     vec![4.0, -3.0],
//!     vec![-2.5, 1.0],
//!     vec![3.0, 3.0],
//!     vec![-4.0, -4.5],
//! ]);
//! let result = optimizer.run(&mut population).unwrap();
//! assert_eq!(result.iterations, 132);
//! assert!(result.best_fitness < 7.25);
//! ```

pub mod cmasa;
pub mod continuation;
pub mod cooling;
pub mod distribution;
pub mod error;
pub mod eval;
pub mod population;
pub mod random;
pub mod replacement;
pub mod selection;

pub use error::{ConfigError, Result};
