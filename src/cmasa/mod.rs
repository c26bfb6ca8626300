//! CMA-SA: estimation of distribution with simulated-annealing refinement.
//!
//! A population-based metaheuristic for continuous minimization. Every
//! outer iteration fits a parametric distribution to the best part of the
//! population and refines a reference solution with candidates drawn from
//! it, accepting worse candidates with a temperature-controlled
//! probability. The temperature follows a cooling schedule, which is also
//! the primary stopping condition.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Larrañaga & Lozano (2002), *Estimation of Distribution Algorithms*
//! - Dréo & Siarry (2007), "Stochastic metaheuristics as sampling techniques
//!   using swarm intelligence"

mod config;
mod runner;

pub use config::{Acceptance, CmaSaConfig};
pub use runner::{CmaSa, CmaSaResult, StopReason};
