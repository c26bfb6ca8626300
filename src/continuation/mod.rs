//! Continuation predicates.
//!
//! The optimizer consults three independent predicates:
//!
//! - a **monitoring** predicate over the genitor population, once per outer
//!   iteration ([`MaxGenerations`], [`MaxEvaluations`], [`SteadyFitness`],
//!   [`TargetFitness`], [`TimeLimit`], [`CancelFlag`], [`Checkpoint`]);
//! - a **distribution** predicate over the fitted distribution
//!   ([`SpreadContinue`]);
//! - an **inner** predicate over the reference solution, once per inner
//!   iteration ([`MaxSamples`], [`TargetFitness`]).
//!
//! Predicates may keep internal counters; [`Continue::init`] resets them.

mod checkpoint;
mod distribution;
mod monitoring;
mod solution;

pub use checkpoint::{Checkpoint, HistoryMonitor, LogMonitor, Monitor};
pub use distribution::SpreadContinue;
pub use monitoring::{CancelFlag, MaxEvaluations, MaxGenerations, SteadyFitness, TimeLimit};
pub use solution::{MaxSamples, TargetFitness};

/// A stopping condition over some state `S`.
pub trait Continue<S: ?Sized> {
    /// Resets internal counters. Called at the start of the scope the
    /// predicate governs.
    fn init(&mut self) {}

    /// Returns `false` when the governed loop must stop.
    fn should_continue(&mut self, state: &S) -> bool;
}

impl<S: ?Sized, C: Continue<S> + ?Sized> Continue<S> for &mut C {
    fn init(&mut self) {
        (**self).init();
    }

    fn should_continue(&mut self, state: &S) -> bool {
        (**self).should_continue(state)
    }
}

/// A predicate that never stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl<S: ?Sized> Continue<S> for Always {
    fn should_continue(&mut self, _state: &S) -> bool {
        true
    }
}

/// Conjunction of several predicates.
///
/// Every predicate is evaluated on each call so that their counters stay in
/// step; the result is `false` if any of them returns `false`.
pub struct CombinedContinue<'a, S: ?Sized> {
    predicates: Vec<Box<dyn Continue<S> + 'a>>,
}

impl<'a, S: ?Sized> CombinedContinue<'a, S> {
    /// Creates an empty conjunction, which always continues.
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Adds a predicate.
    pub fn with<C: Continue<S> + 'a>(mut self, predicate: C) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Adds a predicate.
    pub fn push<C: Continue<S> + 'a>(&mut self, predicate: C) {
        self.predicates.push(Box::new(predicate));
    }
}

impl<S: ?Sized> Default for CombinedContinue<'_, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> Continue<S> for CombinedContinue<'_, S> {
    fn init(&mut self) {
        for p in &mut self.predicates {
            p.init();
        }
    }

    fn should_continue(&mut self, state: &S) -> bool {
        self.predicates
            .iter_mut()
            .fold(true, |keep, p| p.should_continue(state) && keep)
    }
}
