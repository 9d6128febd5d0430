//! Engine run metrics.
//!
//! A run's observability is intentionally simple and opt-in: the executor
//! always collects these (they are cheap, one entry per rule), and callers
//! that do not care simply ignore everything but the mutations.

use crate::Mutation;
use std::time::Duration;

/// Timing and mutation counts for a full run.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the run.
    pub total: Duration,
    /// Per-rule details, in scheduled order.
    pub rules: Vec<RuleMetrics>,
}

/// One rule's pass over the collection.
#[derive(Debug, Clone)]
pub struct RuleMetrics {
    pub name: &'static str,
    /// Mutations the rule planned.
    pub planned: usize,
    /// Mutations that actually changed the collection.
    pub applied: usize,
    /// Elapsed time for plan + apply.
    pub duration: Duration,
}

/// An applied mutation attributed to the rule that planned it.
#[derive(Debug, Clone)]
pub struct RuleMutation {
    pub rule: &'static str,
    pub mutation: Mutation,
    /// Value of the touched match, snapshotted at apply time.
    pub value: String,
}

/// Executor output: the applied mutations plus timing details.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Every applied mutation, in application order.
    pub mutations: Vec<RuleMutation>,
    /// Timing measurements for the run.
    pub metrics: RunMetrics,
}
