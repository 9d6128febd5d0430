//! Rule scheduling and execution engine.
//!
//! The engine is the *mechanical* half of the crate: it decides when each rule
//! runs and applies what the rules decide, without knowing anything about
//! titles or episodes.
//!
//! Running a rule set over a collection is a short pipeline:
//!
//! ```text
//! rules (all) ──┐
//!               │  RuleGraph::new + schedule      (graph.rs)
//!               └──────────────┬─────────────
//!                              │ topological order, registration-order ties
//!                              v
//!                   Executor::run (executor.rs)
//!                     - for each rule, in order:
//!                     -   plan against the collection
//!                     -   apply the whole plan
//!                              │
//!                              v
//!                   RunOutcome (metrics.rs)
//!                     - applied mutations, per-rule timings
//! ```
//!
//! Execution is strictly sequential: one rule at a time, each observing every
//! mutation made by the rules before it. A rule's plan is applied in full
//! between invocations, so a half-applied plan is never visible. Rules whose
//! guards fail simply return an empty plan; the engine has no error path at
//! run time; the only failure mode is an invalid rule graph, rejected once at
//! construction.
//!
//! ## Responsibilities by module
//!
//! - `graph.rs`: dependency validation and the topological schedule.
//! - `executor.rs`: the sequential plan/apply loop and debug tracing.
//! - `metrics.rs`: opt-in timing and mutation accounting for a run.
//!
//! ## Debugging
//!
//! Set `TITULAR_DEBUG_RULES=1` to print the schedule and per-rule traces to
//! stderr.

#[path = "engine/executor.rs"]
mod executor;
#[path = "engine/graph.rs"]
mod graph;
#[path = "engine/metrics.rs"]
mod metrics;

pub use executor::Executor;
#[allow(unused_imports)]
pub use graph::{RuleGraph, ScheduleError};
#[allow(unused_imports)]
pub use metrics::{RuleMetrics, RuleMutation, RunMetrics, RunOutcome};
