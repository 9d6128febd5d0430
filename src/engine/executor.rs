//! Sequential rule execution.
//!
//! The executor owns the plan/apply loop:
//!
//! ```text
//! for rule in schedule:
//!     plan = rule.plan(&matches)     // read-only
//!     for mutation in plan:
//!         matches.apply(mutation)    // whole plan, then next rule
//! ```
//!
//! Mutations identify their target by `(span, tag)`, which stays valid for
//! every entry of a plan computed against the pre-plan collection: appends
//! never disturb another entry's identity and relabels rewrite tags in place.
//! Later rules observe all mutations made by earlier ones; nothing is cached
//! across rule invocations.

use super::graph::{RuleGraph, RuleId, ScheduleError};
use super::metrics::{RuleMetrics, RuleMutation, RunMetrics, RunOutcome};
use crate::{Matches, Mutation, Rule};
use std::time::Instant;

/// Applies a scheduled rule set to match collections, one rule at a time.
///
/// The schedule is resolved once at construction; `run` can be reused across
/// collections.
pub struct Executor<'a> {
    rules: Vec<&'a dyn Rule>,
    order: Vec<RuleId>,
}

impl<'a> Executor<'a> {
    /// Validate and schedule `rules`.
    pub fn new(rules: &'a [Box<dyn Rule>]) -> Result<Self, ScheduleError> {
        let decls: Vec<(&'static str, &'static [&'static str])> =
            rules.iter().map(|rule| (rule.name(), rule.dependencies())).collect();
        let order = RuleGraph::new(&decls)?.schedule()?;

        if std::env::var_os("TITULAR_DEBUG_RULES").is_some() {
            let names: Vec<&str> = order.iter().map(|&id| rules[id].name()).collect();
            eprintln!("[schedule] {}", names.join(" -> "));
        }

        Ok(Executor { rules: rules.iter().map(|rule| rule.as_ref()).collect(), order })
    }

    /// Rule names in scheduled order.
    pub fn schedule(&self) -> Vec<&'static str> {
        self.order.iter().map(|&id| self.rules[id].name()).collect()
    }

    /// Run every rule once, in scheduled order.
    pub fn run(&self, matches: &mut Matches) -> RunOutcome {
        let debug = std::env::var_os("TITULAR_DEBUG_RULES").is_some();
        let run_start = Instant::now();
        let mut mutations: Vec<RuleMutation> = Vec::new();
        let mut passes: Vec<RuleMetrics> = Vec::new();

        for &id in &self.order {
            let rule = self.rules[id];
            let pass_start = Instant::now();
            let plan = rule.plan(matches);
            let planned = plan.len();
            let mut applied = 0;

            for mutation in plan {
                let value = value_of(matches, &mutation);
                if matches.apply(&mutation) {
                    applied += 1;
                    if debug {
                        eprintln!(
                            "[rule:applied] name=\"{}\" mutation={:?}",
                            rule.name(),
                            mutation
                        );
                    }
                    mutations.push(RuleMutation { rule: rule.name(), mutation, value });
                }
            }

            if debug && planned == 0 {
                eprintln!("[rule:skip] name=\"{}\"", rule.name());
            }

            passes.push(RuleMetrics {
                name: rule.name(),
                planned,
                applied,
                duration: pass_start.elapsed(),
            });
        }

        RunOutcome {
            mutations,
            metrics: RunMetrics { total: run_start.elapsed(), rules: passes },
        }
    }
}

/// Snapshot the value a mutation touches before it is applied: appends carry
/// their own value, relabels and removes read it from their target.
fn value_of(matches: &Matches, mutation: &Mutation) -> String {
    match mutation {
        Mutation::Append(m) => m.value.clone(),
        Mutation::Relabel { span, from, .. } => {
            matches.find(*span, *from).map(|m| m.value.clone()).unwrap_or_default()
        }
        Mutation::Remove { span, tag } => {
            matches.find(*span, *tag).map(|m| m.value.clone()).unwrap_or_default()
        }
    }
}
