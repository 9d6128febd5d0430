//! Rule graph construction and scheduling.
//!
//! This module holds the *static* side of the engine: the structures derived
//! from a registered rule list before anything touches a match collection.
//!
//! Each rule declares the names of the rules that must run before it. Those
//! declarations form a directed acyclic graph which is validated and
//! flattened into a schedule exactly once, at executor construction:
//!
//! ```text
//! registration list        dependency edges          schedule
//! [C, A, B]          +     A -> C, B -> C      =>    [A, B, C]
//! ```
//!
//! Registration order deliberately does not fix execution order: only ties
//! between rules with no path between them are broken by it, which keeps the
//! schedule deterministic for a given list.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into the registration list; the graph never reorders
//!   or drops entries.
//! - `schedule` returns every registered rule exactly once, or fails; there is
//!   no partial schedule.

use std::collections::BTreeSet;
use std::fmt;

/// Rule identifier (index into the registration list).
pub(crate) type RuleId = usize;

/// Rule-set validation failure, raised once when a rule set is scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Two rules registered under the same name.
    DuplicateRule(String),
    /// A declared dependency names no registered rule.
    UnknownDependency { rule: String, dependency: String },
    /// The dependency edges contain a cycle; holds the rules involved.
    Cycle(Vec<String>),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::DuplicateRule(name) => write!(f, "duplicate rule name '{name}'"),
            ScheduleError::UnknownDependency { rule, dependency } => {
                write!(f, "rule '{rule}' depends on unknown rule '{dependency}'")
            }
            ScheduleError::Cycle(names) => {
                write!(f, "dependency cycle involving: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Dependency graph over a registered rule list.
#[derive(Debug)]
pub struct RuleGraph {
    names: Vec<&'static str>,
    /// `depends_on[id]` holds the ids that must run before `id`.
    depends_on: Vec<Vec<RuleId>>,
}

impl RuleGraph {
    /// Build and validate the graph from `(name, dependencies)` declarations.
    pub fn new(
        decls: &[(&'static str, &'static [&'static str])],
    ) -> Result<Self, ScheduleError> {
        let names: Vec<&'static str> = decls.iter().map(|(name, _)| *name).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ScheduleError::DuplicateRule((*name).to_string()));
            }
        }

        let mut depends_on = Vec::with_capacity(decls.len());
        for (name, deps) in decls {
            let mut ids = Vec::with_capacity(deps.len());
            for dep in *deps {
                match names.iter().position(|n| n == dep) {
                    Some(id) => ids.push(id),
                    None => {
                        return Err(ScheduleError::UnknownDependency {
                            rule: (*name).to_string(),
                            dependency: (*dep).to_string(),
                        });
                    }
                }
            }
            depends_on.push(ids);
        }

        Ok(RuleGraph { names, depends_on })
    }

    /// Topological schedule (Kahn's algorithm). Ready rules are taken in
    /// registration order, so the schedule is stable for a given list.
    pub fn schedule(&self) -> Result<Vec<RuleId>, ScheduleError> {
        let n = self.names.len();
        let mut indegree: Vec<usize> = self.depends_on.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<RuleId>> = vec![Vec::new(); n];
        for (id, deps) in self.depends_on.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(id);
            }
        }

        let mut ready: BTreeSet<RuleId> =
            indegree.iter().enumerate().filter(|&(_, &d)| d == 0).map(|(id, _)| id).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for &dependent in &dependents[id] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < n {
            let stuck = (0..n)
                .filter(|id| !order.contains(id))
                .map(|id| self.names[id].to_string())
                .collect();
            return Err(ScheduleError::Cycle(stuck));
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn schedule_honors_dependencies_over_registration_order() {
        let graph = RuleGraph::new(&[
            ("last", &["middle"]),
            ("middle", &["first"]),
            ("first", NONE),
        ])
        .unwrap();
        assert_eq!(graph.schedule().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn registration_order_breaks_ties() {
        let graph = RuleGraph::new(&[("a", NONE), ("b", NONE), ("c", &["a", "b"])]).unwrap();
        assert_eq!(graph.schedule().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = RuleGraph::new(&[("a", NONE), ("a", NONE)]).unwrap_err();
        assert_eq!(err, ScheduleError::DuplicateRule("a".to_string()));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let err = RuleGraph::new(&[("a", &["ghost"])]).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::UnknownDependency {
                rule: "a".to_string(),
                dependency: "ghost".to_string()
            }
        );
    }

    #[test]
    fn cycles_are_rejected() {
        let graph = RuleGraph::new(&[("a", &["b"]), ("b", &["a"]), ("c", NONE)]).unwrap();
        let err = graph.schedule().unwrap_err();
        assert_eq!(err, ScheduleError::Cycle(vec!["a".to_string(), "b".to_string()]));
    }
}
