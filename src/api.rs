use crate::engine::{Executor, RunOutcome, ScheduleError};
use crate::{Matches, Mutation, Rule};
use once_cell::sync::Lazy;
use std::time::Duration;

static DEFAULT_RULES: Lazy<Vec<Box<dyn Rule>>> = Lazy::new(crate::rules::episode_title::get);

/// What happened to a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A new match was inserted.
    Appended,
    /// An existing match changed tag, keeping span and value.
    Relabelled {
        /// Previous tag name.
        from: String,
    },
    /// An existing match was deleted.
    Removed,
}

/// One applied change, attributed to the rule that made it.
///
/// `start`/`end` are byte offsets into the original input; hosts typically
/// feed these straight into their own logging or tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Name of the rule that planned the change.
    pub rule: String,
    pub action: Action,
    /// Resulting tag name (for removals, the removed tag).
    pub tag: String,
    /// Value of the touched match.
    pub value: String,
    /// Start byte index of the span.
    pub start: usize,
    /// End byte index of the span (exclusive).
    pub end: usize,
}

/// Result from [`resolve`] and [`resolve_with`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Applied changes, in application order.
    pub changes: Vec<Change>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// One rule's pass over the collection, for the verbose report.
#[derive(Debug, Clone)]
pub struct RulePass {
    pub rule: String,
    /// Whether the rule planned any mutation.
    pub fired: bool,
    pub planned: usize,
    pub applied: usize,
    pub duration: Duration,
}

/// Additional details returned by [`resolve_verbose`].
///
/// This is intentionally compact: enough to see what ran, in which order, and
/// what each pass did, without dumping internal state.
#[derive(Debug, Clone)]
pub struct ResolveDetails {
    /// Rule names in scheduled order.
    pub order: Vec<String>,
    /// Per-rule pass details, in scheduled order.
    pub passes: Vec<RulePass>,
}

/// Result from [`resolve_verbose`].
#[derive(Debug, Clone)]
pub struct ResolutionVerbose {
    pub changes: Vec<Change>,
    pub elapsed: Duration,
    pub details: ResolveDetails,
}

/// Run the default episode-title rule set over `matches`.
///
/// # Example
/// ```
/// use titular::{Match, Matches, Span, Tag, resolve};
///
/// let name = "Dexter.S01E05.Truth.be.Told.720p.mkv";
/// let mut matches = Matches::new(name);
/// matches.set_fileparts(vec![Span::new(0, name.len())]);
/// matches.append(Match::new(Tag::Title, "Dexter", Span::new(0, 6)));
/// matches.append(Match::new(Tag::Season, "1", Span::new(7, 10)));
/// matches.append(Match::new(Tag::EpisodeNumber, "5", Span::new(10, 13)));
/// matches.append(Match::new(Tag::ScreenSize, "720p", Span::new(28, 32)));
/// matches.append(Match::new(Tag::Container, "mkv", Span::new(33, 36)));
///
/// let resolution = resolve(&mut matches);
/// let episode_title = matches.named(Tag::EpisodeTitle).next().unwrap();
/// assert_eq!(episode_title.value, "Truth be Told");
/// assert!(!resolution.changes.is_empty());
/// ```
pub fn resolve(matches: &mut Matches) -> Resolution {
    let executor = Executor::new(&DEFAULT_RULES).expect("default rule set schedules");
    let outcome = executor.run(matches);
    Resolution { changes: changes(&outcome), elapsed: outcome.metrics.total }
}

/// Run the default rule set and return extra (compact) run details.
///
/// Useful for debugging rule behavior on a stubborn file name; the plain
/// [`resolve`] path does not allocate the extra report.
pub fn resolve_verbose(matches: &mut Matches) -> ResolutionVerbose {
    let executor = Executor::new(&DEFAULT_RULES).expect("default rule set schedules");
    let order = executor.schedule().into_iter().map(str::to_string).collect();
    let outcome = executor.run(matches);

    let passes = outcome
        .metrics
        .rules
        .iter()
        .map(|pass| RulePass {
            rule: pass.name.to_string(),
            fired: pass.planned > 0,
            planned: pass.planned,
            applied: pass.applied,
            duration: pass.duration,
        })
        .collect();

    ResolutionVerbose {
        changes: changes(&outcome),
        elapsed: outcome.metrics.total,
        details: ResolveDetails { order, passes },
    }
}

/// Run a custom rule set over `matches`.
///
/// Fails when the set's dependency graph is invalid (duplicate names, unknown
/// dependencies, cycles); nothing is applied in that case.
pub fn resolve_with(
    matches: &mut Matches,
    rules: &[Box<dyn Rule>],
) -> Result<Resolution, ScheduleError> {
    let executor = Executor::new(rules)?;
    let outcome = executor.run(matches);
    Ok(Resolution { changes: changes(&outcome), elapsed: outcome.metrics.total })
}

fn changes(outcome: &RunOutcome) -> Vec<Change> {
    outcome
        .mutations
        .iter()
        .map(|applied| {
            let (action, tag, span) = match &applied.mutation {
                Mutation::Append(m) => (Action::Appended, m.tag, m.span),
                Mutation::Relabel { span, from, to } => {
                    (Action::Relabelled { from: from.name().to_string() }, *to, *span)
                }
                Mutation::Remove { span, tag } => (Action::Removed, *tag, *span),
            };
            Change {
                rule: applied.rule.to_string(),
                action,
                tag: tag.name().to_string(),
                value: applied.value.clone(),
                start: span.start,
                end: span.end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuxTags, Match, Span, Tag};

    fn span_of(input: &str, part: &str) -> Span {
        let start = input.find(part).unwrap();
        Span::new(start, start + part.len())
    }

    fn sample() -> Matches {
        let input = "Dexter.S01E05.Truth.be.Told.mkv";
        let mut matches = Matches::new(input);
        matches.set_fileparts(vec![Span::new(0, input.len())]);
        matches
            .append(Match::new(Tag::Title, "Dexter", span_of(input, "Dexter")).with_aux(AuxTags::TITLE));
        matches.append(Match::new(Tag::Season, "1", span_of(input, "S01")));
        matches.append(Match::new(Tag::EpisodeNumber, "5", span_of(input, "E05")));
        matches.append(Match::new(Tag::Container, "mkv", span_of(input, "mkv")));
        matches
    }

    #[test]
    fn resolve_reports_applied_changes() {
        let mut matches = sample();
        let resolution = resolve(&mut matches);

        assert_eq!(resolution.changes.len(), 1);
        let change = &resolution.changes[0];
        assert_eq!(change.rule, "episode title from position");
        assert_eq!(change.action, Action::Appended);
        assert_eq!(change.tag, "episodeTitle");
        assert_eq!(change.value, "Truth be Told");
        assert_eq!(&matches.input()[change.start..change.end], "Truth.be.Told");
    }

    #[test]
    fn resolve_verbose_reports_every_pass() {
        let mut matches = sample();
        let verbose = resolve_verbose(&mut matches);

        assert_eq!(verbose.details.order.len(), 5);
        assert_eq!(verbose.details.passes.len(), 5);
        assert_eq!(verbose.changes.len(), 1);
        let fired: Vec<&str> = verbose
            .details
            .passes
            .iter()
            .filter(|pass| pass.fired)
            .map(|pass| pass.rule.as_str())
            .collect();
        assert_eq!(fired, vec!["episode title from position"]);
    }

    #[test]
    fn relabels_report_the_previous_tag() {
        let input = "Chuck.S01E03.Chuck.Versus.the.Tango.mkv";
        let mut matches = Matches::new(input);
        matches.set_fileparts(vec![Span::new(0, input.len())]);
        matches.append(Match::new(Tag::Title, "Chuck", span_of(input, "Chuck")).with_aux(AuxTags::TITLE));
        matches.append(Match::new(Tag::Season, "1", span_of(input, "S01")));
        matches.append(Match::new(Tag::EpisodeNumber, "3", span_of(input, "E03")));
        matches.append(
            Match::new(Tag::Title, "Chuck Versus the Tango", span_of(input, "Chuck.Versus.the.Tango"))
                .with_aux(AuxTags::TITLE),
        );
        matches.append(Match::new(Tag::Container, "mkv", span_of(input, "mkv")));

        let resolution = resolve(&mut matches);
        let relabel = resolution
            .changes
            .iter()
            .find(|c| matches!(c.action, Action::Relabelled { .. }))
            .unwrap();
        assert_eq!(relabel.action, Action::Relabelled { from: "title".to_string() });
        assert_eq!(relabel.value, "Chuck Versus the Tango");
    }

    #[test]
    fn invalid_custom_rule_sets_are_rejected() {
        struct Looped(&'static str, &'static [&'static str]);
        impl Rule for Looped {
            fn name(&self) -> &'static str {
                self.0
            }
            fn dependencies(&self) -> &'static [&'static str] {
                self.1
            }
            fn plan(&self, _matches: &Matches) -> Vec<Mutation> {
                Vec::new()
            }
        }

        let rules: Vec<Box<dyn Rule>> =
            vec![Box::new(Looped("a", &["b"])), Box::new(Looped("b", &["a"]))];
        let mut matches = Matches::new("");
        let err = resolve_with(&mut matches, &rules).unwrap_err();
        assert!(matches!(err, ScheduleError::Cycle(_)));
    }
}
