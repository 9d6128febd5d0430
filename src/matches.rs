//! Match collection and query surface.
//!
//! `Matches` is the single shared, mutable structure the whole ensemble works
//! on: the normalized input string, the tagged spans over it, and the ordered
//! path markers it was split from. The upstream extractor seeds it; rules read
//! it through the queries below and change it only through the three mutation
//! primitives (`append`, `remove`, `relabel`).
//!
//! Queries are positional, not semantic:
//!
//! ```text
//! Dexter/Season 1/Dexter.S01E05.Truth.be.Told.mkv
//! ├────┤ ├──────┤ ├────────────────────────────┤   fileparts()
//!        ├──────┤        ├──┤                       named(Season)
//!                            ├─────────────┤        holes(...)
//!                     ◄──────┘                      previous(...)
//! ```
//!
//! The collection keeps its entries ordered by `(start, end)` at all times, so
//! "document order" never needs a per-call sort and every query is
//! deterministic.

use crate::text::Formatter;
use crate::{Hole, Match, Mutation, Pred, Span, Tag, TagSet};

/// The shared match collection one file name resolves against.
#[derive(Debug, Clone)]
pub struct Matches {
    input: String,
    items: Vec<Match>,
    fileparts: Vec<Span>,
}

impl Matches {
    /// Create an empty collection over `input`, the normalized file name
    /// including the path segments it was split from.
    pub fn new(input: impl Into<String>) -> Self {
        Matches { input: input.into(), items: Vec::new(), fileparts: Vec::new() }
    }

    /// The normalized input string all spans index into.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Set the ordered path markers, shallowest segment first; the last marker
    /// is always the file-name segment. Markers are read-only once set.
    pub fn set_fileparts(&mut self, fileparts: Vec<Span>) {
        self.fileparts = fileparts;
    }

    /// Ordered path markers, shallow-to-deep.
    pub fn fileparts(&self) -> &[Span] {
        &self.fileparts
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All matches in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Match> + '_ {
        self.items.iter()
    }

    // --- Queries -------------------------------------------------------------

    /// All matches carrying `tag`, document order.
    pub fn named(&self, tag: Tag) -> impl Iterator<Item = &Match> + '_ {
        self.items.iter().filter(move |m| m.tag == tag)
    }

    /// True when at least one match carries `tag`.
    pub fn has(&self, tag: Tag) -> bool {
        self.named(tag).next().is_some()
    }

    /// First match with exactly this span and tag.
    pub fn find(&self, span: Span, tag: Tag) -> Option<&Match> {
        self.items.iter().find(|m| m.span == span && m.tag == tag)
    }

    /// Matches lying fully inside `span` and satisfying `pred`, document order.
    pub fn range(&self, span: Span, pred: Pred) -> impl Iterator<Item = &Match> + '_ {
        self.items.iter().filter(move |m| span.contains_span(m.span) && pred.matches(m))
    }

    /// Nearest match ending before byte offset `before`.
    ///
    /// Positions are walked backward one at a time until at least one match
    /// ends there (unmatched text and separators are skipped), and only that
    /// nearest-ending set is filtered with `pred` and indexed. A qualifying
    /// match further back is never considered.
    pub fn previous(&self, before: usize, pred: Pred, index: usize) -> Option<&Match> {
        let mut pos = before.min(self.input.len());
        while pos > 0 {
            if self.items.iter().any(|m| m.span.end == pos) {
                return self
                    .items
                    .iter()
                    .filter(|m| m.span.end == pos && pred.matches(m))
                    .nth(index);
            }
            pos -= 1;
        }
        None
    }

    /// Nearest match (then next-nearest, and so on) chained before `position`.
    ///
    /// A chain is a contiguous run of `pred`-satisfying matches linked only by
    /// characters from `seps`; the walk ends at the first uncovered character
    /// that is not a separator.
    pub fn chain_before(
        &self,
        position: usize,
        seps: &str,
        pred: Pred,
        index: usize,
    ) -> Option<&Match> {
        let upto = position.min(self.input.len());
        let mut chain: Vec<&Match> = Vec::new();
        for (i, ch) in self.input[..upto].char_indices().rev() {
            let mut covered = false;
            for m in self.items.iter().filter(|m| m.span.contains(i) && pred.matches(m)) {
                covered = true;
                if !chain.iter().any(|c| c.span == m.span && c.tag == m.tag) {
                    chain.push(m);
                }
            }
            if !covered && !seps.contains(ch) {
                break;
            }
        }
        chain.into_iter().nth(index)
    }

    /// Maximal unmatched gaps inside `span`, document order.
    ///
    /// Matches whose tag is in `ignore` are transparent: gaps may span them.
    /// Each gap is trimmed of leading and trailing `seps` characters and its
    /// value produced by `formatter`; gaps empty after either step are dropped.
    pub fn holes(&self, span: Span, seps: &str, ignore: TagSet, formatter: Formatter) -> Vec<Hole> {
        let end = span.end.min(self.input.len());
        let mut gaps: Vec<Span> = Vec::new();
        let mut cursor = span.start;
        for m in &self.items {
            if ignore.contains(m.tag.set()) || m.span.end <= cursor || m.span.start >= end {
                continue;
            }
            if m.span.start > cursor {
                gaps.push(Span::new(cursor, m.span.start));
            }
            cursor = cursor.max(m.span.end);
            if cursor >= end {
                break;
            }
        }
        if cursor < end {
            gaps.push(Span::new(cursor, end));
        }

        gaps.into_iter().filter_map(|gap| self.carve(gap, seps, formatter)).collect()
    }

    /// Trim `gap` against `seps` and format its value; `None` when nothing
    /// remains after trimming or formatting.
    pub(crate) fn carve(&self, gap: Span, seps: &str, formatter: Formatter) -> Option<Hole> {
        let raw = &self.input[gap.start..gap.end.min(self.input.len())];
        let lead = raw.trim_start_matches(|c| seps.contains(c));
        let start = gap.start + (raw.len() - lead.len());
        let kept = lead.trim_end_matches(|c| seps.contains(c));
        let span = Span::new(start, start + kept.len());
        if span.is_empty() {
            return None;
        }
        let value = formatter(kept);
        if value.is_empty() {
            return None;
        }
        Some(Hole { span, value })
    }

    // --- Mutations -----------------------------------------------------------

    /// Insert a match at its ordered `(start, end)` position. Entries with an
    /// identical span keep insertion order.
    pub fn append(&mut self, m: Match) {
        let key = (m.span.start, m.span.end);
        let at = self.items.partition_point(|x| (x.span.start, x.span.end) <= key);
        self.items.insert(at, m);
    }

    /// Remove the first match with exactly this span and tag. Returns whether
    /// an entry was removed.
    pub fn remove(&mut self, span: Span, tag: Tag) -> bool {
        match self.items.iter().position(|m| m.span == span && m.tag == tag) {
            Some(at) => {
                self.items.remove(at);
                true
            }
            None => false,
        }
    }

    /// Replace the tag of the match identified by `(span, from)`, preserving
    /// span and value. The collection is ordered by span alone, so this is
    /// observably identical to remove-then-append under the new tag.
    pub fn relabel(&mut self, span: Span, from: Tag, to: Tag) -> bool {
        for m in &mut self.items {
            if m.span == span && m.tag == from {
                m.tag = to;
                return true;
            }
        }
        false
    }

    /// Apply one planned mutation. Returns whether the collection changed.
    pub fn apply(&mut self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::Append(m) => {
                self.append(m.clone());
                true
            }
            Mutation::Relabel { span, from, to } => self.relabel(*span, *from, *to),
            Mutation::Remove { span, tag } => self.remove(*span, *tag),
        }
    }
}
