//! Hook-driven positional title search.
//!
//! The driver scans path segments for unmatched holes and carves the first
//! acceptable one into a new title-class match:
//!
//! ```text
//! for filepart in fileparts:            // shallow-to-deep
//!     filepart_filter?                  // hook: segment worth scanning
//!     for hole in holes(filepart):      // transparent tags per ignored()
//!         hole_filter?                  // hook: hole is a title candidate
//!         arbitrate matches inside      // hook: keep_policy per match
//!         append carved title           // at most one per run
//! ```
//!
//! Specializations steer the driver through the hooks on [`PositionalTitle`];
//! the driver itself never inspects tags beyond what the hooks tell it.

use crate::text::{Formatter, TITLE_SEPS, cleanup};
use crate::{AuxTags, Hole, Match, Matches, Mutation, Pred, Span, Tag, TagSet};

/// Arbitration outcome for a transparent match found inside an accepted hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keep {
    /// Keep the match in the collection; `false` removes it and lets the
    /// title absorb its text.
    pub keep: bool,
    /// Crop the title hole so it no longer covers the match.
    pub crop: bool,
}

impl Keep {
    /// Keep the match and carve the title around it.
    pub const fn cropped() -> Self {
        Keep { keep: true, crop: true }
    }

    /// Keep the match and leave the title covering it; both survive as
    /// distinct, overlapping entries.
    pub const fn overlapping() -> Self {
        Keep { keep: true, crop: false }
    }

    /// Remove the match; its text stays part of the title.
    pub const fn absorbed() -> Self {
        Keep { keep: false, crop: false }
    }
}

/// A positional title search, specialized through override hooks.
pub trait PositionalTitle {
    /// Tag for the produced match.
    fn target(&self) -> Tag;

    /// Secondary marker tags stamped on the produced match.
    fn marker(&self) -> AuxTags {
        AuxTags::empty()
    }

    /// Whether a path segment is worth scanning at all.
    fn filepart_filter(&self, _filepart: Span, _matches: &Matches) -> bool {
        true
    }

    /// Whether a hole is an acceptable title candidate.
    fn hole_filter(&self, _hole: &Hole, _matches: &Matches) -> bool {
        true
    }

    /// Tags treated as transparent when computing holes. Matches carrying one
    /// are arbitrated by [`PositionalTitle::keep_policy`] instead of
    /// delimiting the hole.
    fn ignored(&self) -> TagSet {
        TagSet::empty()
    }

    /// Arbitrate one transparent match inside an accepted hole.
    fn keep_policy(&self, _m: &Match, _matches: &Matches) -> Keep {
        Keep::cropped()
    }

    /// Value formatter for carved holes.
    fn formatter(&self) -> Formatter {
        cleanup
    }
}

/// Run the positional search and return the mutations it would make: at most
/// one `Append` of the target tag, plus a `Remove` per absorbed match.
///
/// The first acceptable hole of the first eligible segment wins. An empty
/// collection, no eligible segment or no acceptable hole all degrade to an
/// empty plan; a hole abandoned mid-arbitration contributes nothing.
pub fn propose(rule: &impl PositionalTitle, matches: &Matches) -> Vec<Mutation> {
    for &filepart in matches.fileparts() {
        if !rule.filepart_filter(filepart, matches) {
            continue;
        }
        for hole in matches.holes(filepart, TITLE_SEPS, rule.ignored(), rule.formatter()) {
            if !rule.hole_filter(&hole, matches) {
                continue;
            }
            if let Some(plan) = carve_title(rule, &hole, matches) {
                return plan;
            }
        }
    }
    Vec::new()
}

/// Arbitrate transparent matches inside `hole` and build the final plan.
/// `None` when cropping leaves nothing to title.
fn carve_title(
    rule: &impl PositionalTitle,
    hole: &Hole,
    matches: &Matches,
) -> Option<Vec<Mutation>> {
    let mut plan: Vec<Mutation> = Vec::new();
    let mut span = hole.span;

    let inside: Vec<&Match> = matches.range(hole.span, Pred::AnyTag(rule.ignored())).collect();
    for m in inside.iter().rev() {
        let keep = rule.keep_policy(m, matches);
        if !keep.keep {
            plan.push(Mutation::Remove { span: m.span, tag: m.tag });
        } else if keep.crop {
            span = crop(span, m.span)?;
        }
    }

    let carved = matches.carve(span, TITLE_SEPS, rule.formatter())?;
    let title = Match::new(rule.target(), carved.value, carved.span).with_aux(rule.marker());
    plan.push(Mutation::Append(title));
    Some(plan)
}

/// Crop `span` around `cut`, keeping the larger remaining side (the earlier
/// side on a tie). `None` when nothing remains.
fn crop(span: Span, cut: Span) -> Option<Span> {
    let left = Span::new(span.start, cut.start.clamp(span.start, span.end));
    let right = Span::new(cut.end.clamp(span.start, span.end), span.end);
    match (left.is_empty(), right.is_empty()) {
        (true, true) => None,
        (false, true) => Some(left),
        (true, false) => Some(right),
        (false, false) => Some(if right.len() > left.len() { right } else { left }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_of(input: &str, part: &str) -> Span {
        let start = input.find(part).unwrap();
        Span::new(start, start + part.len())
    }

    /// Minimal specialization: titles any unmatched text it finds.
    struct AnyTitle;

    impl PositionalTitle for AnyTitle {
        fn target(&self) -> Tag {
            Tag::Title
        }
    }

    /// Treats language spans as transparent and absorbs them into the title.
    struct AbsorbLanguages;

    impl PositionalTitle for AbsorbLanguages {
        fn target(&self) -> Tag {
            Tag::Title
        }

        fn ignored(&self) -> TagSet {
            TagSet::LANGUAGE
        }

        fn keep_policy(&self, _m: &Match, _matches: &Matches) -> Keep {
            Keep::absorbed()
        }
    }

    /// Same transparency, but with the default keep policy (crop around).
    struct CropLanguages;

    impl PositionalTitle for CropLanguages {
        fn target(&self) -> Tag {
            Tag::Title
        }

        fn ignored(&self) -> TagSet {
            TagSet::LANGUAGE
        }
    }

    fn language_sample() -> Matches {
        let input = "Show.FR.Title.mkv";
        let mut matches = Matches::new(input);
        matches.set_fileparts(vec![Span::new(0, input.len())]);
        matches.append(Match::new(Tag::Language, "fr", span_of(input, "FR")));
        matches.append(Match::new(Tag::Container, "mkv", span_of(input, "mkv")));
        matches
    }

    #[test]
    fn carves_the_first_hole() {
        let input = "Truth.be.Told.S01.mkv";
        let mut matches = Matches::new(input);
        matches.set_fileparts(vec![Span::new(0, input.len())]);
        matches.append(Match::new(Tag::Season, "1", span_of(input, "S01")));
        matches.append(Match::new(Tag::Container, "mkv", span_of(input, "mkv")));

        let plan = propose(&AnyTitle, &matches);
        assert_eq!(plan.len(), 1);
        match &plan[0] {
            Mutation::Append(m) => {
                assert_eq!(m.tag, Tag::Title);
                assert_eq!(m.value, "Truth be Told");
                assert_eq!(m.span, span_of(input, "Truth.be.Told"));
            }
            other => panic!("unexpected mutation {other:?}"),
        }
    }

    #[test]
    fn empty_collection_degrades_to_empty_plan() {
        let matches = Matches::new("");
        assert!(propose(&AnyTitle, &matches).is_empty());
    }

    #[test]
    fn absorbed_matches_are_removed_and_their_text_kept() {
        let matches = language_sample();
        let plan = propose(&AbsorbLanguages, &matches);
        let language = span_of(matches.input(), "FR");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], Mutation::Remove { span: language, tag: Tag::Language });
        match &plan[1] {
            Mutation::Append(m) => assert_eq!(m.value, "Show FR Title"),
            other => panic!("unexpected mutation {other:?}"),
        }
    }

    #[test]
    fn cropped_matches_survive_outside_the_title() {
        let matches = language_sample();
        let plan = propose(&CropLanguages, &matches);
        // "Title" (after the language) is the larger side of the crop.
        assert_eq!(plan.len(), 1);
        match &plan[0] {
            Mutation::Append(m) => {
                assert_eq!(m.value, "Title");
                assert_eq!(m.span, span_of(matches.input(), "Title"));
            }
            other => panic!("unexpected mutation {other:?}"),
        }
    }

    #[test]
    fn crop_keeps_the_larger_side() {
        assert_eq!(crop(Span::new(0, 10), Span::new(6, 8)), Some(Span::new(0, 6)));
        assert_eq!(crop(Span::new(0, 10), Span::new(2, 4)), Some(Span::new(4, 10)));
        // Ties go to the earlier side.
        assert_eq!(crop(Span::new(0, 10), Span::new(4, 6)), Some(Span::new(0, 4)));
        // Cuts at an edge shrink; a cut covering everything leaves nothing.
        assert_eq!(crop(Span::new(0, 10), Span::new(0, 4)), Some(Span::new(4, 10)));
        assert_eq!(crop(Span::new(2, 8), Span::new(0, 10)), None);
    }
}
