//! Episode-title disambiguation rules.
//!
//! The ensemble resolves which span of an already-tagged file name is the
//! episode title, using only relative position, path depth and the presence
//! of neighboring tags:
//!
//! - [`TitleToEpisodeTitle`]: with several titles, the ones directly after an
//!   episode number are episode titles.
//! - [`EpisodeTitleFromPosition`]: with no episode title yet, carve one from
//!   the unmatched text following episode context.
//! - [`AlternativeTitleReplace`]: an alternative title trailing an anchored
//!   main title is the episode title.
//! - [`Filepart3EpisodeTitle`] / [`Filepart2EpisodeTitle`]: infer a missing
//!   series title from the directory layout.
//!
//! Rules are registered in their historical declaration order; the dependency
//! graph, not the list, fixes execution: the path-layout rules run first
//! (they only ever add `title` matches the promotion chain consumes), then
//! title promotion, positional search and the alternative-title fallback, in
//! that order.
//!
//! Every rule degrades to an empty plan on missing anchors, insufficient path
//! depth or an already-present episode title, which also makes a second run
//! over its own output a no-op.

use crate::rules::positional::{self, Keep, PositionalTitle};
use crate::text::{SEPS, TITLE_SEPS, cleanup};
use crate::{AuxTags, Hole, Match, Matches, Mutation, Pred, Rule, Span, Tag, TagSet};

/// Tags whose presence just before a span marks episode context.
const EPISODE_ANCHORS: TagSet = TagSet::EPISODE_NUMBER
    .union(TagSet::EPISODE_DETAILS)
    .union(TagSet::EPISODE_COUNT)
    .union(TagSet::SEASON)
    .union(TagSet::SEASON_COUNT)
    .union(TagSet::DATE)
    .union(TagSet::TITLE);

const TITLE_TO_EPISODE_TITLE: &str = "title to episode title";
const EPISODE_TITLE_FROM_POSITION: &str = "episode title from position";
const ALTERNATIVE_TITLE_REPLACE: &str = "alternative title replace";
const TITLE_FROM_3_PART_PATH: &str = "title from 3-part path";
const TITLE_FROM_2_PART_PATH: &str = "title from 2-part path";

/// The default rule set, in declaration order.
pub fn get() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(EpisodeTitleFromPosition),
        Box::new(AlternativeTitleReplace),
        Box::new(TitleToEpisodeTitle),
        Box::new(Filepart3EpisodeTitle),
        Box::new(Filepart2EpisodeTitle),
    ]
}

/// True when the nearest tagged span ending before `before` marks episode
/// context, or a crc32 span anchors the whole name.
fn episode_anchored(matches: &Matches, before: usize) -> bool {
    matches.previous(before, Pred::AnyTag(EPISODE_ANCHORS), 0).is_some()
        || matches.has(Tag::Crc32)
}

// --- TitleToEpisodeTitle -----------------------------------------------------

/// When several titles were found, the ones directly following an episode
/// number are episode titles, not main titles.
pub struct TitleToEpisodeTitle;

impl Rule for TitleToEpisodeTitle {
    fn name(&self) -> &'static str {
        TITLE_TO_EPISODE_TITLE
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[TITLE_FROM_3_PART_PATH, TITLE_FROM_2_PART_PATH]
    }

    fn plan(&self, matches: &Matches) -> Vec<Mutation> {
        let titles: Vec<&Match> = matches.named(Tag::Title).collect();
        if titles.len() < 2 {
            return Vec::new();
        }
        titles
            .into_iter()
            .filter(|title| {
                matches.previous(title.span.start, Pred::Tag(Tag::EpisodeNumber), 0).is_some()
            })
            .map(|title| Mutation::Relabel {
                span: title.span,
                from: Tag::Title,
                to: Tag::EpisodeTitle,
            })
            .collect()
    }
}

// --- EpisodeTitleFromPosition ------------------------------------------------

/// When no episode title exists, carve one from the unmatched text following
/// episode context, in the segment where the main title was found.
pub struct EpisodeTitleFromPosition;

impl PositionalTitle for EpisodeTitleFromPosition {
    fn target(&self) -> Tag {
        Tag::EpisodeTitle
    }

    fn marker(&self) -> AuxTags {
        AuxTags::TITLE
    }

    fn filepart_filter(&self, filepart: Span, matches: &Matches) -> bool {
        // Only the segment where a title was already located.
        matches.range(filepart, Pred::Tag(Tag::Title)).next().is_some()
    }

    fn hole_filter(&self, hole: &Hole, matches: &Matches) -> bool {
        episode_anchored(matches, hole.span.start)
    }

    fn ignored(&self) -> TagSet {
        TagSet::EPISODE_DETAILS
    }

    fn keep_policy(&self, m: &Match, matches: &Matches) -> Keep {
        if m.tag == Tag::EpisodeDetails
            && matches.previous(m.span.start, Pred::Tag(Tag::Season), 0).is_none()
        {
            // Keep the details span and leave the title covering it.
            return Keep::overlapping();
        }
        Keep::cropped()
    }
}

impl Rule for EpisodeTitleFromPosition {
    fn name(&self) -> &'static str {
        EPISODE_TITLE_FROM_POSITION
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[TITLE_TO_EPISODE_TITLE]
    }

    fn plan(&self, matches: &Matches) -> Vec<Mutation> {
        if matches.has(Tag::EpisodeTitle) {
            return Vec::new();
        }
        positional::propose(self, matches)
    }
}

// --- AlternativeTitleReplace -------------------------------------------------

/// When an alternative title trails a main title that sits in episode
/// context, the alternative title is the episode title.
pub struct AlternativeTitleReplace;

impl Rule for AlternativeTitleReplace {
    fn name(&self) -> &'static str {
        ALTERNATIVE_TITLE_REPLACE
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[EPISODE_TITLE_FROM_POSITION]
    }

    fn plan(&self, matches: &Matches) -> Vec<Mutation> {
        if matches.has(Tag::EpisodeTitle) {
            return Vec::new();
        }
        let Some(alternative) = matches.named(Tag::AlternativeTitle).next() else {
            return Vec::new();
        };
        // The nearest title-marked span chained before the alternative title.
        let Some(main) =
            matches.chain_before(alternative.span.start, SEPS, Pred::Marked(AuxTags::TITLE), 0)
        else {
            return Vec::new();
        };
        if episode_anchored(matches, main.span.start) {
            return vec![Mutation::Relabel {
                span: alternative.span,
                from: Tag::AlternativeTitle,
                to: Tag::EpisodeTitle,
            }];
        }
        Vec::new()
    }
}

// --- Path-layout rules -------------------------------------------------------

/// `Series Name/Season 1/E05...`: with an episode number in the file name and
/// a season in the parent directory, the series title is the grandparent
/// segment's unmatched text.
pub struct Filepart3EpisodeTitle;

impl Rule for Filepart3EpisodeTitle {
    fn name(&self) -> &'static str {
        TITLE_FROM_3_PART_PATH
    }

    fn plan(&self, matches: &Matches) -> Vec<Mutation> {
        let fileparts = matches.fileparts();
        if fileparts.len() < 3 {
            return Vec::new();
        }
        let filename = fileparts[fileparts.len() - 1];
        let directory = fileparts[fileparts.len() - 2];
        let subdirectory = fileparts[fileparts.len() - 3];
        title_from_segment(matches, filename, directory, subdirectory)
    }
}

/// `Series Name S01/E05...`: the series title and the season tag share the
/// parent segment; the title is that segment's unmatched text.
pub struct Filepart2EpisodeTitle;

impl Rule for Filepart2EpisodeTitle {
    fn name(&self) -> &'static str {
        TITLE_FROM_2_PART_PATH
    }

    fn plan(&self, matches: &Matches) -> Vec<Mutation> {
        let fileparts = matches.fileparts();
        if fileparts.len() < 2 {
            return Vec::new();
        }
        let filename = fileparts[fileparts.len() - 1];
        let directory = fileparts[fileparts.len() - 2];
        title_from_segment(matches, filename, directory, directory)
    }
}

/// Shared predicate for the path-layout rules: an episode number in
/// `filename` and a season in `directory` make the first hole of `source` the
/// series title. Idempotent without a guard: once the title is appended, the
/// hole is gone.
fn title_from_segment(
    matches: &Matches,
    filename: Span,
    directory: Span,
    source: Span,
) -> Vec<Mutation> {
    if matches.range(filename, Pred::Tag(Tag::EpisodeNumber)).next().is_none() {
        return Vec::new();
    }
    if matches.range(directory, Pred::Tag(Tag::Season)).next().is_none() {
        return Vec::new();
    }
    match matches.holes(source, TITLE_SEPS, TagSet::empty(), cleanup).into_iter().next() {
        Some(hole) => vec![Mutation::Append(Match::new(Tag::Title, hole.value, hole.span))],
        None => Vec::new(),
    }
}
