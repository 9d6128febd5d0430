//! Rule-based episode-title disambiguation for media file names.
//!
//! The input is a collection of already-tagged spans (titles, episode numbers,
//! seasons, dates, checksums) over a normalized file name, plus the ordered
//! path segments the name was split from. This crate decides which span (or
//! which still-unmatched gap) is the episode title, using only relative
//! position, path depth and the presence of neighboring tags. It does not
//! tokenize file names and does not recognize numbers, dates or checksums;
//! an upstream extractor owns that.

mod api;
mod engine;
mod matches;
pub mod rules;
pub mod text;

pub use api::{
    Action, Change, Resolution, ResolutionVerbose, ResolveDetails, RulePass, resolve,
    resolve_verbose, resolve_with,
};
pub use engine::ScheduleError;
pub use matches::Matches;

// --- Spans and tags ----------------------------------------------------------

/// Half-open byte range into the normalized file name.
///
/// Offsets always fall on `char` boundaries; the upstream extractor guarantees
/// this for every span it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `pos` lies inside the span.
    pub const fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// True when `other` lies fully inside the span.
    pub const fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub const fn intersects(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Primary tag vocabulary for extracted spans.
///
/// The upstream extractor produces all of these; this crate only ever appends
/// `Title` and `EpisodeTitle` entries and relabels between the title tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Title,
    EpisodeTitle,
    AlternativeTitle,
    EpisodeNumber,
    EpisodeCount,
    EpisodeDetails,
    Season,
    SeasonCount,
    Date,
    Crc32,
    Year,
    ScreenSize,
    ReleaseGroup,
    Container,
    Language,
}

impl Tag {
    /// Host-facing property name.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Title => "title",
            Tag::EpisodeTitle => "episodeTitle",
            Tag::AlternativeTitle => "alternativeTitle",
            Tag::EpisodeNumber => "episodeNumber",
            Tag::EpisodeCount => "episodeCount",
            Tag::EpisodeDetails => "episodeDetails",
            Tag::Season => "season",
            Tag::SeasonCount => "seasonCount",
            Tag::Date => "date",
            Tag::Crc32 => "crc32",
            Tag::Year => "year",
            Tag::ScreenSize => "screenSize",
            Tag::ReleaseGroup => "releaseGroup",
            Tag::Container => "container",
            Tag::Language => "language",
        }
    }

    /// Singleton [`TagSet`] for this tag.
    pub const fn set(self) -> TagSet {
        match self {
            Tag::Title => TagSet::TITLE,
            Tag::EpisodeTitle => TagSet::EPISODE_TITLE,
            Tag::AlternativeTitle => TagSet::ALTERNATIVE_TITLE,
            Tag::EpisodeNumber => TagSet::EPISODE_NUMBER,
            Tag::EpisodeCount => TagSet::EPISODE_COUNT,
            Tag::EpisodeDetails => TagSet::EPISODE_DETAILS,
            Tag::Season => TagSet::SEASON,
            Tag::SeasonCount => TagSet::SEASON_COUNT,
            Tag::Date => TagSet::DATE,
            Tag::Crc32 => TagSet::CRC32,
            Tag::Year => TagSet::YEAR,
            Tag::ScreenSize => TagSet::SCREEN_SIZE,
            Tag::ReleaseGroup => TagSet::RELEASE_GROUP,
            Tag::Container => TagSet::CONTAINER,
            Tag::Language => TagSet::LANGUAGE,
        }
    }
}

bitflags::bitflags! {
    /// Set of primary tags.
    ///
    /// Used by any-of predicates and by the hole transparency policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagSet: u16 {
        const TITLE             = 1 << 0;
        const EPISODE_TITLE     = 1 << 1;
        const ALTERNATIVE_TITLE = 1 << 2;
        const EPISODE_NUMBER    = 1 << 3;
        const EPISODE_COUNT     = 1 << 4;
        const EPISODE_DETAILS   = 1 << 5;
        const SEASON            = 1 << 6;
        const SEASON_COUNT      = 1 << 7;
        const DATE              = 1 << 8;
        const CRC32             = 1 << 9;
        const YEAR              = 1 << 10;
        const SCREEN_SIZE       = 1 << 11;
        const RELEASE_GROUP     = 1 << 12;
        const CONTAINER         = 1 << 13;
        const LANGUAGE          = 1 << 14;
    }
}

bitflags::bitflags! {
    /// Secondary marker tags carried by a match in addition to its primary tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuxTags: u8 {
        /// Stamped on spans produced by a title rule: the upstream title
        /// extractor's main titles and the positional episode-title rule's
        /// output. Chain adjacency checks key on it.
        const TITLE = 1 << 0;
    }
}

// --- Matches and holes -------------------------------------------------------

/// A tagged span over the normalized file name.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub tag: Tag,
    /// Extracted, possibly formatted, string content.
    pub value: String,
    pub span: Span,
    /// Secondary marker tags; empty for most spans.
    pub aux: AuxTags,
}

impl Match {
    pub fn new(tag: Tag, value: impl Into<String>, span: Span) -> Self {
        Match { tag, value: value.into(), span, aux: AuxTags::empty() }
    }

    /// Attach secondary marker tags.
    pub fn with_aux(mut self, aux: AuxTags) -> Self {
        self.aux = aux;
        self
    }
}

/// A maximal unmatched sub-range of a path segment, separator-trimmed at both
/// ends, with its formatted value. The substrate new title spans are carved
/// from.
#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub span: Span,
    pub value: String,
}

// --- Predicates --------------------------------------------------------------

/// Typed predicate evaluated by the query surface.
///
/// A closed set instead of caller-supplied closures keeps rule definitions
/// declarative and lets each variant be tested in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pred {
    /// Primary tag equals.
    Tag(Tag),
    /// Primary tag is any of the set.
    AnyTag(TagSet),
    /// Carries at least one of these secondary marker tags.
    Marked(AuxTags),
}

impl Pred {
    pub fn matches(self, m: &Match) -> bool {
        match self {
            Pred::Tag(tag) => m.tag == tag,
            Pred::AnyTag(set) => set.contains(m.tag.set()),
            Pred::Marked(aux) => m.aux.intersects(aux),
        }
    }
}

// --- Mutations ---------------------------------------------------------------

/// A single planned change to the match collection.
///
/// Rules return these from [`Rule::plan`]; the executor applies a whole plan
/// before the next rule runs, so no rule ever observes a half-applied plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a new match at its ordered position.
    Append(Match),
    /// Replace the tag of the match identified by `(span, from)`, preserving
    /// span and value. Observably identical to remove-then-append with the new
    /// tag, with no window where both entries are visible.
    Relabel { span: Span, from: Tag, to: Tag },
    /// Delete the match identified by `(span, tag)`.
    Remove { span: Span, tag: Tag },
}

// --- Rules -------------------------------------------------------------------

/// A disambiguation rule.
///
/// Rules are stateless. `plan` inspects the collection and returns the
/// mutations it would make; an empty plan means "not applicable", never an
/// error. Execution order is derived from [`Rule::dependencies`] by the
/// engine's rule graph, not from registration order.
pub trait Rule: Send + Sync {
    /// Stable rule name; also the identifier dependency edges refer to.
    fn name(&self) -> &'static str;

    /// Names of rules that must run before this one.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Compute the mutations this rule would apply to `matches`.
    fn plan(&self, matches: &Matches) -> Vec<Mutation>;
}
