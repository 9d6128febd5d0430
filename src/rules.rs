//! Disambiguation rules.
//!
//! `episode_title` holds the shipped ensemble: the five rules that decide
//! which span of a tagged file name is the episode title. `positional` is the
//! generic hook-driven positional-title search the ensemble specializes; it
//! knows how to carve a title out of unmatched text but nothing about what
//! makes a hole episode-like.

pub mod episode_title;
pub mod positional;
