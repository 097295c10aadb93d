//! Selector prescanning.
//!
//! Before any track is visited, every Combiner expression is scanned once
//! for `{Playlist Name}` and `[BPM/rating]` literals. Playlist names are
//! collected for later resolution against the rendered trees; numeric
//! literals are parsed into a reverse lookup from each concrete value back
//! to the bracket text that mentioned it. A second pass over the tracks
//! then registers matching ids under the original bracket literal, which
//! turns numeric selectors into ordinary tags as far as the evaluator is
//! concerned.
//!
//! Classification rule: an integer in `0..=5` is a rating, anything else
//! is a BPM. A `lo-hi` range expands inclusively and every member must
//! classify the same way; ranges that straddle both classes are rejected.
//! All parse problems here are non-fatal — they are logged and the rest of
//! the selectors keep working.

use crate::tag_parser::TagMap;
use crate::track::Track;
use lazy_static::lazy_static;
use log::error;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

lazy_static! {
    static ref PLAYLIST_LITERAL: Regex = Regex::new(r"\{[^{}]*\}").unwrap();
    static ref NUMERIC_LITERAL: Regex = Regex::new(r"\[[^\[\]]*\]").unwrap();
}

/// Whether a single integer denotes a rating or a BPM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericClass {
    Rating,
    Bpm,
}

fn classify(value: i64) -> NumericClass {
    if (0..=5).contains(&value) {
        NumericClass::Rating
    } else {
        NumericClass::Bpm
    }
}

/// Everything the prescanner learned from the configured expressions.
#[derive(Debug, Clone, Default)]
pub struct NumericSelectors {
    /// Rounded BPM value → bracket literals that include it.
    bpms: BTreeMap<i64, BTreeSet<String>>,
    /// 0–5 star rating → bracket literals that include it.
    ratings: BTreeMap<u8, BTreeSet<String>>,
    /// Playlist names referenced via `{...}`, in need of resolution.
    playlists: BTreeSet<String>,
}

impl NumericSelectors {
    /// Scan all expressions once. Never fails; malformed pieces are logged
    /// and skipped.
    #[must_use]
    pub fn prescan(expressions: &[String]) -> Self {
        let mut selectors = Self::default();

        for expression in expressions {
            for literal in PLAYLIST_LITERAL.find_iter(expression) {
                let name = literal.as_str();
                selectors.playlists.insert(name[1..name.len() - 1].trim().to_string());
            }
            for literal in NUMERIC_LITERAL.find_iter(expression) {
                selectors.parse_bracket(literal.as_str());
            }
        }

        selectors
    }

    fn parse_bracket(&mut self, literal: &str) {
        let payload = &literal[1..literal.len() - 1];

        for part in payload.split(',') {
            let part = part.trim();

            if let Ok(value) = part.parse::<i64>() {
                self.record(value, literal);
            } else if let Some((lo, hi)) = part.split_once('-') {
                let bounds = (lo.trim().parse::<i64>(), hi.trim().parse::<i64>());
                let (Ok(lo), Ok(hi)) = bounds else {
                    error!("Bad BPM or rating number range: {part}");
                    continue;
                };
                if lo > hi || classify(lo) != classify(hi) {
                    error!("Bad BPM or rating number range: {part}");
                    continue;
                }
                for value in lo..=hi {
                    self.record(value, literal);
                }
            } else {
                error!("Malformed BPM or rating filter part: {part}");
            }
        }
    }

    fn record(&mut self, value: i64, literal: &str) {
        match classify(value) {
            NumericClass::Rating => {
                self.ratings.entry(value as u8).or_default().insert(literal.to_string());
            }
            NumericClass::Bpm => {
                self.bpms.entry(value).or_default().insert(literal.to_string());
            }
        }
    }

    /// Register this track under every bracket literal its rounded BPM or
    /// decoded rating satisfies, as if the literal were an ordinary tag.
    pub fn scan_track(&self, track: &Track, tags: &mut TagMap) {
        if let Some(literals) = self.bpms.get(&track.rounded_bpm()) {
            for literal in literals {
                tags.insert(literal.clone(), track.id.clone(), Vec::new());
            }
        }
        if let Some(literals) = self.ratings.get(&track.rating_stars()) {
            for literal in literals {
                tags.insert(literal.clone(), track.id.clone(), Vec::new());
            }
        }
    }

    /// Playlist names referenced by `{...}` selectors.
    #[must_use]
    pub fn playlist_names(&self) -> &BTreeSet<String> {
        &self.playlists
    }
}
