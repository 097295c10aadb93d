//! Tag derivation from track fields.
//!
//! A tag parser is a stateless function from a track to a list of string
//! tags. Two variants exist and the set is closed, so they live in one
//! enum rather than behind a trait object:
//!
//! - [`GenreTagParser`] splits the genre field and synthesizes `"Pure X"`
//!   tags for configured pure genre names.
//! - [`CommentTagParser`] extracts the bracketed tag list embedded in the
//!   free-text comment field.
//!
//! Parser output is accumulated into a [`TagMap`], the many-to-many
//! tag ↔ track relation every later stage (tree population, boolean
//! evaluation) operates on.

use crate::track::{Track, TrackId};
use std::collections::{BTreeMap, BTreeSet};

/// Markers delimiting the embedded tag list in a comment field.
const COMMENT_TAGS_OPEN: &str = "/*";
const COMMENT_TAGS_CLOSE: &str = "*/";

/// Closed union of tag parser variants.
#[derive(Debug, Clone)]
pub enum TagParser {
    Genre(GenreTagParser),
    Comment(CommentTagParser),
}

impl TagParser {
    /// Derive the tags for one track. Pure function of the track.
    #[must_use]
    pub fn tags_for(&self, track: &Track) -> Vec<String> {
        match self {
            TagParser::Genre(parser) => parser.tags_for(track),
            TagParser::Comment(parser) => parser.tags_for(track),
        }
    }

    /// Human-readable parser name, used in logs and the `tags` subcommand.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TagParser::Genre(_) => "genres",
            TagParser::Comment(_) => "my-tags",
        }
    }
}

/// Splits the genre field on a configured delimiter.
///
/// For each configured pure genre name `X`, a synthetic `"Pure X"` tag is
/// appended when every split segment contains `X` case-insensitively —
/// i.e. the track is that genre and nothing else.
#[derive(Debug, Clone)]
pub struct GenreTagParser {
    delimiter: String,
    pure_genres: Vec<String>,
}

impl GenreTagParser {
    #[must_use]
    pub fn new(delimiter: impl Into<String>, pure_genres: Vec<String>) -> Self {
        Self { delimiter: delimiter.into(), pure_genres }
    }

    fn tags_for(&self, track: &Track) -> Vec<String> {
        // An empty genre field yields one empty-string tag; callers
        // tolerate it (no taxonomy leaf is named "").
        let mut tags: Vec<String> = track
            .genre
            .split(&self.delimiter)
            .map(|tag| tag.trim().to_string())
            .collect();

        for pure in &self.pure_genres {
            let needle = pure.to_lowercase();
            if tags.iter().all(|tag| tag.to_lowercase().contains(&needle)) {
                tags.push(format!("Pure {pure}"));
            }
        }

        tags
    }
}

/// Extracts the tag list embedded between `/*` and `*/` in the comment
/// field. No markers means no tags.
#[derive(Debug, Clone, Default)]
pub struct CommentTagParser;

impl CommentTagParser {
    fn tags_for(&self, track: &Track) -> Vec<String> {
        let Some(open) = track.comment.find(COMMENT_TAGS_OPEN) else {
            return Vec::new();
        };
        let span = &track.comment[open + COMMENT_TAGS_OPEN.len()..];
        let Some(close) = span.find(COMMENT_TAGS_CLOSE) else {
            return Vec::new();
        };

        span[..close].split('/').map(|tag| tag.trim().to_string()).collect()
    }
}

/// The tag → tracks relation one or more parsers produced.
///
/// For each tag, the map records every track carrying it together with the
/// track's full tag list from the run that attached it; disambiguation
/// rules in the tree builder need the whole list, not just the match.
/// BTree maps keep iteration deterministic, which fixes track order in the
/// rendered trees.
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    entries: BTreeMap<String, BTreeMap<TrackId, Vec<String>>>,
}

impl TagMap {
    /// Run a parser over every track and collect its output.
    pub fn collect<'a>(parser: &TagParser, tracks: impl IntoIterator<Item = &'a Track>) -> Self {
        let mut map = Self::default();
        for track in tracks {
            let tags = parser.tags_for(track);
            for tag in &tags {
                map.insert(tag.clone(), track.id.clone(), tags.clone());
            }
        }
        map
    }

    /// Record one (tag, track) pair with the track's full tag list.
    pub fn insert(&mut self, tag: String, track_id: TrackId, full_tags: Vec<String>) {
        self.entries.entry(tag).or_default().entry(track_id).or_insert(full_tags);
    }

    /// Every track id recorded under `tag`, empty set if unknown.
    #[must_use]
    pub fn tracks(&self, tag: &str) -> BTreeSet<TrackId> {
        self.entries
            .get(tag)
            .map(|tracks| tracks.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The (track id, full tag list) entries recorded under `tag`.
    #[must_use]
    pub fn entries(&self, tag: &str) -> Option<&BTreeMap<TrackId, Vec<String>>> {
        self.entries.get(tag)
    }

    /// All tag names in the map, in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union another map into this one. On a (tag, track) collision the
    /// existing full tag list wins.
    pub fn merge(&mut self, other: &TagMap) {
        for (tag, tracks) in &other.entries {
            let entry = self.entries.entry(tag.clone()).or_default();
            for (track_id, full_tags) in tracks {
                entry.entry(track_id.clone()).or_insert_with(|| full_tags.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_with_genre(id: &str, genre: &str) -> Track {
        Track { id: id.into(), genre: genre.into(), location: "/music/x.mp3".into(), ..Track::default() }
    }

    #[test]
    fn test_genre_parser_splits_and_trims() {
        let parser = GenreTagParser::new("/", vec![]);
        let track = track_with_genre("1", "Techno / Acid House /Breaks");
        assert_eq!(parser.tags_for(&track), vec!["Techno", "Acid House", "Breaks"]);
    }

    #[test]
    fn test_genre_parser_empty_field_yields_one_empty_tag() {
        let parser = GenreTagParser::new("/", vec![]);
        let track = track_with_genre("1", "");
        assert_eq!(parser.tags_for(&track), vec![""]);
    }

    #[test]
    fn test_pure_tag_synthesized_when_every_segment_matches() {
        let parser = GenreTagParser::new("/", vec!["Techno".into()]);

        let pure = track_with_genre("1", "Hard Techno / Melodic techno");
        assert_eq!(
            parser.tags_for(&pure),
            vec!["Hard Techno", "Melodic techno", "Pure Techno"],
            "case-insensitive substring match across all segments"
        );

        let mixed = track_with_genre("2", "Techno / House");
        assert_eq!(
            parser.tags_for(&mixed),
            vec!["Techno", "House"],
            "one non-matching segment suppresses the Pure tag"
        );
    }

    #[test]
    fn test_comment_parser_extracts_bracketed_list() {
        let parser = CommentTagParser;
        let track = Track {
            id: "1".into(),
            comment: "great closer /* Dark / Melodic / Peak Hour */".into(),
            ..Track::default()
        };
        assert_eq!(parser.tags_for(&track), vec!["Dark", "Melodic", "Peak Hour"]);
    }

    #[test]
    fn test_comment_parser_without_markers_yields_nothing() {
        let parser = CommentTagParser;
        let no_markers = Track { id: "1".into(), comment: "just a note".into(), ..Track::default() };
        assert!(parser.tags_for(&no_markers).is_empty());

        let unclosed = Track { id: "2".into(), comment: "oops /* Dark".into(), ..Track::default() };
        assert!(parser.tags_for(&unclosed).is_empty());
    }

    #[test]
    fn test_tag_map_collects_many_to_many_relation() {
        let parser = TagParser::Genre(GenreTagParser::new("/", vec![]));
        let tracks = vec![
            track_with_genre("1", "Techno"),
            track_with_genre("2", "Techno / House"),
        ];

        let map = TagMap::collect(&parser, &tracks);
        assert_eq!(map.tracks("Techno"), BTreeSet::from(["1".to_string(), "2".to_string()]));
        assert_eq!(map.tracks("House"), BTreeSet::from(["2".to_string()]));
        assert!(map.tracks("Breaks").is_empty(), "unknown tags default to the empty set");

        let full = map.entries("House").expect("House entries");
        assert_eq!(full.get("2").expect("track 2"), &vec!["Techno".to_string(), "House".to_string()]);
    }

    #[test]
    fn test_merge_unions_on_key_collision() {
        let mut left = TagMap::default();
        left.insert("Dark".into(), "1".into(), vec!["Dark".into()]);

        let mut right = TagMap::default();
        right.insert("Dark".into(), "2".into(), vec!["Dark".into(), "Melodic".into()]);
        right.insert("Melodic".into(), "2".into(), vec!["Dark".into(), "Melodic".into()]);

        left.merge(&right);
        assert_eq!(left.tracks("Dark"), BTreeSet::from(["1".to_string(), "2".to_string()]));
        assert_eq!(left.tracks("Melodic"), BTreeSet::from(["2".to_string()]));
    }
}
