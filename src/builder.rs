//! End-to-end playlist building.
//!
//! Wires the pieces together for one run: filter the collection down to
//! real tracks, run each configured tag parser and render its taxonomy
//! tree, then (if configured) hand the merged tag maps to the Combiner and
//! render its results as a flat tree of combined playlists.

use crate::combiner::Combiner;
use crate::error::Result;
use crate::tag_parser::{CommentTagParser, GenreTagParser, TagMap, TagParser};
use crate::taxonomy::{BuilderConfig, TaxonomyFolder};
use crate::track::Track;
use crate::tree::{GenreSplit, PlaylistTree};
use log::{info, warn};

/// Name of the flat tree holding the Combiner's playlists.
const COMBINER_TREE_NAME: &str = "Combinations";

/// Runtime knobs for one build, separate from the taxonomy document.
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    /// Delimiter splitting the genre field.
    pub genre_delimiter: String,
    /// Genre names that earn a synthetic "Pure X" tag.
    pub pure_genres: Vec<String>,
    /// Remainder bucketing mode: `"folder"`, `"playlist"`, or none.
    pub remainder: Option<String>,
    /// Disambiguation rule for genre leaves that exist both as a pure
    /// genre and as a component of another.
    pub split: GenreSplit,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            genre_delimiter: "/".to_string(),
            pure_genres: Vec::new(),
            remainder: None,
            split: GenreSplit::default(),
        }
    }
}

/// Build every configured playlist tree for one collection.
///
/// Trees come back in configuration order (genres, then my-tags), with the
/// Combiner's flat tree last. The caller owns serialization.
pub fn build(
    config: &BuilderConfig,
    tracks: &[Track],
    options: &BuilderOptions,
) -> Result<Vec<PlaylistTree>> {
    let audio: Vec<&Track> = tracks.iter().filter(|t| t.is_audio()).collect();
    if audio.len() < tracks.len() {
        info!("Skipping {} playlist-membership artifact(s)", tracks.len() - audio.len());
    }

    let mut parsers: Vec<(TagParser, &TaxonomyFolder)> = Vec::new();
    if let Some(taxonomy) = &config.genres {
        parsers.push((
            TagParser::Genre(GenreTagParser::new(
                options.genre_delimiter.clone(),
                options.pure_genres.clone(),
            )),
            taxonomy,
        ));
    }
    if let Some(taxonomy) = &config.my_tags {
        parsers.push((TagParser::Comment(CommentTagParser), taxonomy));
    }

    if parsers.is_empty() && config.combiner.is_none() {
        warn!("Nothing to build: no taxonomy and no combiner configured");
    }

    let mut trees = Vec::new();
    let mut parser_maps: Vec<TagMap> = Vec::new();

    for (parser, taxonomy) in &parsers {
        let mut tags = TagMap::collect(parser, audio.iter().copied());
        let mut tree = PlaylistTree::build(taxonomy);

        // Remainder bucketing must precede insertion so the same
        // add_tracks pass fills the Other playlists.
        if let Some(mode) = &options.remainder {
            tree.add_other(&mut tags, mode);
        }
        tree.add_tracks(&tags, &options.split);

        info!("Rendered {} tree with {} node(s)", parser.name(), tree.len());
        trees.push(tree);
        parser_maps.push(tags);
    }

    if let Some(combiner_config) = &config.combiner {
        let mut combiner = Combiner::new(combiner_config, audio.iter().copied());
        for tags in &parser_maps {
            combiner.merge_tags(tags);
        }
        combiner.resolve_playlists(&trees)?;

        let mut results = combiner.run();
        // Expression order, not map order, fixes the leaf order.
        let playlists = combiner
            .expressions()
            .iter()
            .filter_map(|expr| results.remove(expr).map(|tracks| (expr.clone(), tracks)))
            .collect::<Vec<_>>();

        info!("Combiner produced {} playlist(s)", playlists.len());
        trees.push(PlaylistTree::flat(COMBINER_TREE_NAME, playlists));
    }

    Ok(trees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(id: &str, genre: &str, comment: &str, bpm: f64) -> Track {
        Track {
            id: id.into(),
            genre: genre.into(),
            comment: comment.into(),
            bpm,
            location: format!("/music/{id}.mp3"),
            ..Track::default()
        }
    }

    fn full_config() -> BuilderConfig {
        BuilderConfig::from_value(&json!({
            "genres": {"name": "Genres", "playlists": ["Techno", "House"]},
            "my_tags": {"name": "My Tags", "playlists": ["Dark", "Melodic"]},
            "combiner": {"playlists": ["Dark & Techno"]}
        }))
        .expect("valid config")
    }

    #[test]
    fn test_build_renders_one_tree_per_parser_plus_combinations() {
        let tracks = vec![
            track("T1", "Techno", "/* Dark */", 130.0),
            track("T2", "House", "/* Melodic */", 124.0),
        ];

        let trees = build(&full_config(), &tracks, &BuilderOptions::default()).expect("build");
        let names: Vec<_> = trees.iter().map(|t| t.root().name.clone()).collect();
        assert_eq!(names, vec!["Genres", "My Tags", "Combinations"]);

        assert_eq!(trees[0].playlist_tracks("Techno").expect("Techno"), vec!["T1"]);
        assert_eq!(trees[1].playlist_tracks("Dark").expect("Dark"), vec!["T1"]);
        assert_eq!(trees[2].playlist_tracks("Dark & Techno").expect("combined"), vec!["T1"]);
    }

    #[test]
    fn test_membership_artifacts_are_excluded_everywhere() {
        let mut artifact = track("GHOST", "Techno", "", 130.0);
        artifact.location.clear();
        let tracks = vec![artifact, track("T1", "Techno", "", 130.0)];

        let trees = build(&full_config(), &tracks, &BuilderOptions::default()).expect("build");
        assert_eq!(trees[0].playlist_tracks("Techno").expect("Techno"), vec!["T1"]);
    }

    #[test]
    fn test_combiner_failure_leaves_parser_trees_intact() {
        let config = BuilderConfig::from_value(&json!({
            "genres": {"name": "Genres", "playlists": ["Techno"]},
            "combiner": {"playlists": ["Techno ~ {Missing}"]}
        }))
        .expect("valid config");
        let tracks = vec![track("T1", "Techno", "", 130.0)];

        let err = build(&config, &tracks, &BuilderOptions::default()).expect_err("must abort");
        assert!(matches!(err, crate::error::Error::UnknownSelector(_)));
    }

    #[test]
    fn test_pure_genres_and_remainder_flow_through_options() {
        let config = BuilderConfig::from_value(&json!({
            "genres": {"name": "Genres", "playlists": ["Techno"]}
        }))
        .expect("valid config");
        let tracks = vec![track("T1", "Hard Techno / Dub Techno", "", 130.0)];

        let options = BuilderOptions {
            pure_genres: vec!["Techno".into()],
            remainder: Some("folder".into()),
            ..BuilderOptions::default()
        };

        let trees = build(&config, &tracks, &options).expect("build");
        assert_eq!(
            trees[0].playlist_tracks("Pure Techno").expect("Pure Techno in the Other folder"),
            vec!["T1"]
        );
    }
}
