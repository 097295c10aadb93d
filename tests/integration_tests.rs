//! Integration tests exercising full playlist builds through the public
//! library API: collection in, rendered trees out.

use curator::builder::{self, BuilderOptions};
use curator::taxonomy::BuilderConfig;
use curator::track::{Collection, Track};
use curator::tree::PlaylistTree;
use serde_json::json;
use std::collections::BTreeSet;

fn track(id: &str, genre: &str, comment: &str, bpm: f64, rating: u8) -> Track {
    Track {
        id: id.into(),
        genre: genre.into(),
        comment: comment.into(),
        bpm,
        rating,
        location: format!("/music/{id}.mp3"),
    }
}

fn sample_collection() -> Vec<Track> {
    vec![
        track("T1", "Techno", "/* Dark / Peak Hour */", 132.0, 255),
        track("T2", "House", "/* Melodic */", 124.0, 153),
        track("T3", "Techno / House", "", 126.0, 204),
        track("T4", "Hip Hop", "", 92.0, 102),
        track("T5", "Hip Hop / Trap", "", 140.0, 51),
    ]
}

fn build(config: serde_json::Value, options: &BuilderOptions) -> Vec<PlaylistTree> {
    let config = BuilderConfig::from_value(&config).expect("valid config");
    builder::build(&config, &sample_collection(), options).expect("build succeeds")
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_genre_taxonomy_end_to_end() {
    let trees = build(
        json!({"genres": {"name": "Collection", "playlists": [
            {"name": "Genres", "playlists": ["Techno", "House"]}
        ]}}),
        &BuilderOptions::default(),
    );

    let genres = &trees[0];
    assert_eq!(genres.playlist_tracks("Techno").expect("Techno"), vec!["T1", "T3"]);
    assert_eq!(genres.playlist_tracks("House").expect("House"), vec!["T2", "T3"]);

    let all: BTreeSet<String> =
        genres.playlist_tracks("All Genres").expect("All Genres").into_iter().collect();
    assert_eq!(all, set(&["T1", "T2", "T3"]));
}

#[test]
fn test_combined_playlist_with_playlist_selector() {
    let trees = build(
        json!({
            "genres": {"name": "Genres", "playlists": ["Techno", "House", "My Favorites"]},
            "my_tags": {"name": "My Tags", "playlists": ["Dark", "Melodic"]},
            "combiner": {"playlists": ["(Techno | House) ~ {Dark}"]}
        }),
        &BuilderOptions::default(),
    );

    // {Dark} resolves to the My Tags tree's playlist: T1 only.
    let combined: BTreeSet<String> = trees
        .last()
        .expect("Combinations tree")
        .playlist_tracks("(Techno | House) ~ {Dark}")
        .expect("combined playlist")
        .into_iter()
        .collect();
    assert_eq!(combined, set(&["T2", "T3"]));
}

#[test]
fn test_combined_playlist_with_numeric_selectors() {
    let trees = build(
        json!({
            "genres": {"name": "Genres", "playlists": ["Techno", "House", "Hip Hop"]},
            "combiner": {"playlists": ["[120-130]", "[4-5]", "Techno & [132]"]}
        }),
        &BuilderOptions::default(),
    );

    let combinations = trees.last().expect("Combinations tree");
    let by_bpm: BTreeSet<String> =
        combinations.playlist_tracks("[120-130]").expect("BPM range").into_iter().collect();
    assert_eq!(by_bpm, set(&["T2", "T3"]), "124 and 126 fall inside 120-130");

    let by_rating: BTreeSet<String> =
        combinations.playlist_tracks("[4-5]").expect("rating range").into_iter().collect();
    assert_eq!(by_rating, set(&["T1", "T3"]), "255 and 204 decode to 5 and 4 stars");

    assert_eq!(
        combinations.playlist_tracks("Techno & [132]").expect("single BPM"),
        vec!["T1"]
    );
}

#[test]
fn test_hip_hop_disambiguation_end_to_end() {
    let trees = build(
        json!({"genres": {"name": "Genres", "playlists": [
            "Hip Hop",
            {"name": "Bass", "playlists": ["Hip Hop"]}
        ]}}),
        &BuilderOptions::default(),
    );

    let genres = &trees[0];
    let root = genres.root();
    let top = genres.node(root.children[0]);
    assert_eq!(top.tracks, vec!["T4"], "pure hip hop goes to the top-level leaf");

    let bass = genres.node(root.children[1]);
    let nested = genres.node(bass.children[1]);
    assert_eq!(nested.tracks, vec!["T5"], "hip hop / trap goes to the nested leaf");
}

#[test]
fn test_remainder_folder_collects_undeclared_tags() {
    let trees = build(
        json!({"my_tags": {"name": "My Tags", "playlists": [
            "Dark",
            {"name": "_ignore", "playlists": ["Peak Hour"]}
        ]}}),
        &BuilderOptions { remainder: Some("folder".into()), ..BuilderOptions::default() },
    );

    let my_tags = &trees[0];
    assert_eq!(my_tags.playlist_tracks("Dark").expect("Dark"), vec!["T1"]);
    assert_eq!(
        my_tags.playlist_tracks("Melodic").expect("Melodic lands in Other"),
        vec!["T2"]
    );
    assert!(
        my_tags.playlist_tracks("Peak Hour").is_none(),
        "_ignore keeps the tag out of the remainder bucket"
    );
}

#[test]
fn test_collection_loads_from_document_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("collection.json");
    std::fs::write(
        &path,
        r#"{"tracks": [
            {"id": "T1", "genre": "Techno", "bpm": "128.00", "rating": 255, "location": "/music/t1.mp3"},
            {"id": "GHOST", "genre": "Techno", "bpm": "128.00", "rating": 0, "location": ""}
        ]}"#,
    )
    .expect("write collection");

    let collection = Collection::load(&path).expect("load collection");
    assert_eq!(collection.tracks.len(), 2);

    let real: Vec<_> = collection.audio_tracks().map(|t| t.id.as_str()).collect();
    assert_eq!(real, vec!["T1"], "location-less records are membership artifacts");
    assert_eq!(collection.tracks[0].rounded_bpm(), 128);
    assert_eq!(collection.tracks[0].rating_stars(), 5);
}

#[test]
fn test_rebuild_from_scratch_is_reproducible() {
    let config = json!({
        "genres": {"name": "Genres", "playlists": ["Techno", "House", "Hip Hop"]},
        "my_tags": {"name": "My Tags", "playlists": ["Dark", "Melodic"]},
        "combiner": {"playlists": ["Dark & Techno", "(Techno | House) ~ {Dark}"]}
    });

    let first = build(config.clone(), &BuilderOptions::default());
    let second = build(config, &BuilderOptions::default());

    let render = |trees: &[PlaylistTree]| {
        trees.iter().map(PlaylistTree::to_value).collect::<Vec<_>>()
    };
    assert_eq!(render(&first), render(&second), "runs over the same inputs must diff clean");
}
