//! # Curator - tag-driven playlists for DJ collections
//!
//! Derives playlists from per-track tags (genre labels and embedded
//! "My Tags" annotations), organizes them into a configured taxonomy of
//! folders, and evaluates boolean-algebra expressions over tags, playlists,
//! BPM ranges and rating ranges into combined playlists.
//!
//! ## Usage
//!
//! ```bash
//! # Render the playlist document for a collection
//! curator build collection.json playlists.json --output rendered.json
//!
//! # With pure-genre synthesis and remainder bucketing
//! curator build collection.json playlists.json --pure Techno --pure House --remainder folder
//!
//! # Inspect the tags parsers derive per track
//! curator tags collection.json
//! ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use curator::builder::{self, BuilderOptions};
use curator::tag_parser::{CommentTagParser, GenreTagParser, TagParser};
use curator::taxonomy::BuilderConfig;
use curator::track::Collection;
use curator::tree::GenreSplit;
use log::info;
use serde_json::json;
use std::fs;
use std::path::Path;

/// Entry point: initialize logging (controlled via `RUST_LOG`), parse
/// arguments, route to the library.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Build {
            collection,
            config,
            output,
            genre_delimiter,
            pure_genres,
            remainder,
        } => {
            let collection = load_collection(&collection)?;
            let config = BuilderConfig::load(&config)
                .with_context(|| format!("Failed to load playlist config from {}", config.display()))?;

            let options = BuilderOptions {
                genre_delimiter,
                pure_genres,
                remainder,
                split: GenreSplit::default(),
            };

            let trees = builder::build(&config, &collection.tracks, &options)?;
            let document = json!({
                "playlists": trees.iter().map(curator::tree::PlaylistTree::to_value).collect::<Vec<_>>(),
            });
            let rendered = serde_json::to_string_pretty(&document)?;

            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote rendered playlist document to {}", path.display());
                }
                None => println!("{rendered}"),
            }
        }
        cli::Command::Tags { collection, genre_delimiter, pure_genres } => {
            let collection = load_collection(&collection)?;
            let parsers = [
                TagParser::Genre(GenreTagParser::new(genre_delimiter, pure_genres)),
                TagParser::Comment(CommentTagParser),
            ];

            for track in collection.audio_tracks() {
                for parser in &parsers {
                    let tags = parser.tags_for(track);
                    println!("{}\t{}\t{}", track.id, parser.name(), tags.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn load_collection(path: &Path) -> Result<Collection> {
    let collection = Collection::load(path)
        .with_context(|| format!("Failed to load collection from {}", path.display()))?;
    info!("Loaded {} track record(s)", collection.tracks.len());
    Ok(collection)
}
