//! Tag-driven playlist generation for DJ collections.
//!
//! Core modules:
//! - [`tag_parser`] - Deriving tags from track fields (genres, embedded "My Tags")
//! - [`tree`] - Taxonomy-driven playlist trees with aggregation and remainder bucketing
//! - [`expression`] - Boolean expression evaluation over tag → track sets
//! - [`prescan`] - BPM/rating selector prescanning
//! - [`combiner`] - Orchestration of combined-playlist runs
//! - [`builder`] - End-to-end wiring from collection + config to rendered trees
//!
//! ### Supporting Modules
//!
//! - [`track`] - Track records and the collection document contract
//! - [`taxonomy`] - Declarative folder/playlist configuration
//! - [`error`] - Library error types
//!
//! ## Quick Start Example
//!
//! ```
//! use curator::builder::{self, BuilderOptions};
//! use curator::taxonomy::BuilderConfig;
//! use curator::track::Track;
//!
//! let config = BuilderConfig::from_value(&serde_json::json!({
//!     "genres": {"name": "Genres", "playlists": ["Techno", "House"]},
//!     "combiner": {"playlists": ["Techno & [120-130]"]}
//! }))?;
//!
//! let tracks = vec![Track {
//!     id: "T1".to_string(),
//!     genre: "Techno".to_string(),
//!     bpm: 128.0,
//!     location: "/music/t1.mp3".to_string(),
//!     ..Track::default()
//! }];
//!
//! let trees = builder::build(&config, &tracks, &BuilderOptions::default())?;
//! assert_eq!(trees[0].playlist_tracks("Techno").unwrap(), vec!["T1"]);
//! assert_eq!(trees[1].playlist_tracks("Techno & [120-130]").unwrap(), vec!["T1"]);
//! # Ok::<(), curator::error::Error>(())
//! ```
//!
//! ## Design
//!
//! The whole pipeline is single-threaded and deterministic: taxonomy
//! declaration order fixes folder order in the output, and boolean
//! expressions evaluate strictly left to right within each parenthesis
//! level (no operator precedence). Both orderings are contractual —
//! downstream consumers diff rendered documents across runs.
//!
//! ## Error Handling
//!
//! Library functions return [`error::Result`]. Fatal conditions (unknown
//! `{Playlist}` selectors, invalid taxonomy entries) abort the affected
//! run; recoverable ones (malformed numeric selector parts, unrecognized
//! remainder modes, malformed expressions among well-formed siblings) are
//! logged via [`log`] and skipped.

pub mod builder;
pub mod combiner;
pub mod error;
pub mod expression;
pub mod prescan;
pub mod tag_parser;
pub mod taxonomy;
pub mod track;
pub mod tree;
