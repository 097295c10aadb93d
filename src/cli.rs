//! Command-line interface definitions.
//!
//! Clap derive keeps argument parsing declarative; `main.rs` routes each
//! subcommand to the library. The library itself never touches the CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main application arguments.
#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Curator: tag-driven playlists for DJ collections")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build playlist trees from a collection and a taxonomy config
    ///
    /// Reads the collection document and the playlist configuration, runs
    /// every configured tag parser plus the Combiner, and writes the
    /// rendered playlist document as JSON.
    Build {
        /// Path to the collection document (JSON)
        collection: PathBuf,

        /// Path to the playlist configuration (JSON)
        config: PathBuf,

        /// Write the rendered document here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Delimiter splitting the genre field
        #[arg(long, default_value = "/")]
        genre_delimiter: String,

        /// Genre names that earn a synthetic "Pure X" tag when a track is
        /// that genre and nothing else (repeatable)
        #[arg(long = "pure")]
        pure_genres: Vec<String>,

        /// Bucket tags the taxonomy never declared: "folder" creates one
        /// playlist per leftover tag under an Other folder, "playlist"
        /// creates a single Other playlist
        #[arg(long)]
        remainder: Option<String>,
    },

    /// Show the tags each parser derives for every track
    ///
    /// The debugging surface: prints one line per real track with its
    /// genre-derived and comment-derived tags.
    Tags {
        /// Path to the collection document (JSON)
        collection: PathBuf,

        /// Delimiter splitting the genre field
        #[arg(long, default_value = "/")]
        genre_delimiter: String,

        /// Genre names that earn a synthetic "Pure X" tag (repeatable)
        #[arg(long = "pure")]
        pure_genres: Vec<String>,
    },
}
