//! Track records and the collection document contract.
//!
//! Tracks are read-only inputs owned by the external collection document.
//! This module pins down the attribute contract the rest of the library
//! relies on: a stable identifier, a delimiter-separated genre field, a
//! free-text comment that may embed a `/* tag / tag */` list, a BPM value
//! serialized as a string, and a rating stored as one of six discrete byte
//! values.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Opaque, stable track identifier. Tracks are referenced by id everywhere
/// downstream; the record itself is never copied into playlists.
pub type TrackId = String;

/// A single track as it appears in the collection document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier, unique within the collection.
    pub id: TrackId,

    /// Delimiter-separated genre labels, e.g. `"Techno / Acid House"`.
    #[serde(default)]
    pub genre: String,

    /// Free-text annotation. A tag list may be embedded between `/*` and
    /// `*/` markers, e.g. `"great closer /* Dark / Melodic */"`.
    #[serde(default)]
    pub comment: String,

    /// Beats per minute. Serialized as a string in the document, so accept
    /// both forms.
    #[serde(default, deserialize_with = "bpm_string_or_number")]
    pub bpm: f64,

    /// Raw rating byte: one of 0, 51, 102, 153, 204, 255.
    #[serde(default)]
    pub rating: u8,

    /// Path-like location of the audio file. Empty for playlist-membership
    /// artifacts, which are not real tracks.
    #[serde(default)]
    pub location: String,
}

impl Track {
    /// BPM rounded to the nearest integer, the form numeric selectors
    /// match against.
    #[must_use]
    pub fn rounded_bpm(&self) -> i64 {
        self.bpm.round() as i64
    }

    /// Decoded 0–5 star rating.
    #[must_use]
    pub fn rating_stars(&self) -> u8 {
        decode_rating(self.rating)
    }

    /// Only tracks carrying a non-empty location are real audio tracks;
    /// everything else in the document is skipped.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        !self.location.is_empty()
    }
}

/// Map a raw rating byte to a 0–5 star level.
///
/// The document encodes ratings as 0, 51, 102, 153, 204 or 255. Stray
/// non-canonical bytes round to the nearest level rather than erroring,
/// since real collections do contain them.
#[must_use]
pub fn decode_rating(raw: u8) -> u8 {
    (f64::from(raw) / 51.0).round().min(5.0) as u8
}

fn bpm_string_or_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0.0)
            } else {
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    }
}

/// The parsed collection document: a flat list of track records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    pub tracks: Vec<Track>,
}

impl Collection {
    /// Load a collection document from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// The real audio tracks in the collection, in document order.
    pub fn audio_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.is_audio())
    }
}
