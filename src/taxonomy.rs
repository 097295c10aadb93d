//! Declarative playlist taxonomy configuration.
//!
//! The configuration document maps each tag parser to a nested
//! folder/playlist tree and optionally configures the Combiner with a flat
//! list of boolean expressions:
//!
//! ```json
//! {
//!   "genres": {
//!     "name": "Genres",
//!     "playlists": ["Techno", {"name": "Bass", "playlists": ["Breaks"]}]
//!   },
//!   "my_tags": {"name": "My Tags", "playlists": ["Dark", "Melodic"]},
//!   "combiner": {"playlists": ["(Dark & Techno) | [135-145]"]}
//! }
//! ```
//!
//! Taxonomy entries are validated here rather than left to serde's untagged
//! machinery so that a bad entry produces a targeted
//! [`Error::InvalidTaxonomy`](crate::error::Error::InvalidTaxonomy) instead
//! of an opaque "no variant matched" message.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reserved folder name whose children are registered as tags to exclude
/// from remainder bucketing without creating visible playlists.
pub const IGNORE_FOLDER: &str = "_ignore";

/// One entry in a taxonomy: either a bare tag (a leaf playlist) or a named
/// folder of further entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyEntry {
    Tag(String),
    Folder(TaxonomyFolder),
}

/// A named folder with an ordered list of children. Declaration order is
/// preserved all the way into the rendered output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyFolder {
    pub name: String,
    pub playlists: Vec<TaxonomyEntry>,
}

impl TaxonomyEntry {
    /// Parse one taxonomy entry from an already-deserialized JSON value.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(tag) => Ok(TaxonomyEntry::Tag(tag.clone())),
            Value::Object(_) => Ok(TaxonomyEntry::Folder(TaxonomyFolder::from_value(value)?)),
            other => Err(Error::InvalidTaxonomy(format!(
                "expected a tag string or a folder record, got: {other}"
            ))),
        }
    }
}

impl TaxonomyFolder {
    /// Parse a `{name, playlists}` folder record.
    pub fn from_value(value: &Value) -> Result<Self> {
        let record = value.as_object().ok_or_else(|| {
            Error::InvalidTaxonomy(format!("expected a folder record, got: {value}"))
        })?;

        let name = record
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidTaxonomy(format!("folder record missing name: {value}")))?
            .to_string();

        let playlists = record
            .get("playlists")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::InvalidTaxonomy(format!("folder {name:?} missing playlists array"))
            })?
            .iter()
            .map(TaxonomyEntry::from_value)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { name, playlists })
    }
}

/// Combiner configuration: a flat list of boolean expression strings, not
/// a tree. Each expression becomes one combined playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinerConfig {
    pub playlists: Vec<String>,
}

impl CombinerConfig {
    fn from_value(value: &Value) -> Result<Self> {
        let playlists = value
            .get("playlists")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::InvalidTaxonomy(format!("combiner record missing playlists array: {value}"))
            })?
            .iter()
            .map(|expr| {
                expr.as_str().map(str::to_string).ok_or_else(|| {
                    Error::InvalidTaxonomy(format!("combiner expression must be a string: {expr}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { playlists })
    }
}

/// The full playlist-building configuration: one optional taxonomy per tag
/// parser plus the optional Combiner section.
#[derive(Debug, Clone, Default)]
pub struct BuilderConfig {
    pub genres: Option<TaxonomyFolder>,
    pub my_tags: Option<TaxonomyFolder>,
    pub combiner: Option<CombinerConfig>,
}

impl BuilderConfig {
    /// Parse the configuration from an already-deserialized JSON document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let genres = value.get("genres").map(TaxonomyFolder::from_value).transpose()?;
        let my_tags = value.get("my_tags").map(TaxonomyFolder::from_value).transpose()?;
        let combiner = value.get("combiner").map(CombinerConfig::from_value).transpose()?;
        Ok(Self { genres, my_tags, combiner })
    }

    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_nested_folders_and_tags_in_order() {
        let value = json!({
            "name": "Genres",
            "playlists": [
                "Techno",
                {"name": "Bass", "playlists": ["Breaks", "Garage"]},
                "House"
            ]
        });

        let folder = TaxonomyFolder::from_value(&value).expect("valid taxonomy");
        assert_eq!(folder.name, "Genres");
        assert_eq!(folder.playlists.len(), 3);
        assert_eq!(folder.playlists[0], TaxonomyEntry::Tag("Techno".into()));
        match &folder.playlists[1] {
            TaxonomyEntry::Folder(bass) => {
                assert_eq!(bass.name, "Bass");
                assert_eq!(bass.playlists.len(), 2);
            }
            other => panic!("expected Bass folder, got {other:?}"),
        }
        assert_eq!(folder.playlists[2], TaxonomyEntry::Tag("House".into()));
    }

    #[test]
    fn test_non_string_non_record_entry_is_invalid() {
        let value = json!({"name": "Genres", "playlists": [42]});
        let err = TaxonomyFolder::from_value(&value).expect_err("numeric entry must fail");
        assert!(matches!(err, Error::InvalidTaxonomy(_)), "got: {err}");
    }

    #[test]
    fn test_folder_record_without_name_is_invalid() {
        let value = json!({"playlists": ["Techno"]});
        assert!(TaxonomyFolder::from_value(&value).is_err());
    }

    #[test]
    fn test_builder_config_sections_are_optional() {
        let value = json!({
            "combiner": {"playlists": ["Dark & Techno"]}
        });

        let config = BuilderConfig::from_value(&value).expect("valid config");
        assert!(config.genres.is_none());
        assert!(config.my_tags.is_none());
        let combiner = config.combiner.expect("combiner section");
        assert_eq!(combiner.playlists, vec!["Dark & Techno"]);
    }
}
