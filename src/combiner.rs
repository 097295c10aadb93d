//! The Combiner: boolean-expression playlists over tags, playlists and
//! numeric selectors.
//!
//! Lifecycle per run: construct with the configured expressions and the
//! track iterable (prescanning numeric selectors and registering matching
//! tracks), merge in every tag parser's map, resolve `{Playlist Name}`
//! selectors against the trees the parsers just rendered, then evaluate
//! each expression. The instance is discarded after the run.

use crate::error::{Error, Result};
use crate::expression::{self, PlaylistSets};
use crate::prescan::NumericSelectors;
use crate::tag_parser::TagMap;
use crate::taxonomy::CombinerConfig;
use crate::track::{Track, TrackId};
use crate::tree::PlaylistTree;
use log::{debug, error};
use std::collections::{BTreeMap, BTreeSet};

/// One Combiner run's state: expressions, the merged tag → tracks map, and
/// the resolved playlist selector sets.
#[derive(Debug, Default)]
pub struct Combiner {
    expressions: Vec<String>,
    tags: TagMap,
    selectors: NumericSelectors,
    playlists: PlaylistSets,
}

impl Combiner {
    /// Prescan the configured expressions and visit every track once,
    /// registering numeric selector matches as ordinary tags.
    pub fn new<'a>(config: &CombinerConfig, tracks: impl IntoIterator<Item = &'a Track>) -> Self {
        let selectors = NumericSelectors::prescan(&config.playlists);

        let mut tags = TagMap::default();
        for track in tracks {
            selectors.scan_track(track, &mut tags);
        }

        Self {
            expressions: config.playlists.clone(),
            tags,
            selectors,
            playlists: PlaylistSets::new(),
        }
    }

    /// Union a tag parser's map into the merged map.
    pub fn merge_tags(&mut self, tags: &TagMap) {
        self.tags.merge(tags);
    }

    /// Resolve every referenced `{Playlist Name}` against the rendered
    /// trees, first match in tree order. Runs after the parser trees are
    /// fully populated, since selectors usually name playlists this run
    /// just synthesized. A missing name aborts the whole Combiner run.
    pub fn resolve_playlists(&mut self, trees: &[PlaylistTree]) -> Result<()> {
        let mut resolved = PlaylistSets::new();
        for name in self.selectors.playlist_names() {
            let tracks = trees
                .iter()
                .find_map(|tree| tree.playlist_tracks(name))
                .ok_or_else(|| Error::UnknownSelector(name.clone()))?;

            debug!("Resolved playlist selector {{{name}}} to {} track(s)", tracks.len());
            resolved.insert(name.clone(), tracks.into_iter().collect());
        }
        self.playlists = resolved;
        Ok(())
    }

    /// Evaluate every expression in declared order.
    ///
    /// A malformed expression is fatal to itself only: it is logged and
    /// skipped, and its siblings still evaluate.
    #[must_use]
    pub fn run(&self) -> BTreeMap<String, BTreeSet<TrackId>> {
        let mut results = BTreeMap::new();

        for expression in &self.expressions {
            match expression::evaluate(expression, &self.tags, &self.playlists) {
                Ok(tracks) => {
                    debug!("Combined playlist {expression:?}: {} track(s)", tracks.len());
                    results.insert(expression.clone(), tracks);
                }
                Err(e) => {
                    error!("Skipping combined playlist {expression:?}: {e}");
                }
            }
        }

        results
    }

    /// The expressions this run evaluates, in declared order.
    #[must_use]
    pub fn expressions(&self) -> &[String] {
        &self.expressions
    }

    /// The merged tag → tracks map accumulated for this run.
    #[must_use]
    pub fn tags(&self) -> &TagMap {
        &self.tags
    }
}
