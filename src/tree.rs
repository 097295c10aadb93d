//! Rendered playlist trees.
//!
//! A [`PlaylistTree`] is built fresh for every run by walking a declarative
//! [`TaxonomyFolder`]: tag strings become leaf playlists, folder records
//! become folders with a synthesized `"All <name>"` aggregation leaf
//! (omitted only at the root), and the reserved `_ignore` folder registers
//! tag names to keep out of remainder bucketing without creating anything
//! visible.
//!
//! Nodes live in an arena and reference each other by index, so parents and
//! children can point at each other without ownership cycles. Declaration
//! order in the taxonomy fixes child order in the output, which downstream
//! consumers rely on for reproducible diffs.

use crate::tag_parser::TagMap;
use crate::taxonomy::{TaxonomyEntry, TaxonomyFolder, IGNORE_FOLDER};
use crate::track::TrackId;
use log::{debug, error};
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Folder vs leaf distinction in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    Playlist,
}

/// One rendered node. Folders own children; playlists own an ordered,
/// deduplicated list of track ids.
#[derive(Debug, Clone)]
pub struct PlaylistNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub tracks: Vec<TrackId>,
    /// Index of this folder's synthesized "All <name>" leaf, if any.
    pub all_leaf: Option<usize>,
}

impl PlaylistNode {
    fn new(name: String, kind: NodeKind, parent: Option<usize>) -> Self {
        Self { name, kind, parent, children: Vec::new(), tracks: Vec::new(), all_leaf: None }
    }
}

/// The Hip-Hop disambiguation rule, generalized to configuration.
///
/// A leaf named `leaf` sitting directly under a folder named `pure_parent`
/// is the "pure" variant: a track is inserted only when *every* tag in its
/// full tag list contains one of `substrings` case-insensitively. The same
/// leaf name anywhere else is the "component" variant: a track is inserted
/// only when *at least one* tag contains none of them. The defaults encode
/// the Hip Hop / R&B split between a top-level "Genres" placement and a
/// nested one (e.g. under "Bass").
#[derive(Debug, Clone)]
pub struct GenreSplit {
    pub leaf: String,
    pub pure_parent: String,
    pub substrings: Vec<String>,
}

impl Default for GenreSplit {
    fn default() -> Self {
        Self {
            leaf: "Hip Hop".to_string(),
            pure_parent: "Genres".to_string(),
            substrings: vec!["r&b".to_string(), "hip hop".to_string()],
        }
    }
}

impl GenreSplit {
    /// Does this tag contain any of the configured substrings?
    fn matches(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.substrings.iter().any(|needle| tag.contains(needle.to_lowercase().as_str()))
    }

    /// Decide whether a track belongs in a leaf this rule governs.
    fn admits(&self, pure_variant: bool, full_tags: &[String]) -> bool {
        if pure_variant {
            full_tags.iter().all(|tag| self.matches(tag))
        } else {
            full_tags.iter().any(|tag| !self.matches(tag))
        }
    }
}

/// A fully rendered playlist tree for one tag parser (or the Combiner).
#[derive(Debug, Clone)]
pub struct PlaylistTree {
    nodes: Vec<PlaylistNode>,
    root: usize,
    declared_tags: BTreeSet<String>,
    ignored_tags: BTreeSet<String>,
    /// (node index, track id) pairs already inserted; makes `add_tracks`
    /// idempotent across repeated calls.
    seen: BTreeSet<(usize, TrackId)>,
}

impl PlaylistTree {
    /// Render a taxonomy into an empty tree. The root folder carries the
    /// taxonomy's name and, unlike every other folder, no "All" leaf.
    ///
    /// Taxonomy validity (every entry a tag string or folder record) is
    /// already guaranteed by [`TaxonomyFolder::from_value`], so rendering
    /// cannot fail.
    #[must_use]
    pub fn build(taxonomy: &TaxonomyFolder) -> Self {
        let root = PlaylistNode::new(taxonomy.name.clone(), NodeKind::Folder, None);
        let mut tree = Self {
            nodes: vec![root],
            root: 0,
            declared_tags: BTreeSet::new(),
            ignored_tags: BTreeSet::new(),
            seen: BTreeSet::new(),
        };

        for entry in &taxonomy.playlists {
            tree.render(entry, tree.root);
        }

        tree
    }

    /// Build a flat tree of pre-evaluated playlists, one leaf per
    /// (name, tracks) pair in the given order. Used for Combiner output.
    #[must_use]
    pub fn flat<I>(name: &str, playlists: I) -> Self
    where
        I: IntoIterator<Item = (String, BTreeSet<TrackId>)>,
    {
        let root = PlaylistNode::new(name.to_string(), NodeKind::Folder, None);
        let mut tree = Self {
            nodes: vec![root],
            root: 0,
            declared_tags: BTreeSet::new(),
            ignored_tags: BTreeSet::new(),
            seen: BTreeSet::new(),
        };

        for (playlist, tracks) in playlists {
            let leaf = tree.add_node(PlaylistNode::new(playlist, NodeKind::Playlist, Some(0)));
            for track_id in tracks {
                tree.insert_track(leaf, track_id);
            }
        }

        tree
    }

    fn render(&mut self, entry: &TaxonomyEntry, parent: usize) {
        match entry {
            TaxonomyEntry::Tag(tag) => {
                self.declared_tags.insert(tag.clone());
                self.add_node(PlaylistNode::new(tag.clone(), NodeKind::Playlist, Some(parent)));
            }
            TaxonomyEntry::Folder(folder) if folder.name == IGNORE_FOLDER => {
                self.register_ignored(folder);
            }
            TaxonomyEntry::Folder(folder) => {
                let idx =
                    self.add_node(PlaylistNode::new(folder.name.clone(), NodeKind::Folder, Some(parent)));

                // Every folder below the root gets an aggregation leaf as
                // its first child.
                let all = self.add_node(PlaylistNode::new(
                    format!("All {}", folder.name),
                    NodeKind::Playlist,
                    Some(idx),
                ));
                self.nodes[idx].all_leaf = Some(all);

                for child in &folder.playlists {
                    self.render(child, idx);
                }
            }
        }
    }

    /// Register every tag name under an `_ignore` folder, recursing through
    /// nested folders, without creating any node.
    fn register_ignored(&mut self, folder: &TaxonomyFolder) {
        for entry in &folder.playlists {
            match entry {
                TaxonomyEntry::Tag(tag) => {
                    debug!("Excluding tag from remainder bucketing: {tag}");
                    self.ignored_tags.insert(tag.clone());
                }
                TaxonomyEntry::Folder(nested) => self.register_ignored(nested),
            }
        }
    }

    fn add_node(&mut self, node: PlaylistNode) -> usize {
        let idx = self.nodes.len();
        if let Some(parent) = node.parent {
            self.nodes[parent].children.push(idx);
        }
        self.nodes.push(node);
        idx
    }

    /// Insert every recorded track into its matching leaf playlists.
    ///
    /// For each leaf, the entries recorded under the leaf's name in the tag
    /// map are inserted subject to the genre-split rule, then aggregated
    /// into every ancestor folder's "All <name>" leaf. Insertion is
    /// idempotent: repeat calls with the same inputs change nothing.
    pub fn add_tracks(&mut self, tags: &TagMap, split: &GenreSplit) {
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].kind != NodeKind::Playlist {
                continue;
            }

            let name = self.nodes[idx].name.clone();
            let Some(entries) = tags.entries(&name) else { continue };
            let entries: Vec<(TrackId, Vec<String>)> =
                entries.iter().map(|(id, full)| (id.clone(), full.clone())).collect();

            let governed = name == split.leaf;
            let pure_variant = governed && self.parent_name(idx) == Some(split.pure_parent.as_str());

            for (track_id, full_tags) in entries {
                if governed && !split.admits(pure_variant, &full_tags) {
                    continue;
                }

                self.insert_track(idx, track_id.clone());

                // Ancestor aggregation; the genre-split rule applies only
                // to the originating leaf.
                let mut ancestor = self.nodes[idx].parent;
                while let Some(folder) = ancestor {
                    if let Some(all) = self.nodes[folder].all_leaf {
                        self.insert_track(all, track_id.clone());
                    }
                    ancestor = self.nodes[folder].parent;
                }
            }
        }
    }

    fn insert_track(&mut self, idx: usize, track_id: TrackId) {
        if self.seen.insert((idx, track_id.clone())) {
            self.nodes[idx].tracks.push(track_id);
        }
    }

    /// Bucket produced tags the taxonomy never declared.
    ///
    /// Mode `"folder"` creates an "Other" folder with one leaf per leftover
    /// tag; `"playlist"` creates a single "Other" leaf and registers the
    /// union of leftover entries under an "Other" key in the tag map, so
    /// the normal `add_tracks` pass fills it. Any other mode is logged and
    /// skipped. Call before `add_tracks`.
    pub fn add_other(&mut self, tags: &mut TagMap, mode: &str) {
        let leftovers: Vec<String> = tags
            .tags()
            .filter(|tag| {
                !tag.is_empty()
                    && !self.declared_tags.contains(*tag)
                    && !self.ignored_tags.contains(*tag)
            })
            .map(str::to_string)
            .collect();

        if leftovers.is_empty() {
            return;
        }

        match mode {
            "folder" => {
                let folder =
                    self.add_node(PlaylistNode::new("Other".to_string(), NodeKind::Folder, Some(self.root)));
                let all = self.add_node(PlaylistNode::new(
                    "All Other".to_string(),
                    NodeKind::Playlist,
                    Some(folder),
                ));
                self.nodes[folder].all_leaf = Some(all);

                for tag in leftovers {
                    self.add_node(PlaylistNode::new(tag.clone(), NodeKind::Playlist, Some(folder)));
                    self.declared_tags.insert(tag);
                }
            }
            "playlist" => {
                self.add_node(PlaylistNode::new("Other".to_string(), NodeKind::Playlist, Some(self.root)));
                self.declared_tags.insert("Other".to_string());

                // "Other" becomes an ordinary tag holding the union of all
                // leftover entries.
                for tag in leftovers {
                    let entries: Vec<(TrackId, Vec<String>)> = tags
                        .entries(&tag)
                        .map(|e| e.iter().map(|(id, full)| (id.clone(), full.clone())).collect())
                        .unwrap_or_default();
                    for (track_id, full_tags) in entries {
                        tags.insert("Other".to_string(), track_id, full_tags);
                    }
                }
            }
            other => {
                error!("Invalid remainder mode {other:?}; skipping remainder bucketing");
            }
        }
    }

    /// Track ids directly under the first playlist leaf with this exact
    /// name, in insertion order. `None` if no such playlist exists.
    #[must_use]
    pub fn playlist_tracks(&self, name: &str) -> Option<Vec<TrackId>> {
        self.nodes
            .iter()
            .find(|node| node.kind == NodeKind::Playlist && node.name == name)
            .map(|node| node.tracks.clone())
    }

    #[must_use]
    pub fn root(&self) -> &PlaylistNode {
        &self.nodes[self.root]
    }

    #[must_use]
    pub fn node(&self, idx: usize) -> &PlaylistNode {
        &self.nodes[idx]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn parent_name(&self, idx: usize) -> Option<&str> {
        self.nodes[idx].parent.map(|p| self.nodes[p].name.as_str())
    }

    /// Render the tree to the JSON document shape: folders carry a
    /// `playlists` array, leaves carry a `tracks` array of id references.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.node_to_value(self.root)
    }

    fn node_to_value(&self, idx: usize) -> Value {
        let node = &self.nodes[idx];
        match node.kind {
            NodeKind::Folder => json!({
                "name": node.name,
                "kind": "folder",
                "playlists": node.children.iter().map(|&c| self.node_to_value(c)).collect::<Vec<_>>(),
            }),
            NodeKind::Playlist => json!({
                "name": node.name,
                "kind": "playlist",
                "tracks": node.tracks,
            }),
        }
    }
}
