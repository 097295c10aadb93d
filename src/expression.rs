//! Boolean expression evaluation over tag → track-id sets.
//!
//! Expressions combine selectors with `&` (intersection), `|` (union) and
//! `~` (difference), grouped by parentheses. A single left-to-right scan
//! builds one evaluation context per parenthesis level; each context is
//! reduced when its closing parenthesis (or the end of the string) is
//! reached.
//!
//! There is deliberately **no operator precedence**: operators within one
//! parenthesis level apply in the order they were written, so
//! `A & B | C` means `(A & B) | C`. Expressions that need and-before-or
//! must parenthesize explicitly. Changing this would silently alter the
//! meaning of every existing expression, so it stays.
//!
//! Evaluation contexts form a parent-pointing tree; they live in an arena
//! indexed by `usize` to avoid ownership cycles.

use crate::error::{Error, Result};
use crate::tag_parser::TagMap;
use crate::track::TrackId;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Track-id sets pre-resolved for `{Playlist Name}` selectors.
pub type PlaylistSets = BTreeMap<String, BTreeSet<TrackId>>;

/// The three set operators, in the glyphs expressions use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Intersect,
    Union,
    Difference,
}

impl Op {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '&' => Some(Op::Intersect),
            '|' => Some(Op::Union),
            '~' => Some(Op::Difference),
            _ => None,
        }
    }

    fn apply(self, left: &BTreeSet<TrackId>, right: &BTreeSet<TrackId>) -> BTreeSet<TrackId> {
        match self {
            Op::Intersect => left.intersection(right).cloned().collect(),
            Op::Union => left.union(right).cloned().collect(),
            Op::Difference => left.difference(right).cloned().collect(),
        }
    }
}

/// An expression operand, classified once from its token shape instead of
/// re-inspected at every lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Plain tag: direct map lookup, empty set when unknown.
    Tag(String),
    /// Token containing `*`: matched as a pattern over all tag keys.
    Wildcard(String),
    /// `{Playlist Name}`: resolved against this run's rendered trees.
    Playlist(String),
    /// `[BPM/rating literal]`: looked up under the original bracket text,
    /// which the prescanner registered as an ordinary tag.
    Numeric(String),
}

impl Selector {
    /// Classify one trimmed literal token.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        if token.contains('*') {
            Selector::Wildcard(token.to_string())
        } else if token.starts_with('{') && token.ends_with('}') {
            Selector::Playlist(token[1..token.len() - 1].trim().to_string())
        } else if token.starts_with('[') && token.ends_with(']') {
            Selector::Numeric(token.to_string())
        } else {
            Selector::Tag(token.to_string())
        }
    }

    fn resolve(&self, tags: &TagMap, playlists: &PlaylistSets) -> Result<BTreeSet<TrackId>> {
        match self {
            Selector::Tag(tag) => Ok(tags.tracks(tag)),
            Selector::Numeric(literal) => Ok(tags.tracks(literal)),
            Selector::Playlist(name) => playlists
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnknownSelector(name.clone())),
            Selector::Wildcard(raw) => {
                let pattern = raw.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
                let matcher = Regex::new(&pattern)
                    .map_err(|e| Error::MalformedExpression(format!("bad wildcard {raw:?}: {e}")))?;

                let mut union = BTreeSet::new();
                for tag in tags.tags() {
                    // Search, not full match: "*House" hits "Acid House".
                    if matcher.is_match(tag) {
                        union.extend(tags.tracks(tag));
                    }
                }
                Ok(union)
            }
        }
    }
}

/// Evaluation context for one parenthesis level.
#[derive(Debug, Default)]
struct BoolNode {
    parent: Option<usize>,
    operators: Vec<Op>,
    selectors: Vec<Selector>,
    tracks: Vec<BTreeSet<TrackId>>,
}

impl BoolNode {
    fn new(parent: Option<usize>) -> Self {
        Self { parent, ..Self::default() }
    }

    fn flush(&mut self, buffer: &mut String) {
        let token = buffer.trim();
        if !token.is_empty() {
            self.selectors.push(Selector::parse(token));
        }
        buffer.clear();
    }

    /// Consume one operand: reduced track sets first, pending selectors
    /// second. The invariant check in `reduce` guarantees one is available.
    fn take_operand(&mut self, tags: &TagMap, playlists: &PlaylistSets) -> Result<BTreeSet<TrackId>> {
        if self.tracks.is_empty() {
            self.selectors.remove(0).resolve(tags, playlists)
        } else {
            Ok(self.tracks.remove(0))
        }
    }

    fn reduce(
        &mut self,
        expression: &str,
        tags: &TagMap,
        playlists: &PlaylistSets,
    ) -> Result<BTreeSet<TrackId>> {
        let operands = self.selectors.len() + self.tracks.len();
        if operands == 0 && self.operators.is_empty() {
            return Ok(BTreeSet::new());
        }
        if self.operators.len() + 1 != operands {
            return Err(Error::MalformedExpression(format!(
                "{} operator(s) against {} operand(s) in {expression:?}",
                self.operators.len(),
                operands,
            )));
        }

        while !self.operators.is_empty() {
            let op = self.operators.remove(0);
            let left = self.take_operand(tags, playlists)?;
            let right = self.take_operand(tags, playlists)?;
            self.tracks.insert(0, op.apply(&left, &right));
        }

        if self.tracks.is_empty() {
            self.selectors.remove(0).resolve(tags, playlists)
        } else {
            Ok(self.tracks.remove(0))
        }
    }
}

/// Evaluate one expression against the merged tag map and the pre-resolved
/// playlist selector sets.
pub fn evaluate(
    expression: &str,
    tags: &TagMap,
    playlists: &PlaylistSets,
) -> Result<BTreeSet<TrackId>> {
    let mut arena = vec![BoolNode::new(None)];
    let mut current = 0;
    let mut buffer = String::new();

    for c in expression.chars() {
        if c == '(' {
            let child = arena.len();
            arena.push(BoolNode::new(Some(current)));
            current = child;
        } else if c == ')' {
            arena[current].flush(&mut buffer);
            let value = arena[current].reduce(expression, tags, playlists)?;
            current = arena[current].parent.ok_or_else(|| {
                Error::MalformedExpression(format!("unbalanced ')' in {expression:?}"))
            })?;
            arena[current].tracks.push(value);
        } else if let Some(op) = Op::from_char(c) {
            arena[current].flush(&mut buffer);
            arena[current].operators.push(op);
        } else {
            buffer.push(c);
        }
    }

    arena[current].flush(&mut buffer);
    if arena[current].parent.is_some() {
        return Err(Error::MalformedExpression(format!("unbalanced '(' in {expression:?}")));
    }
    arena[current].reduce(expression, tags, playlists)
}
