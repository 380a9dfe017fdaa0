//! Transform Context - side tables written by rewrite passes
//!
//! Nodes never change after parsing. Everything a pass wants to change is
//! recorded here, keyed by node identity or source range, and consulted by
//! the `Printer` while it walks the tree:
//!
//! - synthesized leading / trailing comments per node
//! - replacements of original comment text (by source range)
//! - statement directives (`Unwrap`)
//! - synthesized statements emitted before a container's children

use closurize_ast::NodeIndex;
use closurize_common::comments::CommentKind;
use closurize_common::jsdoc::{self, Tag};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// A comment that exists only in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedComment {
    pub kind: CommentKind,
    /// Comment text without the `/*` `*/` (or `//`) delimiters.
    pub text: String,
    /// Put the annotated code on the next line.
    pub has_trailing_newline: bool,
}

impl SynthesizedComment {
    pub fn multi_line(text: impl Into<String>, has_trailing_newline: bool) -> Self {
        SynthesizedComment {
            kind: CommentKind::MultiLine,
            text: text.into(),
            has_trailing_newline,
        }
    }

    /// A `/** ... */` comment carrying the given tags.
    pub fn jsdoc(tags: &[Tag], has_trailing_newline: bool) -> Self {
        Self::multi_line(jsdoc::serialize_synthesized(tags), has_trailing_newline)
    }

    /// The comment with its delimiters.
    pub fn to_source(&self) -> String {
        match self.kind {
            CommentKind::MultiLine => format!("/*{}*/", self.text),
            CommentKind::SingleLine => format!("//{}", self.text),
        }
    }
}

/// How the printer should emit a node instead of its literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformDirective {
    /// Emit the listed descendant statements, in order, in place of the node.
    Unwrap { statements: Vec<NodeIndex> },
}

#[derive(Debug, Default)]
pub struct TransformContext {
    leading_comments: FxHashMap<NodeIndex, Vec<SynthesizedComment>>,
    trailing_comments: FxHashMap<NodeIndex, Vec<SynthesizedComment>>,
    /// Replacement text keyed by the replaced source range `(pos, end)`.
    text_edits: BTreeMap<(u32, u32), String>,
    directives: FxHashMap<NodeIndex, TransformDirective>,
    prepended: FxHashMap<NodeIndex, Vec<NodeIndex>>,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.leading_comments.is_empty()
            && self.trailing_comments.is_empty()
            && self.text_edits.is_empty()
            && self.directives.is_empty()
            && self.prepended.is_empty()
    }

    // =========================================================================
    // Synthesized comments
    // =========================================================================

    pub fn leading_comments(&self, node: NodeIndex) -> &[SynthesizedComment] {
        self.leading_comments.get(&node).map_or(&[], Vec::as_slice)
    }

    pub fn leading_comments_mut(&mut self, node: NodeIndex) -> &mut Vec<SynthesizedComment> {
        self.leading_comments.entry(node).or_default()
    }

    pub fn add_leading_comment(&mut self, node: NodeIndex, comment: SynthesizedComment) {
        self.leading_comments.entry(node).or_default().push(comment);
    }

    pub fn trailing_comments(&self, node: NodeIndex) -> &[SynthesizedComment] {
        self.trailing_comments.get(&node).map_or(&[], Vec::as_slice)
    }

    pub fn add_trailing_comment(&mut self, node: NodeIndex, comment: SynthesizedComment) {
        self.trailing_comments.entry(node).or_default().push(comment);
    }

    // =========================================================================
    // Source text replacements
    // =========================================================================

    /// Replace the source text `pos..end` (an original comment) with `text`.
    /// Replacing the same range again overwrites the earlier replacement.
    /// Overlapping ranges are accepted here and rejected by the printer.
    pub fn replace_text(&mut self, pos: u32, end: u32, text: impl Into<String>) {
        self.text_edits.insert((pos, end), text.into());
    }

    /// Replacement recorded for exactly `pos..end`, if any.
    pub fn replacement(&self, pos: u32, end: u32) -> Option<&str> {
        self.text_edits.get(&(pos, end)).map(String::as_str)
    }

    /// All replacements, ordered by position.
    pub fn text_edits(&self) -> impl Iterator<Item = (u32, u32, &str)> {
        self.text_edits
            .iter()
            .map(|(&(pos, end), text)| (pos, end, text.as_str()))
    }

    // =========================================================================
    // Directives
    // =========================================================================

    pub fn set_directive(&mut self, node: NodeIndex, directive: TransformDirective) {
        self.directives.insert(node, directive);
    }

    pub fn directive(&self, node: NodeIndex) -> Option<&TransformDirective> {
        self.directives.get(&node)
    }

    pub fn directive_count(&self) -> usize {
        self.directives.len()
    }

    // =========================================================================
    // Synthesized statements
    // =========================================================================

    /// Emit `statement` (a synthesized node) before the children of
    /// `container`, after any statements prepended earlier.
    pub fn prepend_statement(&mut self, container: NodeIndex, statement: NodeIndex) {
        self.prepended.entry(container).or_default().push(statement);
    }

    pub fn prepended(&self, container: NodeIndex) -> &[NodeIndex] {
        self.prepended.get(&container).map_or(&[], Vec::as_slice)
    }
}
