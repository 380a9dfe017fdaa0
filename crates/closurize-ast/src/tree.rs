//! One file's syntax tree: the node arena plus the source buffer it was
//! parsed from.

use crate::base::{FileId, NodeIndex, SYNTHETIC_POS};
use crate::node::{Node, NodeArena};
use crate::syntax_kind::SyntaxKind;
use closurize_common::comments::{self, CommentRange};
use closurize_common::limits::MAX_ORIGIN_CHAIN_DEPTH;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub file_id: FileId,
    pub file_name: String,
    pub arena: NodeArena,
    pub root: NodeIndex,
    text: Arc<str>,
    /// Synthesized node -> node it was derived from, maintained by lowering
    /// steps that replace genuine nodes.
    origins: FxHashMap<NodeIndex, NodeIndex>,
}

impl SyntaxTree {
    pub fn new(
        file_id: FileId,
        file_name: impl Into<String>,
        text: Arc<str>,
        arena: NodeArena,
        root: NodeIndex,
    ) -> SyntaxTree {
        SyntaxTree {
            file_id,
            file_name: file_name.into(),
            arena,
            root,
            text,
            origins: FxHashMap::default(),
        }
    }

    /// The full source buffer.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    /// Declaration-only files (`.d.ts`) carry no executable text.
    pub fn is_declaration_file(&self) -> bool {
        self.file_name.ends_with(".d.ts")
            || self.file_name.ends_with(".d.mts")
            || self.file_name.ends_with(".d.cts")
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.arena.get(index)
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> SyntaxKind {
        self.arena.kind(index)
    }

    /// Offset of the node's first token, after its leading trivia.
    /// Synthesized nodes report `SYNTHETIC_POS`.
    pub fn token_start(&self, index: NodeIndex) -> u32 {
        let Some(node) = self.arena.get(index) else {
            return SYNTHETIC_POS;
        };
        if node.is_synthetic() {
            return SYNTHETIC_POS;
        }
        let start = comments::skip_trivia(&self.text, node.pos as usize) as u32;
        start.min(node.end)
    }

    /// Text of a node without its leading trivia. Synthesized leaves return
    /// their own text; synthesized composites return an empty string.
    pub fn node_text(&self, index: NodeIndex) -> &str {
        let Some(node) = self.arena.get(index) else {
            return "";
        };
        if node.is_synthetic() {
            return node.text.as_deref().unwrap_or("");
        }
        let start = self.token_start(index) as usize;
        self.text.get(start..node.end as usize).unwrap_or("")
    }

    /// Identifier text, or `None` if the node is not an identifier.
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        if self.kind(index) == SyntaxKind::Identifier {
            Some(self.node_text(index))
        } else {
            None
        }
    }

    /// Statements of the source file (the end-of-file token excluded).
    pub fn statements(&self) -> Vec<NodeIndex> {
        self.arena
            .node_children(self.root)
            .filter(|&child| self.kind(child) != SyntaxKind::EndOfFileToken)
            .collect()
    }

    /// Whether a declaration carries the given modifier keyword token
    /// (`export`, `async`, `static`, ...).
    pub fn has_modifier(&self, index: NodeIndex, keyword: &str) -> bool {
        self.arena
            .children(index)
            .iter()
            .any(|&child| self.kind(child) == SyntaxKind::Token && self.node_text(child) == keyword)
    }

    /// Comments in the leading trivia of a genuine node.
    pub fn leading_comment_ranges(&self, index: NodeIndex) -> Vec<CommentRange> {
        let Some(node) = self.arena.get(index) else {
            return Vec::new();
        };
        if node.is_synthetic() {
            return Vec::new();
        }
        let start = self.token_start(index);
        comments::get_leading_comment_ranges(&self.text, node.pos as usize)
            .into_iter()
            .filter(|range| range.end <= start)
            .collect()
    }

    /// Nearest function-like ancestor-or-self.
    pub fn enclosing_function_like(&self, index: NodeIndex) -> NodeIndex {
        if self.kind(index).is_function_like() {
            return index;
        }
        self.arena
            .ancestors(index)
            .find(|&ancestor| self.kind(ancestor).is_function_like())
            .unwrap_or(NodeIndex::NONE)
    }

    /// Add a synthesized node to the arena. The node is not attached to any
    /// parent; callers wire it in through transform side tables.
    pub fn add_synthetic(
        &mut self,
        kind: SyntaxKind,
        text: Option<&str>,
        children: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.arena.add_node(Node::synthetic(kind, text, children))
    }

    /// Record that `synthesized` was derived from `original`.
    pub fn set_original(&mut self, synthesized: NodeIndex, original: NodeIndex) {
        if synthesized != original {
            self.origins.insert(synthesized, original);
        }
    }

    /// Direct origin of a node, or `NONE`.
    pub fn original_of(&self, index: NodeIndex) -> NodeIndex {
        self.origins.get(&index).copied().unwrap_or(NodeIndex::NONE)
    }

    /// Follow the origin relation to its end. Nodes with no recorded origin
    /// are their own original.
    pub fn original_node(&self, index: NodeIndex) -> NodeIndex {
        let mut current = index;
        for _ in 0..MAX_ORIGIN_CHAIN_DEPTH {
            let next = self.original_of(current);
            if next.is_none() {
                return current;
            }
            current = next;
        }
        tracing::debug!(
            file = %self.file_name,
            node = index.0,
            "origin chain exceeded depth limit"
        );
        current
    }

    pub fn origins(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.origins.iter().map(|(&k, &v)| (k, v))
    }
}
