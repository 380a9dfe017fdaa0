//! Nodes and the per-file node arena.
//!
//! Ownership runs one way: a parent lists its children, and each child
//! records its parent as a plain `NodeIndex` back-reference used only for
//! ancestor queries.

use crate::base::{NodeIndex, SYNTHETIC_POS};
use crate::syntax_kind::SyntaxKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: SyntaxKind,
    /// Full start, including leading trivia (`SYNTHETIC_POS` if synthesized).
    pub pos: u32,
    /// End position, exclusive (`SYNTHETIC_POS` if synthesized).
    pub end: u32,
    #[serde(default)]
    pub children: Vec<NodeIndex>,
    #[serde(skip, default = "parent_none")]
    pub parent: NodeIndex,
    /// Text of synthesized leaves. Genuine nodes read their text from the
    /// source buffer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Box<str>>,
}

fn parent_none() -> NodeIndex {
    NodeIndex::NONE
}

impl Node {
    /// Create a genuine node covering `pos..end`.
    pub fn new(kind: SyntaxKind, pos: u32, end: u32, children: Vec<NodeIndex>) -> Node {
        Node {
            kind,
            pos,
            end,
            children,
            parent: NodeIndex::NONE,
            text: None,
        }
    }

    /// Create a synthesized node with no source range.
    pub fn synthetic(kind: SyntaxKind, text: Option<&str>, children: Vec<NodeIndex>) -> Node {
        Node {
            kind,
            pos: SYNTHETIC_POS,
            end: SYNTHETIC_POS,
            children,
            parent: NodeIndex::NONE,
            text: text.map(Into::into),
        }
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.pos == SYNTHETIC_POS
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Wrap nodes loaded from elsewhere, recomputing parent links.
    pub fn from_nodes(nodes: Vec<Node>) -> NodeArena {
        let mut arena = NodeArena { nodes };
        for index in 0..arena.nodes.len() {
            let children = arena.nodes[index].children.clone();
            arena.set_parent_of(&children, NodeIndex(index as u32));
        }
        arena
    }

    /// Add a node and point its children back at it.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        let children = node.children.clone();
        self.nodes.push(node);
        self.set_parent_of(&children, index);
        index
    }

    fn set_parent_of(&mut self, children: &[NodeIndex], parent: NodeIndex) {
        for child in children {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = parent;
            }
        }
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Kind of a node, `Unknown` for `NONE` or out-of-range indices.
    #[inline]
    pub fn kind(&self, index: NodeIndex) -> SyntaxKind {
        self.get(index).map_or(SyntaxKind::Unknown, |n| n.kind)
    }

    #[inline]
    pub fn is_synthetic(&self, index: NodeIndex) -> bool {
        self.get(index).is_some_and(Node::is_synthetic)
    }

    /// All children, tokens included.
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        match self.get(index) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Children that are not `Token` leaves, i.e. the node's meaningful shape.
    pub fn node_children(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.children(index)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) != SyntaxKind::Token)
    }

    /// The `n`th meaningful child, or `NONE`.
    pub fn nth_node_child(&self, index: NodeIndex, n: usize) -> NodeIndex {
        self.node_children(index).nth(n).unwrap_or(NodeIndex::NONE)
    }

    /// The first meaningful child of the given kind, or `NONE`.
    pub fn child_of_kind(&self, index: NodeIndex, kind: SyntaxKind) -> NodeIndex {
        self.node_children(index)
            .find(|&child| self.kind(child) == kind)
            .unwrap_or(NodeIndex::NONE)
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.parent)
    }

    /// Walk the parent chain, nearest ancestor first.
    pub fn ancestors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(Some(self.parent(index)), move |&current| Some(self.parent(current)))
            .take_while(|index| index.is_some())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate all node indices in allocation order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len() as u32).map(NodeIndex)
    }
}
