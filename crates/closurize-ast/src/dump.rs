//! JSON exchange format for trees.
//!
//! The front end that parses and type-checks TypeScript writes one
//! `TreeDump` per file. Loading validates the structure so the renderer can
//! trust every index and range it sees.

use crate::base::{FileId, NodeIndex};
use crate::node::{Node, NodeArena};
use crate::tree::SyntaxTree;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDump {
    pub file_name: String,
    pub text: String,
    pub nodes: Vec<Node>,
    pub root: NodeIndex,
    /// `(synthesized, original)` pairs.
    #[serde(default)]
    pub origins: Vec<(NodeIndex, NodeIndex)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeDumpError {
    /// The root index does not name a node.
    MissingRoot { file: String },
    /// A child or origin index points outside the node list.
    DanglingIndex { file: String, node: u32, target: u32 },
    /// A node has more than one parent.
    SharedChild { file: String, child: u32 },
    /// A genuine node's range is inverted or past the end of the text.
    BadRange { file: String, node: u32, pos: u32, end: u32 },
}

impl fmt::Display for TreeDumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeDumpError::MissingRoot { file } => write!(f, "{file}: root node is missing"),
            TreeDumpError::DanglingIndex { file, node, target } => {
                write!(f, "{file}: node {node} refers to missing node {target}")
            }
            TreeDumpError::SharedChild { file, child } => {
                write!(f, "{file}: node {child} has more than one parent")
            }
            TreeDumpError::BadRange {
                file,
                node,
                pos,
                end,
            } => write!(f, "{file}: node {node} has invalid range {pos}..{end}"),
        }
    }
}

impl std::error::Error for TreeDumpError {}

impl TreeDump {
    /// Capture a tree for serialization.
    pub fn from_tree(tree: &SyntaxTree) -> TreeDump {
        let mut origins: Vec<_> = tree.origins().collect();
        origins.sort();
        TreeDump {
            file_name: tree.file_name.clone(),
            text: tree.text().to_string(),
            nodes: tree.arena.nodes().to_vec(),
            root: tree.root,
            origins,
        }
    }

    /// Validate and convert into a `SyntaxTree`.
    pub fn into_tree(self, file_id: FileId) -> Result<SyntaxTree, TreeDumpError> {
        let file = self.file_name.clone();
        let count = self.nodes.len() as u32;
        let text_len = self.text.len() as u32;

        if self.root.0 >= count {
            return Err(TreeDumpError::MissingRoot { file });
        }

        let mut has_parent = vec![false; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if !node.is_synthetic() && (node.pos > node.end || node.end > text_len) {
                return Err(TreeDumpError::BadRange {
                    file,
                    node: index as u32,
                    pos: node.pos,
                    end: node.end,
                });
            }
            for child in &node.children {
                if child.0 >= count {
                    return Err(TreeDumpError::DanglingIndex {
                        file,
                        node: index as u32,
                        target: child.0,
                    });
                }
                let slot = &mut has_parent[child.0 as usize];
                if *slot {
                    return Err(TreeDumpError::SharedChild {
                        file,
                        child: child.0,
                    });
                }
                *slot = true;
            }
        }
        for &(synthesized, original) in &self.origins {
            for target in [synthesized, original] {
                if target.0 >= count {
                    return Err(TreeDumpError::DanglingIndex {
                        file,
                        node: synthesized.0,
                        target: target.0,
                    });
                }
            }
        }

        let arena = NodeArena::from_nodes(self.nodes);
        let mut tree = SyntaxTree::new(file_id, self.file_name, Arc::from(self.text), arena, self.root);
        for (synthesized, original) in self.origins {
            tree.set_original(synthesized, original);
        }
        Ok(tree)
    }

    pub fn from_json(json: &str) -> serde_json::Result<TreeDump> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
