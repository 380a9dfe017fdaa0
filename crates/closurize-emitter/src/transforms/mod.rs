//! Rewrite passes.
//!
//! Each pass looks at one file's tree and records its changes in the file's
//! `TransformContext`. Passes run one after another in a fixed order; a later
//! pass sees the side tables written by earlier ones.

use crate::transform_context::TransformContext;
use closurize_ast::{NodeIndex, SyntaxTree};
use closurize_common::Diagnostic;
use closurize_common::limits::MAX_AST_DEPTH;
use tracing::debug;

pub mod context_types;
pub mod downlevel_call;
pub mod fileoverview;
pub mod type_annotations;
pub mod unwrap_wrapper;

pub use context_types::{ContextTypes, collect_context_types};
pub use downlevel_call::DownlevelCallAnnotator;
pub use fileoverview::{FileoverviewMerger, FileoverviewOptions};
pub use type_annotations::TypeAnnotator;
pub use unwrap_wrapper::WrapperUnwrapper;

/// Everything a pass may touch while processing one file.
pub struct FileTransform<'a> {
    pub tree: &'a mut SyntaxTree,
    pub ctx: &'a mut TransformContext,
    pub diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> FileTransform<'a> {
    pub fn new(
        tree: &'a mut SyntaxTree,
        ctx: &'a mut TransformContext,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        FileTransform {
            tree,
            ctx,
            diagnostics,
        }
    }
}

pub trait RewritePass {
    fn name(&self) -> &'static str;

    fn run(&self, file: &mut FileTransform<'_>);
}

/// Pre-order walk over the subtree at `root`. Subtrees deeper than
/// `MAX_AST_DEPTH` are not visited.
pub fn walk(tree: &SyntaxTree, root: NodeIndex, visit: &mut impl FnMut(NodeIndex)) {
    walk_at_depth(tree, root, 0, visit);
}

fn walk_at_depth(
    tree: &SyntaxTree,
    index: NodeIndex,
    depth: u32,
    visit: &mut impl FnMut(NodeIndex),
) {
    if depth > MAX_AST_DEPTH {
        debug!(node = index.0, "walk depth limit reached");
        return;
    }
    visit(index);
    for &child in tree.arena.children(index) {
        walk_at_depth(tree, child, depth + 1, visit);
    }
}

/// All nodes of the tree in pre-order.
pub fn preorder(tree: &SyntaxTree) -> Vec<NodeIndex> {
    let mut nodes = Vec::with_capacity(tree.arena.len());
    walk(tree, tree.root, &mut |index| nodes.push(index));
    nodes
}
