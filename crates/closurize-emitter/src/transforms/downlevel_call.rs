//! Downlevel-call annotator.
//!
//! Lowering `async` functions below ES2017 rewrites their bodies into
//!
//! ```text
//! return __awaiter(this, void 0, void 0, function* () { ... });
//! ```
//!
//! The generator literal is a new function, so Closure loses the type of
//! `this` inside it. When the literal was derived from a class member, this
//! pass documents it with `/** @this {ClassName} */`.

use super::context_types::ContextTypes;
use super::{FileTransform, RewritePass, preorder};
use crate::transform_context::SynthesizedComment;
use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree};
use closurize_common::Tag;
use tracing::{debug, trace};

/// Name of the helper emitted for lowered async functions.
pub const AWAITER_HELPER: &str = "__awaiter";

pub struct DownlevelCallAnnotator<'m> {
    context_types: &'m ContextTypes,
}

impl<'m> DownlevelCallAnnotator<'m> {
    pub fn new(context_types: &'m ContextTypes) -> Self {
        DownlevelCallAnnotator { context_types }
    }

    /// The function literal passed as the body of an `__awaiter` call, or
    /// `NONE` if `call` has any other shape.
    pub fn awaiter_body(tree: &SyntaxTree, call: NodeIndex) -> NodeIndex {
        if tree.kind(call) != SyntaxKind::CallExpression {
            return NodeIndex::NONE;
        }
        let mut parts = tree.arena.node_children(call);
        let Some(callee) = parts.next() else {
            return NodeIndex::NONE;
        };
        if tree.identifier_text(callee) != Some(AWAITER_HELPER) {
            return NodeIndex::NONE;
        }
        let arguments: Vec<NodeIndex> = parts.collect();
        match arguments.as_slice() {
            [_, _, _, body] if tree.kind(*body) == SyntaxKind::FunctionExpression => *body,
            _ => NodeIndex::NONE,
        }
    }

    /// Declaration the lowered function body came from.
    fn source_declaration(tree: &SyntaxTree, body: NodeIndex) -> NodeIndex {
        let original = tree.original_node(body);
        tree.enclosing_function_like(original)
    }
}

impl RewritePass for DownlevelCallAnnotator<'_> {
    fn name(&self) -> &'static str {
        "downlevel-call"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.tree.file_name))]
    fn run(&self, file: &mut FileTransform<'_>) {
        if self.context_types.is_empty() {
            return;
        }
        let tree = &*file.tree;
        for call in preorder(tree) {
            let body = Self::awaiter_body(tree, call);
            if body.is_none() {
                continue;
            }
            let declaration = Self::source_declaration(tree, body);
            let Some(context_type) = self.context_types.get(&declaration) else {
                trace!(call = call.0, "no context type for awaiter body");
                continue;
            };
            let comment = SynthesizedComment::jsdoc(&[Tag::typed("this", context_type)], false);
            if file.ctx.leading_comments(body).contains(&comment) {
                continue;
            }
            debug!(call = call.0, context_type = %context_type, "annotating awaiter body");
            file.ctx.add_leading_comment(body, comment);
        }
    }
}
