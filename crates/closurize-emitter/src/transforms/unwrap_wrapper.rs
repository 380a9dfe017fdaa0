//! Wrapper unwrapper.
//!
//! Class static initialization lowered for older targets produces
//!
//! ```text
//! let C = (() => { class C {} C.x = 1; return C; })();
//! ```
//!
//! Closure cannot see through the arrow function, so the scaffold is removed
//! and the inner statements are emitted in its place:
//!
//! ```text
//! class C {} C.x = 1;
//! ```
//!
//! Only the exact shape is rewritten. Anything else is left alone.

use super::context_types::class_name;
use super::{FileTransform, RewritePass, preorder};
use crate::transform_context::TransformDirective;
use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree};
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct WrapperUnwrapper;

impl WrapperUnwrapper {
    pub fn new() -> Self {
        WrapperUnwrapper
    }

    /// The statements to emit in place of `statement`, or `None` when it is
    /// not a wrapper scaffold.
    pub fn match_wrapper(tree: &SyntaxTree, statement: NodeIndex) -> Option<Vec<NodeIndex>> {
        if tree.kind(statement) != SyntaxKind::VariableStatement
            || tree.has_modifier(statement, "export")
            || tree.has_modifier(statement, "declare")
        {
            return None;
        }
        let (binding, initializer) = single_declaration(tree, statement)?;

        // (() => { ... })()
        if tree.kind(initializer) != SyntaxKind::CallExpression {
            return None;
        }
        let call_parts: Vec<NodeIndex> = tree.arena.node_children(initializer).collect();
        let [callee] = call_parts.as_slice() else {
            return None;
        };
        if tree.kind(*callee) != SyntaxKind::ParenthesizedExpression {
            return None;
        }
        let closure = tree.arena.nth_node_child(*callee, 0);
        if tree.kind(closure) != SyntaxKind::ArrowFunction {
            return None;
        }
        let closure_parts: Vec<NodeIndex> = tree.arena.node_children(closure).collect();
        let [body] = closure_parts.as_slice() else {
            return None;
        };
        if tree.kind(*body) != SyntaxKind::Block {
            return None;
        }

        let statements: Vec<NodeIndex> = tree.arena.node_children(*body).collect();
        if statements.len() < 2 {
            return None;
        }
        let class = declared_class_name(tree, statements[0])?;
        if tree.identifier_text(binding) != Some(class) {
            return None;
        }

        // The return must be the last non-placeholder statement.
        let mut return_at = None;
        for (i, &inner) in statements.iter().enumerate().skip(1).rev() {
            match tree.kind(inner) {
                kind if kind.is_placeholder_statement() => {}
                SyntaxKind::ReturnStatement => {
                    return_at = Some(i);
                    break;
                }
                _ => return None,
            }
        }
        let return_at = return_at?;
        let returned: Vec<NodeIndex> = tree.arena.node_children(statements[return_at]).collect();
        match returned.as_slice() {
            [value] if tree.identifier_text(*value) == Some(class) => {}
            _ => return None,
        }

        // Everything between the class and the return mutates the class.
        let mutations_only = statements[1..return_at].iter().all(|&inner| {
            let kind = tree.kind(inner);
            kind == SyntaxKind::ExpressionStatement || kind.is_placeholder_statement()
        });
        if !mutations_only {
            return None;
        }

        Some(
            statements
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != return_at)
                .map(|(_, &inner)| inner)
                .collect(),
        )
    }
}

/// `(binding, initializer)` of a variable statement with exactly one
/// declaration that has an identifier name and an initializer.
fn single_declaration(tree: &SyntaxTree, statement: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
    let list = tree
        .arena
        .child_of_kind(statement, SyntaxKind::VariableDeclarationList);
    let declarations: Vec<NodeIndex> = tree.arena.node_children(list).collect();
    let [declaration] = declarations.as_slice() else {
        return None;
    };
    if tree.kind(*declaration) != SyntaxKind::VariableDeclaration {
        return None;
    }
    let parts: Vec<NodeIndex> = tree
        .arena
        .node_children(*declaration)
        .filter(|&part| tree.kind(part) != SyntaxKind::TypeNode)
        .collect();
    match parts.as_slice() {
        [binding, initializer] if tree.kind(*binding) == SyntaxKind::Identifier => {
            Some((*binding, *initializer))
        }
        _ => None,
    }
}

/// Name bound by `class C {}` or `let C = class C {}`.
fn declared_class_name(tree: &SyntaxTree, statement: NodeIndex) -> Option<&str> {
    match tree.kind(statement) {
        SyntaxKind::ClassDeclaration => class_name(tree, statement),
        SyntaxKind::VariableStatement => {
            let (binding, initializer) = single_declaration(tree, statement)?;
            if tree.kind(initializer) != SyntaxKind::ClassExpression {
                return None;
            }
            let name = class_name(tree, initializer)?;
            (tree.identifier_text(binding) == Some(name)).then_some(name)
        }
        _ => None,
    }
}

impl RewritePass for WrapperUnwrapper {
    fn name(&self) -> &'static str {
        "unwrap-wrapper"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.tree.file_name))]
    fn run(&self, file: &mut FileTransform<'_>) {
        let tree = &*file.tree;
        for statement in preorder(tree) {
            if tree.kind(statement) != SyntaxKind::VariableStatement
                || file.ctx.directive(statement).is_some()
            {
                continue;
            }
            match Self::match_wrapper(tree, statement) {
                Some(statements) => {
                    debug!(
                        statement = statement.0,
                        kept = statements.len(),
                        "unwrapped wrapper scaffold"
                    );
                    file.ctx
                        .set_directive(statement, TransformDirective::Unwrap { statements });
                }
                None => trace!(statement = statement.0, "not a wrapper scaffold"),
            }
        }
    }
}
