//! Decorator resolution.
//!
//! Maps a decorator node to the declarations of the function it calls, and
//! checks whether those declarations opt the decorated item into export via
//! the `@ExportDecoratedItems` marker in their leading comments.

use crate::checker::{NodeRef, TypeOracle};
use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree};
use closurize_common::limits::MAX_DECORATOR_CHAIN_DEPTH;
use tracing::trace;

/// Marker placed in a decorator function's documentation comment.
pub const EXPORT_DECORATED_ITEMS: &str = "@ExportDecoratedItems";

/// Descend through the decorator and any call layers (`@dec`, `@dec()`,
/// `@dec()()`) to the identifier being called. Anything else (such as a
/// property access `@ns.dec`) yields `NONE`.
pub fn decorator_root_identifier(tree: &SyntaxTree, decorator: NodeIndex) -> NodeIndex {
    let mut current = decorator;
    for _ in 0..MAX_DECORATOR_CHAIN_DEPTH {
        match tree.kind(current) {
            SyntaxKind::Decorator | SyntaxKind::CallExpression => {
                current = tree.arena.nth_node_child(current, 0);
            }
            SyntaxKind::Identifier => return current,
            _ => return NodeIndex::NONE,
        }
    }
    NodeIndex::NONE
}

/// Declarations of the symbol a decorator refers to, following one level of
/// alias resolution. Empty when the decorator cannot be resolved.
pub fn resolve_declarations(
    tree: &SyntaxTree,
    oracle: &dyn TypeOracle,
    decorator: NodeIndex,
) -> Vec<NodeRef> {
    let identifier = decorator_root_identifier(tree, decorator);
    if identifier.is_none() {
        return Vec::new();
    }
    let Some(mut symbol) = oracle.symbol_at_location(tree.file_id, identifier) else {
        return Vec::new();
    };
    if oracle.symbol(symbol).is_some_and(|s| s.is_alias()) {
        match oracle.aliased_symbol(symbol) {
            Some(target) => symbol = target,
            None => return Vec::new(),
        }
    }
    oracle
        .symbol(symbol)
        .map(|s| s.declarations.clone())
        .unwrap_or_default()
}

/// Whether `text` contains the marker with whitespace on both sides.
pub fn contains_export_marker(text: &str) -> bool {
    text.match_indices(EXPORT_DECORATED_ITEMS).any(|(i, marker)| {
        let before = text[..i].chars().next_back();
        let after = text[i + marker.len()..].chars().next();
        before.is_some_and(char::is_whitespace) && after.is_some_and(char::is_whitespace)
    })
}

/// Whether any declaration of the decorator's function carries the marker.
pub fn has_export_marker(tree: &SyntaxTree, oracle: &dyn TypeOracle, decorator: NodeIndex) -> bool {
    let found = resolve_declarations(tree, oracle, decorator)
        .into_iter()
        .any(|declaration| {
            oracle
                .leading_comment_text(declaration)
                .is_some_and(contains_export_marker)
        });
    trace!(decorator = decorator.0, found, "checked decorator for export marker");
    found
}

/// Whether a decorated declaration is exported by one of its decorators.
pub fn is_exported_by_decorator(
    tree: &SyntaxTree,
    oracle: &dyn TypeOracle,
    declaration: NodeIndex,
) -> bool {
    tree.arena
        .node_children(declaration)
        .filter(|&child| tree.kind(child) == SyntaxKind::Decorator)
        .any(|decorator| has_export_marker(tree, oracle, decorator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_needs_surrounding_whitespace() {
        assert!(contains_export_marker("/** @ExportDecoratedItems */"));
        assert!(contains_export_marker("/**\n * @ExportDecoratedItems\n */"));
        assert!(!contains_export_marker("/** @ExportDecoratedItemsLater */"));
        assert!(!contains_export_marker("/**@ExportDecoratedItems */"));
        assert!(!contains_export_marker("@ExportDecoratedItems"));
    }
}
