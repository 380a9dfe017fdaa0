//! Context types for `this` inside class member bodies.

use super::preorder;
use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree};
use rustc_hash::FxHashMap;

/// Function-like declaration -> type of `this` in its body.
pub type ContextTypes = FxHashMap<NodeIndex, String>;

/// Map every method, accessor and constructor of a named class to the class
/// name.
pub fn collect_context_types(tree: &SyntaxTree) -> ContextTypes {
    let mut types = ContextTypes::default();
    for index in preorder(tree) {
        if !tree.kind(index).is_class_member_function() {
            continue;
        }
        let class = tree.arena.parent(index);
        if !tree.kind(class).is_class_like() {
            continue;
        }
        if let Some(name) = class_name(tree, class) {
            types.insert(index, name.to_string());
        }
    }
    types
}

/// Name of a class declaration or expression; `None` when anonymous.
pub fn class_name(tree: &SyntaxTree, class: NodeIndex) -> Option<&str> {
    for &child in tree.arena.children(class) {
        match tree.kind(child) {
            SyntaxKind::Identifier => return tree.identifier_text(child),
            SyntaxKind::Decorator => {}
            SyntaxKind::Token => {
                // Anything after the heritage clause or body start is not the name.
                if matches!(tree.node_text(child), "extends" | "implements" | "{") {
                    return None;
                }
            }
            _ => return None,
        }
    }
    None
}
