//! Type annotations.
//!
//! Closure needs types in JSDoc. For each function-like declaration and
//! single variable declaration this pass asks the oracle for the types the
//! checker computed and writes them as `@param`, `@return` and `@type` tags,
//! merged into the declaration's existing JSDoc when it has one.
//! Declarations whose decorator is marked `@ExportDecoratedItems` also get
//! `@export`.

use super::{FileTransform, RewritePass, preorder};
use crate::checker::TypeOracle;
use crate::decorators::is_exported_by_decorator;
use crate::transform_context::SynthesizedComment;
use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree};
use closurize_common::comments::CommentRange;
use closurize_common::diagnostics::diagnostic_codes;
use closurize_common::jsdoc::{self, Tag};
use closurize_common::Diagnostic;
use tracing::{debug, trace};

pub struct TypeAnnotator<'o> {
    oracle: &'o dyn TypeOracle,
}

impl<'o> TypeAnnotator<'o> {
    pub fn new(oracle: &'o dyn TypeOracle) -> Self {
        TypeAnnotator { oracle }
    }

    /// Tags describing the types of `node`, empty if it is not annotated.
    pub fn type_tags(&self, tree: &SyntaxTree, node: NodeIndex) -> Vec<Tag> {
        let file = tree.file_id;
        let mut tags = Vec::new();
        match tree.kind(node) {
            SyntaxKind::FunctionDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::GetAccessor
            | SyntaxKind::SetAccessor
            | SyntaxKind::Constructor => {
                let parameters = tree
                    .arena
                    .node_children(node)
                    .filter(|&child| tree.kind(child) == SyntaxKind::Parameter);
                for (position, parameter) in parameters.enumerate() {
                    if let Some(type_text) = self.oracle.type_text(file, parameter) {
                        tags.push(parameter_tag(tree, parameter, position, type_text));
                    }
                }
                let has_return = !matches!(
                    tree.kind(node),
                    SyntaxKind::Constructor | SyntaxKind::SetAccessor
                );
                if has_return {
                    if let Some(type_text) = self.oracle.return_type_text(file, node) {
                        tags.push(Tag::typed("return", type_text));
                    }
                }
            }
            SyntaxKind::VariableStatement => {
                let list = tree
                    .arena
                    .child_of_kind(node, SyntaxKind::VariableDeclarationList);
                let declarations: Vec<NodeIndex> = tree.arena.node_children(list).collect();
                if let [declaration] = declarations.as_slice() {
                    if let Some(type_text) = self.oracle.type_text(file, *declaration) {
                        tags.push(Tag::typed("type", type_text));
                    }
                }
            }
            SyntaxKind::PropertyDeclaration => {
                if let Some(type_text) = self.oracle.type_text(file, node) {
                    tags.push(Tag::typed("type", type_text));
                }
            }
            _ => {}
        }
        let exportable = matches!(
            tree.kind(node),
            SyntaxKind::ClassDeclaration
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::PropertyDeclaration
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
        );
        if exportable && is_exported_by_decorator(tree, self.oracle, node) {
            tags.push(Tag::named("export"));
        }
        tags
    }

    /// The declaration's own JSDoc: the last comment before its first token,
    /// unless that comment is the file overview.
    fn existing_doc(file: &FileTransform<'_>, node: NodeIndex) -> Option<(CommentRange, String)> {
        let tree = &*file.tree;
        let range = *tree.leading_comment_ranges(node).last()?;
        let text = file
            .ctx
            .replacement(range.pos, range.end)
            .unwrap_or_else(|| range.text(tree.text()));
        let parsed = jsdoc::parse(text)?;
        if parsed.is_fileoverview() {
            return None;
        }
        Some((range, text.to_string()))
    }

    fn annotate(&self, file: &mut FileTransform<'_>, node: NodeIndex, tags: Vec<Tag>) {
        if let Some((range, text)) = Self::existing_doc(file, node) {
            let Some(parsed) = jsdoc::parse(&text) else {
                return;
            };
            for warning in parsed.warnings {
                file.diagnostics.push(Diagnostic::warning(
                    file.tree.file_name.clone(),
                    range.pos,
                    range.end - range.pos,
                    warning,
                    diagnostic_codes::JSDOC_TAG_WARNING,
                ));
            }
            let mut merged = parsed.tags;
            merge_tags(&mut merged, tags);
            debug!(node = node.0, pos = range.pos, "merging types into existing JSDoc");
            file.ctx
                .replace_text(range.pos, range.end, jsdoc::serialize(&merged));
            return;
        }

        let comment = SynthesizedComment::jsdoc(&tags, tags.len() > 1);
        if file.ctx.leading_comments(node).contains(&comment) {
            return;
        }
        debug!(node = node.0, "adding type comment");
        file.ctx.add_leading_comment(node, comment);
    }
}

fn parameter_tag(tree: &SyntaxTree, parameter: NodeIndex, position: usize, type_text: &str) -> Tag {
    let mut tag = Tag::typed("param", type_text);
    let mut parts = tree
        .arena
        .node_children(parameter)
        .filter(|&part| tree.kind(part) != SyntaxKind::TypeNode);
    let name = parts.next().unwrap_or(NodeIndex::NONE);
    match tree.identifier_text(name) {
        Some(text) => tag.parameter_name = Some(text.to_string()),
        None => {
            tag.parameter_name = Some(format!("__{position}"));
            tag.destructuring = tree.kind(name).is_binding_pattern();
        }
    }
    let has_initializer = parts.next().is_some();
    let tokens = tree
        .arena
        .children(parameter)
        .iter()
        .filter(|&&child| tree.kind(child) == SyntaxKind::Token);
    for &token in tokens {
        match tree.node_text(token) {
            "..." => tag.rest = true,
            "?" => tag.optional = true,
            _ => {}
        }
    }
    tag.optional |= has_initializer;
    tag
}

/// Merge computed type tags into a parsed comment. Existing tags keep their
/// text; their types are replaced. New parameters are placed in declaration
/// order relative to the documented ones.
fn merge_tags(existing: &mut Vec<Tag>, computed: Vec<Tag>) {
    let mut last_param: Option<usize> = None;
    for tag in computed {
        let slot = existing.iter().position(|e| {
            e.tag_name == tag.tag_name && (!tag.is("param") || e.parameter_name == tag.parameter_name)
        });
        match slot {
            Some(at) => {
                let current = &mut existing[at];
                current.type_expr = tag.type_expr;
                current.optional = tag.optional;
                current.rest = tag.rest;
                current.destructuring = tag.destructuring;
                if current.is("param") {
                    last_param = Some(at);
                }
            }
            None if tag.is("param") => {
                let at = last_param
                    .map(|i| i + 1)
                    .or_else(|| existing.iter().position(|e| e.is("param")))
                    .or_else(|| existing.iter().position(|e| e.is("return")))
                    .unwrap_or(existing.len());
                existing.insert(at, tag);
                last_param = Some(at);
            }
            None => existing.push(tag),
        }
    }
}

impl RewritePass for TypeAnnotator<'_> {
    fn name(&self) -> &'static str {
        "type-annotations"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.tree.file_name))]
    fn run(&self, file: &mut FileTransform<'_>) {
        let nodes = preorder(file.tree);
        for node in nodes {
            if file.tree.arena.is_synthetic(node) || file.ctx.directive(node).is_some() {
                continue;
            }
            let tags = self.type_tags(file.tree, node);
            if tags.is_empty() {
                continue;
            }
            trace!(node = node.0, count = tags.len(), "computed type tags");
            self.annotate(file, node, tags);
        }
    }
}
