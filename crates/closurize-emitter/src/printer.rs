//! Printer - span-tracking renderer
//!
//! The printer reproduces the original source text of a file and splices in
//! the changes recorded in a `TransformContext`. It keeps a cursor into the
//! source buffer:
//!
//! - `write_to(x)` copies `text[cursor..x]` verbatim (applying comment
//!   replacements that fall inside it) and moves the cursor to `x`
//! - `splice_to(x)` is `write_to(x)` for a point where synthesized text is
//!   inserted; `x` must not be behind the cursor
//! - `skip_to(x)` drops `text[cursor..x]` without copying it
//!
//! The cursor never moves backwards. Closing a node with `write_to` past
//! text that was already copied is harmless, but a splice or skip that would
//! need the cursor to move back is a bug in the pass that requested it and is reported as
//! `RenderError::SpliceRegression` instead of producing duplicated or lost
//! text.
//!
//! Genuine nodes are emitted by copying their text; leaves copy their full
//! range including leading trivia. Synthesized nodes emit their own text and
//! children. A synthesized node that replaced a genuine node is emitted at
//! the original's position, and the original text is skipped.

use crate::transform_context::{SynthesizedComment, TransformContext, TransformDirective};
use closurize_ast::{Node, NodeIndex, SyntaxKind, SyntaxTree};
use closurize_common::comments::CommentKind;
use closurize_common::limits::MAX_AST_DEPTH;
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A splice needed the cursor to move backwards.
    SpliceRegression { file: String, offset: u32, cursor: u32 },
    /// Two comment replacements cover overlapping source ranges.
    OverlappingEdit {
        file: String,
        pos: u32,
        end: u32,
        previous_end: u32,
    },
    /// A comment replacement has an empty, inverted or out-of-file range.
    InvalidEdit { file: String, pos: u32, end: u32 },
    /// A comment replacement cuts into a token.
    EditInsideToken {
        file: String,
        pos: u32,
        token_start: u32,
        token_end: u32,
    },
    /// Skipped text ends inside a comment replacement.
    SkipIntoEdit {
        file: String,
        offset: u32,
        pos: u32,
        end: u32,
    },
    /// Synthesized nodes nest deeper than the traversal limit.
    TooDeep { file: String, node: u32 },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SpliceRegression {
                file,
                offset,
                cursor,
            } => write!(
                f,
                "{file}: splice at offset {offset} is behind the emitted text (cursor {cursor})"
            ),
            RenderError::OverlappingEdit {
                file,
                pos,
                end,
                previous_end,
            } => write!(
                f,
                "{file}: comment replacement {pos}..{end} overlaps a replacement ending at {previous_end}"
            ),
            RenderError::InvalidEdit { file, pos, end } => {
                write!(f, "{file}: comment replacement has invalid range {pos}..{end}")
            }
            RenderError::EditInsideToken {
                file,
                pos,
                token_start,
                token_end,
            } => write!(
                f,
                "{file}: comment replacement at {pos} cuts into token {token_start}..{token_end}"
            ),
            RenderError::SkipIntoEdit {
                file,
                offset,
                pos,
                end,
            } => write!(
                f,
                "{file}: text skipped up to {offset} ends inside comment replacement {pos}..{end}"
            ),
            RenderError::TooDeep { file, node } => {
                write!(f, "{file}: synthesized node {node} nests too deeply")
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Render one file. Declaration files produce no output.
#[tracing::instrument(level = "debug", skip_all, fields(file = %tree.file_name))]
pub fn render_file(
    tree: &SyntaxTree,
    ctx: &TransformContext,
) -> Result<Option<String>, RenderError> {
    if tree.is_declaration_file() {
        debug!("declaration file, nothing to render");
        return Ok(None);
    }
    let mut printer = Printer::new(tree, ctx);
    printer.print()?;
    Ok(Some(printer.finish()))
}

pub struct Printer<'a> {
    tree: &'a SyntaxTree,
    ctx: &'a TransformContext,
    text: &'a str,
    /// Comment replacements `(pos, end, text)`, ordered by position.
    edits: Vec<(u32, u32, &'a str)>,
    out: String,
    cursor: u32,
    depth: u32,
}

impl<'a> Printer<'a> {
    pub fn new(tree: &'a SyntaxTree, ctx: &'a TransformContext) -> Self {
        let text = tree.text();
        Printer {
            tree,
            ctx,
            text,
            edits: ctx.text_edits().collect(),
            out: String::with_capacity(text.len() + text.len() / 8),
            cursor: 0,
            depth: 0,
        }
    }

    /// Emit the whole file.
    pub fn print(&mut self) -> Result<(), RenderError> {
        self.check_edits()?;
        self.emit_node(self.tree.root)?;
        self.write_to(self.text.len() as u32)
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn file(&self) -> String {
        self.tree.file_name.clone()
    }

    fn check_edits(&self) -> Result<(), RenderError> {
        let len = self.text.len() as u32;
        let mut previous_end = 0;
        for &(pos, end, _) in &self.edits {
            if pos >= end || end > len {
                return Err(RenderError::InvalidEdit {
                    file: self.file(),
                    pos,
                    end,
                });
            }
            if pos < previous_end {
                return Err(RenderError::OverlappingEdit {
                    file: self.file(),
                    pos,
                    end,
                    previous_end,
                });
            }
            previous_end = end;
        }
        Ok(())
    }

    // =========================================================================
    // Cursor movement
    // =========================================================================

    fn copy_source(&mut self, from: u32, to: u32) {
        if let Some(slice) = self.text.get(from as usize..to as usize) {
            self.out.push_str(slice);
        }
    }

    /// Copy source text up to `target`, applying comment replacements on the
    /// way.
    fn write_to(&mut self, target: u32) -> Result<(), RenderError> {
        let target = target.min(self.text.len() as u32);
        loop {
            let cursor = self.cursor;
            let next = self.edits.partition_point(|&(_, end, _)| end <= cursor);
            let Some(&(pos, end, replacement)) = self.edits.get(next) else {
                break;
            };
            if pos >= target {
                break;
            }
            if pos < cursor {
                return Err(RenderError::SpliceRegression {
                    file: self.file(),
                    offset: pos,
                    cursor,
                });
            }
            self.copy_source(cursor, pos);
            self.out.push_str(replacement);
            trace!(pos, end, "applied comment replacement");
            self.cursor = end;
        }
        if target > self.cursor {
            self.copy_source(self.cursor, target);
            self.cursor = target;
        }
        Ok(())
    }

    /// Copy up to a point where synthesized text goes. The text after that
    /// point must not have been emitted yet.
    fn splice_to(&mut self, target: u32) -> Result<(), RenderError> {
        if target < self.cursor {
            return Err(RenderError::SpliceRegression {
                file: self.file(),
                offset: target,
                cursor: self.cursor,
            });
        }
        self.write_to(target)
    }

    /// Drop source text up to `target`. Replacements that lie entirely in
    /// the dropped text go with it.
    fn skip_to(&mut self, target: u32) -> Result<(), RenderError> {
        if target < self.cursor {
            return Err(RenderError::SpliceRegression {
                file: self.file(),
                offset: target,
                cursor: self.cursor,
            });
        }
        if let Some(&(pos, end, _)) = self
            .edits
            .iter()
            .find(|&&(pos, end, _)| pos < target && end > target)
        {
            return Err(RenderError::SkipIntoEdit {
                file: self.file(),
                offset: target,
                pos,
                end,
            });
        }
        trace!(from = self.cursor, to = target, "skipping source text");
        self.cursor = target;
        Ok(())
    }

    /// Reject replacements that overlap a leaf's token text.
    fn check_token(&self, index: NodeIndex, node: &Node) -> Result<(), RenderError> {
        if self.edits.is_empty() {
            return Ok(());
        }
        let token_start = self.tree.token_start(index);
        let next = self
            .edits
            .partition_point(|&(_, end, _)| end <= token_start);
        match self.edits.get(next) {
            Some(&(pos, _, _)) if pos < node.end => Err(RenderError::EditInsideToken {
                file: self.file(),
                pos,
                token_start,
                token_end: node.end,
            }),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Whitespace the current output line starts with, if the line holds
    /// nothing else yet.
    fn line_indent(&self) -> &str {
        let line_start = self.out.rfind('\n').map_or(0, |i| i + 1);
        let line = &self.out[line_start..];
        if line.chars().all(|c| c == ' ' || c == '\t') {
            line
        } else {
            ""
        }
    }

    fn emit_leading_comment(&mut self, comment: &SynthesizedComment) {
        let indent = self.line_indent().to_string();
        let source = comment.to_source();
        if indent.is_empty() {
            self.out.push_str(&source);
        } else {
            self.out.push_str(&source.replace('\n', &format!("\n{indent}")));
        }
        if comment.has_trailing_newline || comment.kind == CommentKind::SingleLine {
            self.out.push('\n');
            self.out.push_str(&indent);
        } else {
            self.out.push(' ');
        }
    }

    fn emit_trailing_comment(&mut self, comment: &SynthesizedComment) {
        self.out.push(' ');
        self.out.push_str(&comment.to_source());
        if comment.has_trailing_newline || comment.kind == CommentKind::SingleLine {
            self.out.push('\n');
        }
    }

    fn emit_trailing_comments(&mut self, index: NodeIndex) {
        let ctx = self.ctx;
        for comment in ctx.trailing_comments(index) {
            self.emit_trailing_comment(comment);
        }
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    fn emit_node(&mut self, index: NodeIndex) -> Result<(), RenderError> {
        if self.tree.arena.is_synthetic(index) {
            self.emit_synthetic(index)
        } else {
            self.emit_genuine(index)
        }
    }

    fn emit_genuine(&mut self, index: NodeIndex) -> Result<(), RenderError> {
        let tree = self.tree;
        let ctx = self.ctx;
        let Some(node) = tree.node(index) else {
            return Ok(());
        };

        if self.depth >= MAX_AST_DEPTH {
            debug!(node = index.0, "depth limit reached, copying subtree verbatim");
            return self.write_to(node.end);
        }

        if let Some(TransformDirective::Unwrap { statements }) = ctx.directive(index) {
            return self.emit_unwrapped(index, node, statements);
        }

        let leading = ctx.leading_comments(index);
        if !leading.is_empty() {
            self.splice_to(tree.token_start(index))?;
            for comment in leading {
                self.emit_leading_comment(comment);
            }
        }

        if node.kind.is_leaf() {
            self.check_token(index, node)?;
            self.write_to(node.end)?;
        } else {
            self.depth += 1;
            let prepended = ctx.prepended(index);
            if !prepended.is_empty() {
                if node.kind == SyntaxKind::SourceFile {
                    self.write_shebang()?;
                }
                for &statement in prepended {
                    self.emit_node(statement)?;
                }
            }
            for &child in &node.children {
                self.emit_child(child)?;
            }
            self.depth -= 1;
            self.write_to(node.end)?;
        }

        self.emit_trailing_comments(index);
        Ok(())
    }

    /// Keep a `#!` line first when statements are prepended to a file.
    fn write_shebang(&mut self) -> Result<(), RenderError> {
        if self.cursor == 0 && self.text.starts_with("#!") {
            let end = self.text.find('\n').map_or(self.text.len(), |i| i + 1);
            self.write_to(end as u32)?;
        }
        Ok(())
    }

    /// Child of a genuine node.
    fn emit_child(&mut self, child: NodeIndex) -> Result<(), RenderError> {
        let tree = self.tree;
        let Some(node) = tree.node(child) else {
            return Ok(());
        };
        if !node.is_synthetic() {
            return self.emit_genuine(child);
        }

        // A synthesized node derived from an enclosing node is new structure
        // inside it; one derived from anything else replaces that node.
        let original = tree.original_node(child);
        let replaces = original != child && !tree.arena.ancestors(child).any(|a| a == original);
        match tree.node(original) {
            Some(orig) if replaces && !orig.is_synthetic() => {
                trace!(node = child.0, original = original.0, "emitting replacement at original position");
                self.splice_to(tree.token_start(original))?;
                self.emit_synthetic(child)?;
                self.skip_to(orig.end.max(self.cursor))
            }
            _ => self.emit_synthetic(child),
        }
    }

    fn emit_synthetic(&mut self, index: NodeIndex) -> Result<(), RenderError> {
        let tree = self.tree;
        let ctx = self.ctx;
        let Some(node) = tree.node(index) else {
            return Ok(());
        };
        if self.depth >= MAX_AST_DEPTH {
            return Err(RenderError::TooDeep {
                file: self.file(),
                node: index.0,
            });
        }

        for comment in ctx.leading_comments(index) {
            self.emit_leading_comment(comment);
        }
        if let Some(text) = node.text.as_deref() {
            self.out.push_str(text);
        }

        self.depth += 1;
        for &child in &node.children {
            if tree.arena.is_synthetic(child) {
                self.emit_synthetic(child)?;
            } else {
                // Genuine text inside synthesized structure is emitted from
                // its own range. The outer cursor only moves forward past it.
                let saved = self.cursor;
                self.cursor = tree.node(child).map_or(saved, |n| n.pos);
                self.emit_genuine(child)?;
                self.cursor = saved.max(self.cursor);
            }
        }
        self.depth -= 1;

        self.emit_trailing_comments(index);
        Ok(())
    }

    /// Emit `statements` (descendants of `index`) in place of `index`.
    fn emit_unwrapped(
        &mut self,
        index: NodeIndex,
        node: &Node,
        statements: &[NodeIndex],
    ) -> Result<(), RenderError> {
        let tree = self.tree;
        let ctx = self.ctx;
        debug!(node = index.0, count = statements.len(), "unwrapping statement");

        self.splice_to(tree.token_start(index))?;
        for comment in ctx.leading_comments(index) {
            self.emit_leading_comment(comment);
        }

        for (i, &statement) in statements.iter().enumerate() {
            let Some(inner) = tree.node(statement) else {
                continue;
            };
            if inner.is_synthetic() {
                self.emit_synthetic(statement)?;
                continue;
            }
            // The first statement keeps its own comments but not the
            // indentation it had inside the wrapper.
            let target = if i == 0 {
                tree.leading_comment_ranges(statement)
                    .first()
                    .map_or_else(|| tree.token_start(statement), |range| range.pos)
            } else {
                inner.pos
            };
            self.skip_to(target)?;
            self.emit_genuine(statement)?;
        }

        self.skip_to(node.end)?;
        self.emit_trailing_comments(index);
        Ok(())
    }
}
