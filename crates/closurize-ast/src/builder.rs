//! Tree construction over a source buffer.
//!
//! The builder consumes the source text left to right. Every genuine leaf
//! owns the trivia in front of it, so a finished tree covers the buffer
//! without gaps. Composite nodes are opened with `start_node` and closed with
//! `finish_node`; their range spans from the cursor at open time to the
//! cursor at close time.
//!
//! Synthesized nodes (for lowering steps) are created with
//! `start_synthetic` / `synthetic_token` and do not move the cursor.
//!
//! ```
//! use closurize_ast::{SyntaxKind, TreeBuilder};
//!
//! let mut b = TreeBuilder::new("f(x);");
//! b.start_node(SyntaxKind::ExpressionStatement);
//! b.start_node(SyntaxKind::CallExpression);
//! b.ident("f");
//! b.punct("(");
//! b.ident("x");
//! b.punct(")");
//! b.finish_node();
//! b.punct(";");
//! b.finish_node();
//! let tree = b.finish("test.ts");
//! assert_eq!(tree.statements().len(), 1);
//! ```

use crate::base::{FileId, NodeIndex, SYNTHETIC_POS};
use crate::node::{Node, NodeArena};
use crate::syntax_kind::SyntaxKind;
use crate::tree::SyntaxTree;
use closurize_common::comments::skip_trivia;
use std::sync::Arc;

struct Frame {
    kind: SyntaxKind,
    pos: u32,
    synthetic: bool,
    children: Vec<NodeIndex>,
}

pub struct TreeBuilder {
    text: Arc<str>,
    arena: NodeArena,
    cursor: u32,
    stack: Vec<Frame>,
    origins: Vec<(NodeIndex, NodeIndex)>,
    file_id: FileId,
}

impl TreeBuilder {
    pub fn new(text: &str) -> TreeBuilder {
        TreeBuilder {
            text: Arc::from(text),
            arena: NodeArena::new(),
            cursor: 0,
            stack: vec![Frame {
                kind: SyntaxKind::SourceFile,
                pos: 0,
                synthetic: false,
                children: Vec::new(),
            }],
            origins: Vec::new(),
            file_id: FileId(0),
        }
    }

    pub fn with_file_id(mut self, file_id: FileId) -> TreeBuilder {
        self.file_id = file_id;
        self
    }

    /// Current offset into the source buffer.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    fn push_child(&mut self, child: NodeIndex) {
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(child);
        }
    }

    /// Consume the next token, which must be `expected` after skipping
    /// trivia, and add it as a leaf of `kind`.
    ///
    /// # Panics
    /// Panics if the source does not continue with `expected`; a builder
    /// script that disagrees with its text is a bug in the caller.
    pub fn token(&mut self, kind: SyntaxKind, expected: &str) -> NodeIndex {
        let pos = self.cursor;
        let start = skip_trivia(&self.text, pos as usize);
        assert!(
            self.text[start..].starts_with(expected),
            "expected {expected:?} at offset {start}, found {:?}",
            self.text.get(start..start + expected.len()).unwrap_or("<end of file>")
        );
        let end = (start + expected.len()) as u32;
        self.cursor = end;
        let index = self.arena.add_node(Node::new(kind, pos, end, Vec::new()));
        self.push_child(index);
        index
    }

    /// Consume punctuation or a keyword without meaning of its own.
    pub fn punct(&mut self, text: &str) -> NodeIndex {
        self.token(SyntaxKind::Token, text)
    }

    pub fn ident(&mut self, name: &str) -> NodeIndex {
        self.token(SyntaxKind::Identifier, name)
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.stack.push(Frame {
            kind,
            pos: self.cursor,
            synthetic: false,
            children: Vec::new(),
        });
    }

    /// Open a synthesized composite. Genuine children may still be added
    /// inside it (they consume source text as usual).
    pub fn start_synthetic(&mut self, kind: SyntaxKind) {
        self.stack.push(Frame {
            kind,
            pos: SYNTHETIC_POS,
            synthetic: true,
            children: Vec::new(),
        });
    }

    /// Close the innermost open node.
    ///
    /// # Panics
    /// Panics when only the implicit source file frame is open.
    pub fn finish_node(&mut self) -> NodeIndex {
        assert!(self.stack.len() > 1, "finish_node without matching start_node");
        let Some(frame) = self.stack.pop() else {
            return NodeIndex::NONE;
        };
        let node = if frame.synthetic {
            Node::synthetic(frame.kind, None, frame.children)
        } else {
            Node::new(frame.kind, frame.pos, self.cursor, frame.children)
        };
        let index = self.arena.add_node(node);
        self.push_child(index);
        index
    }

    /// Build a composite with a closure.
    pub fn node(&mut self, kind: SyntaxKind, build: impl FnOnce(&mut TreeBuilder)) -> NodeIndex {
        self.start_node(kind);
        build(self);
        self.finish_node()
    }

    /// Build a synthesized composite with a closure.
    pub fn synthetic_node(
        &mut self,
        kind: SyntaxKind,
        build: impl FnOnce(&mut TreeBuilder),
    ) -> NodeIndex {
        self.start_synthetic(kind);
        build(self);
        self.finish_node()
    }

    /// Add a synthesized leaf with its own text.
    pub fn synthetic_token(&mut self, kind: SyntaxKind, text: &str) -> NodeIndex {
        let index = self.arena.add_node(Node::synthetic(kind, Some(text), Vec::new()));
        self.push_child(index);
        index
    }

    /// Remove the most recently added child of the open node. The node stays
    /// in the arena without a parent, the way a lowering step leaves behind
    /// the genuine node it replaced.
    pub fn detach_last(&mut self) -> NodeIndex {
        self.stack
            .last_mut()
            .and_then(|frame| frame.children.pop())
            .unwrap_or(NodeIndex::NONE)
    }

    /// Record that `synthesized` was derived from `original`.
    pub fn set_original(&mut self, synthesized: NodeIndex, original: NodeIndex) {
        self.origins.push((synthesized, original));
    }

    /// Close the source file. The remaining text becomes the trivia of the
    /// end-of-file token.
    ///
    /// # Panics
    /// Panics if nodes are still open.
    pub fn finish(mut self, file_name: &str) -> SyntaxTree {
        assert!(self.stack.len() == 1, "unclosed nodes at end of file");
        let len = self.text.len() as u32;
        let eof = self
            .arena
            .add_node(Node::new(SyntaxKind::EndOfFileToken, self.cursor, len, Vec::new()));
        self.push_child(eof);
        let children = self.stack.pop().map(|f| f.children).unwrap_or_default();
        let root = self
            .arena
            .add_node(Node::new(SyntaxKind::SourceFile, 0, len, children));

        let mut tree = SyntaxTree::new(self.file_id, file_name, self.text, self.arena, root);
        for (synthesized, original) in self.origins {
            tree.set_original(synthesized, original);
        }
        tree
    }
}
