//! Common types and utilities for closurize.
//!
//! This crate provides the pieces shared by the tree model, the renderer and
//! the rewrite passes:
//! - Comment range scanning over raw source text
//! - The structured JSDoc comment model (parse / merge / serialize)
//! - Diagnostics collected while rewriting
//! - Traversal limits

// Comment range scanning (leading/trailing trivia)
pub mod comments;
pub use comments::{CommentKind, CommentRange};

// Structured documentation comments
pub mod jsdoc;
pub use jsdoc::{ParsedComment, Tag};

// Diagnostics reported by passes and the driver
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Centralized limits
pub mod limits;
