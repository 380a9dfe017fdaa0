//! Syntax tree model for closurize.
//!
//! Trees are produced by an external TypeScript front end; this crate only
//! models them:
//! - `NodeArena` owns every node of one file, addressed by `NodeIndex`
//! - `SyntaxTree` pairs the arena with the source buffer and the origin
//!   relation between synthesized nodes and the nodes they were derived from
//! - `TreeBuilder` builds trees over a source buffer (front ends and tests)
//! - `TreeDump` is the JSON exchange format for trees

pub mod base;
pub use base::{FileId, NodeIndex, SYNTHETIC_POS};

pub mod syntax_kind;
pub use syntax_kind::SyntaxKind;

pub mod node;
pub use node::{Node, NodeArena};

pub mod tree;
pub use tree::SyntaxTree;

pub mod builder;
pub use builder::TreeBuilder;

pub mod dump;
pub use dump::{TreeDump, TreeDumpError};
