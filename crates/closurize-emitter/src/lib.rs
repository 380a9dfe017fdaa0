//! Renderer and rewrite passes for closurize.
//!
//! The syntax tree is read-only. Passes record what should change in a
//! per-file `TransformContext` (synthesized comments, comment replacements,
//! statement directives) and the `Printer` reproduces the source text with
//! those changes spliced in at node boundaries.

pub mod transform_context;
pub use transform_context::{SynthesizedComment, TransformContext, TransformDirective};

pub mod printer;
pub use printer::{Printer, RenderError, render_file};

pub mod checker;
pub use checker::{NodeRef, Symbol, SymbolFlags, SymbolId, SymbolTable, TypeOracle};

pub mod decorators;

pub mod transforms;
pub use transforms::{FileTransform, RewritePass};
