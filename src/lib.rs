//! closurize: rewrites the JavaScript a TypeScript front end emits into
//! Closure-ready source.
//!
//! The work happens in the workspace crates:
//! - `closurize-common`: comment scanning, the JSDoc model, diagnostics
//! - `closurize-ast`: the syntax tree model and its JSON exchange format
//! - `closurize-emitter`: the span-tracking printer and the rewrite passes
//!
//! This crate ties them into a whole-program run (`pipeline`), keeps the
//! cross-file module manifest, and provides the CLI.

pub use closurize_ast as ast;
pub use closurize_common as common;
pub use closurize_emitter as emitter;

pub mod module_manifest;
pub use module_manifest::{CircularDependencyError, ManifestEntry, ModuleManifest};

pub mod module_names;

pub mod pipeline;
pub use pipeline::{EmitResult, EmittedFile, PipelineOptions, Program, ProgramDump};

pub mod tracing_config;

pub mod cli;
