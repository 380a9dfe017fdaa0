//! Traversal limits shared by the renderer and the rewrite passes.
//!
//! Trees handed to closurize come from an external parser, so every recursive
//! walk is bounded to keep pathological inputs from overflowing the stack.

/// Maximum recursion depth for tree traversal.
pub const MAX_AST_DEPTH: u32 = 500;

/// Maximum number of decorator / call layers peeled off while looking for
/// the root identifier of a decorator expression.
pub const MAX_DECORATOR_CHAIN_DEPTH: u32 = 100;

/// Maximum number of origin links followed from a synthesized node.
pub const MAX_ORIGIN_CHAIN_DEPTH: u32 = 100;
