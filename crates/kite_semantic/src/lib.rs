//! kite_semantic: Symbols and the bound tree.
//!
//! The binder turns syntax into the data defined here: a [`SymbolTable`] of
//! types, methods, fields and variables, and per-method bound statement
//! trees whose expressions all carry a resolved type. The lowerer, the flow
//! analyses and downstream evaluators consume these without re-deriving any
//! semantic fact.

pub mod bound_tree;
pub mod conversion;
pub mod operators;
pub mod printer;
pub mod symbols;

// Re-export key types
pub use bound_tree::*;
pub use conversion::Conversion;
pub use operators::{BoundBinaryOperator, BoundUnaryOperator};
pub use printer::BoundTreePrinter;
pub use symbols::*;
