//! kite_flow: Control-flow graphs over lowered method bodies.
//!
//! A [`ControlFlowGraph`] is built on demand from one lowered body, queried
//! by the type binder for "does every path return?" and "is this variable
//! assigned on every path to this read?", then dropped.

pub mod analysis;
pub mod cfg;
mod dot;

pub use analysis::UninitializedRead;
pub use cfg::{BasicBlock, BlockId, ControlFlowGraph, Edge, EdgeId};
