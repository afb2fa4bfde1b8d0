//! kite_syntax: The untyped syntax forest handed to the binder.
//!
//! Scanning and parsing happen outside this workspace. A parser produces one
//! [`SyntaxTree`] per input file; the trees are plain owned data (and can be
//! exchanged as JSON). [`TreeBuilder`] constructs trees programmatically with
//! distinct synthetic locations for every node.

pub mod builder;
pub mod node;
pub mod types;

// Re-export key types
pub use builder::TreeBuilder;
pub use node::*;
pub use types::*;
