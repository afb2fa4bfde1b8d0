//! kite_lowering: Rewrites structured control flow into labels and jumps.
//!
//! [`Lowerer`] turns `if`, `while`, `for` and nested blocks into a flat block
//! of expression statements, variable declarations, labels, gotos,
//! conditional gotos and returns. [`InstructionStream`] indexes such a block
//! by label so it can be walked with an explicit program counter.

pub mod lowerer;
pub mod stream;

pub use lowerer::Lowerer;
pub use stream::{InstructionStream, LoweringError};
