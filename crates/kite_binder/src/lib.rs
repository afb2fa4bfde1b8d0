//! kite_binder: Name resolution and type checking for kite programs.
//!
//! Turns a forest of syntax trees into a [`BoundProgram`]: a symbol table,
//! a lowered body per method and every diagnostic found along the way.
//! User mistakes become diagnostics; only internal faults are a
//! [`BindError`].

mod body;
pub mod context;
pub mod error;
mod inheritance;
mod method_declaration;
pub mod program;
pub mod scope;
mod signature;
mod type_binder;

pub use context::{BindOptions, BindingContext};
pub use error::BindError;
pub use program::{BoundProgram, GlobalScope, ProgramBinder, MAIN_NAME, SCRIPT_MAIN_NAME};
pub use scope::{BoundScope, ScopeId, ScopeKind, Scopes};

/// Bind `trees` as one program.
pub fn bind(trees: &[kite_syntax::SyntaxTree], options: BindOptions) -> Result<BoundProgram, BindError> {
    ProgramBinder::new(trees, options).bind()
}
