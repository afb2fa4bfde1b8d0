//! Faults that indicate a defect in the binder itself.
//!
//! Mistakes in the program being compiled are diagnostics, never a
//! [`BindError`]. These variants only fire when an earlier pass failed to
//! produce something a later pass relies on.

use kite_lowering::LoweringError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("no type symbol was recorded for '{0}'")]
    MissingTypeSymbol(String),

    #[error("no method symbol was recorded for '{0}'")]
    MissingMethodSymbol(String),

    #[error("the body of '{0}' was bound twice")]
    BodyAlreadyBound(String),

    #[error("lowering '{method}' produced a malformed body")]
    MalformedBody {
        method: String,
        #[source]
        source: LoweringError,
    },
}
