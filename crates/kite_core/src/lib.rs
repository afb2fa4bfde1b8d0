//! kite_core: Core utilities for the kite compiler front end.
//!
//! Provides source positions and the ordered collections used throughout
//! the binding pipeline.

pub mod collections;
pub mod text;

// Re-export commonly used types
pub use collections::{MultiMap, OrderedMap};
pub use text::{LineAndColumn, LineMap, Location, SourceId, TextSpan};
