//! Symbol registry for the cxxfront semantic core.
//!
//! Holds every declared entity the expression builders can name, and the
//! inheritance graph used for base-class paths, member lookup and
//! accessibility.
//!
//! ## Key Types
//!
//! - [`SymbolRegistry`]: registration and scoped name lookup
//! - [`ClassView`]: one class seen through the inheritance graph
//! - [`ClassHierarchy`]: the petgraph-backed base-class graph

mod hierarchy;
mod registry;

pub use hierarchy::ClassHierarchy;
pub use registry::{ClassView, SymbolRegistry};
