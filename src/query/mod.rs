//! Tree-Sitter query system
//!
//! Structural patterns (`.scm` files) locate the semantically meaningful regions of a
//! Java file instead of ad hoc string matching.
//!
//! # Architecture
//!
//! ```text
//! .scm Query Files (src/queries/java)
//!       ↓
//! QueryTable (compiled once, versioned, shared)
//!       ↓
//! QueryEngine (executes a QueryType within a scope node, with an Anchor)
//!       ↓
//! QueryMatch / Capture (Tree-Sitter nodes + CaptureRole)
//!       ↓
//! Semantic index (crate::index)
//! ```

pub mod query_engine;
pub mod query_types;
pub mod table;

pub use query_engine::{Anchor, QueryEngine};
pub use query_types::{Capture, CaptureRole, QueryMatch, QueryType};
pub use table::{QueryTable, QUERY_TABLE_VERSION};
