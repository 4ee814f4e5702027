//! Parser modules

pub mod java;
pub mod parse_cache;

pub use java::{parse_code, SyntaxTree};
pub use parse_cache::ParseCache;
