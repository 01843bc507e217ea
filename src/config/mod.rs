//! Command manifests
//!
//! This module handles parsing and discovery of cmdhost.yml manifests and their
//! conversion into command declarations.

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
