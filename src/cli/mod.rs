//! Demo command-line application
//!
//! This module wires the library into the `cmdhost` binary: built-in sample
//! commands, manifest loading, and process argument handling.

pub mod app;

// Re-export main types
pub use app::*;
