//! Dispatch: routing a command line to a registered command
//!
//! This module contains:
//! - Argument binding
//! - The dispatching host
//! - In-memory output sinks

pub mod binder;
pub mod host;
pub mod sink;

pub use binder::*;
pub use host::*;
pub use sink::*;
