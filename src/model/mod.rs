//! Command and parameter model
//!
//! This module holds the normalized description of commands and their
//! parameters, independent of how they were declared, along with value
//! coercion and the bound arguments a target receives.

pub mod arguments;
pub mod command;
pub mod parameter;
pub mod value;

// Re-export main types
pub use arguments::*;
pub use command::*;
pub use parameter::*;
pub use value::*;
