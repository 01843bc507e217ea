//! cmdhost - A declarative command dispatcher
//!
//! Commands are declared with typed parameters and bound to sync or async
//! targets. A [`Host`] resolves the command named on the command line, binds
//! the remaining tokens to its parameters, and invokes the target, producing an
//! exit code. Help text is generated from the same declarations.

// Public modules
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod help;
pub mod model;
pub mod registry;

// Re-export commonly used types
pub use config::{Bindings, Manifest};
pub use dispatch::{Host, HostBuilder, SharedBuffer};
pub use error::{
    CliError, ConfigError, DispatchError, ParseError, RegistrationError, Result,
};
pub use model::{
    Arguments, Command, CommandBuilder, CustomType, Outcome, ParameterDecl, Target, Value,
    ValueType,
};
pub use registry::Registry;

/// Current version of cmdhost
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
