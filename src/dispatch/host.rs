//! The dispatching host
//!
//! A [`Host`] owns the command registry and the output sink. Dispatch moves
//! through resolving the command, then either showing help or binding and
//! invoking the target.

use crate::config::{commands_from_manifest, Bindings, Manifest};
use crate::dispatch::binder::bind;
use crate::error::{
    is_user_error, ConfigError, ConfigResult, DispatchError, DispatchResult, RegistrationResult,
};
use crate::help::{render_command, render_global, HelpContext};
use crate::model::{Command, CommandBuilder, ReturnShape, Target};
use crate::registry::Registry;
use colored::Colorize;
use futures::FutureExt;
use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

const HELP_TOKENS: &[&str] = &["--help", "-h"];

/// Where a token list leads
enum Route<'a> {
    GlobalHelp,
    CommandHelp(Arc<Command>),
    Invoke(Arc<Command>, &'a [String]),
}

/// Builder for [`Host`]
#[derive(Default)]
pub struct HostBuilder {
    name: Option<String>,
    description: String,
    help_message: Option<String>,
    colored: bool,
    writer: Option<Box<dyn Write + Send>>,
}

impl HostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take name, description and custom help text from a manifest where it sets them
    pub fn manifest(mut self, manifest: &Manifest) -> Self {
        if let Some(name) = &manifest.name {
            self.name = Some(name.clone());
        }
        if let Some(description) = &manifest.description {
            self.description = description.clone();
        }
        if let Some(help) = &manifest.help {
            self.help_message = Some(help.clone());
        }
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the generated global help with fixed text
    pub fn help_message(mut self, message: impl Into<String>) -> Self {
        self.help_message = Some(message.into());
        self
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Sink for help text and diagnostics. Defaults to stdout.
    pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn build(self) -> ConfigResult<Host> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(ConfigError::MissingName)?;

        Ok(Host {
            name,
            description: self.description,
            help_message: self.help_message,
            colored: self.colored,
            registry: Registry::new(),
            writer: Mutex::new(self.writer.unwrap_or_else(|| Box::new(io::stdout()))),
        })
    }
}

/// Registers commands and dispatches command lines to them
pub struct Host {
    name: String,
    description: String,
    help_message: Option<String>,
    colored: bool,
    registry: Registry,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Host {
    /// A host writing to stdout
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Host {
            name: name.into(),
            description: description.into(),
            help_message: None,
            colored: false,
            registry: Registry::new(),
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate and register a declared command
    pub fn register(&self, command: CommandBuilder) -> RegistrationResult<&Self> {
        self.registry.register(command.build()?)?;
        Ok(self)
    }

    /// Register every command a manifest declares, in order. Commands before
    /// a failing one stay registered.
    pub fn register_manifest(
        &self,
        manifest: &Manifest,
        bindings: &Bindings,
    ) -> RegistrationResult<&Self> {
        for command in commands_from_manifest(manifest, bindings)? {
            self.register(command)?;
        }
        Ok(self)
    }

    /// Blocking dispatch. See [`Host::run_async`].
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> DispatchResult<i32> {
        futures::executor::block_on(self.run_async(args))
    }

    /// Dispatch a command line (without the program name) and return the exit code.
    ///
    /// User-input and target failures are written to the sink and yield exit
    /// code 1. An unknown command and a failing sink are returned as errors.
    pub async fn run_async<S: AsRef<str>>(&self, args: &[S]) -> DispatchResult<i32> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();

        match self.route(&args)? {
            Route::GlobalHelp => {
                self.show_help()?;
                Ok(0)
            }
            Route::CommandHelp(command) => {
                self.show_command_help(&command)?;
                Ok(0)
            }
            Route::Invoke(command, tokens) => match self.invoke(&command, tokens).await {
                Ok(code) => Ok(code),
                Err(DispatchError::Output(e)) => Err(DispatchError::Output(e)),
                Err(err) => {
                    self.report(&err)?;
                    Ok(1)
                }
            },
        }
    }

    /// Like [`Host::run`], but every failure is written to the sink and mapped to exit code 1
    pub fn run_or_report<S: AsRef<str>>(&self, args: &[S]) -> i32 {
        match self.run(args) {
            Ok(code) => code,
            Err(DispatchError::Output(e)) => {
                warn!(error = %e, "failed to write output");
                1
            }
            Err(err) => {
                if let Err(e) = self.report(&err) {
                    warn!(error = %e, "failed to write output");
                }
                1
            }
        }
    }

    fn route<'a>(&self, args: &'a [String]) -> DispatchResult<Route<'a>> {
        let Some((first, rest)) = args.split_first() else {
            debug!("no arguments, showing help");
            return Ok(Route::GlobalHelp);
        };

        if matches!(first.as_str(), "--help" | "-h" | "help") {
            return Ok(Route::GlobalHelp);
        }

        let command = self
            .registry
            .resolve(first)
            .ok_or_else(|| DispatchError::CommandNotFound(first.clone()))?;

        if rest.iter().any(|t| HELP_TOKENS.contains(&t.as_str())) {
            debug!(command = command.name(), "showing command help");
            return Ok(Route::CommandHelp(command));
        }

        Ok(Route::Invoke(command, rest))
    }

    async fn invoke(&self, command: &Command, tokens: &[String]) -> DispatchResult<i32> {
        let args = bind(command, tokens)?;
        debug!(
            command = command.name(),
            asynchronous = command.is_async(),
            "invoking command"
        );

        let result = match command.target() {
            Target::Sync { handler, .. } => panic::catch_unwind(AssertUnwindSafe(|| handler(&args)))
                .unwrap_or_else(|payload| Err(panic_error(payload))),
            // The handler call itself may panic before yielding a future
            Target::Async { handler, .. } => AssertUnwindSafe(async move { handler(args).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(panic_error(payload))),
        };

        let outcome = result.map_err(|source| {
            warn!(command = command.name(), error = %source, "command failed");
            DispatchError::TargetFailed {
                command: command.name().to_string(),
                source,
            }
        })?;

        Ok(match command.target().shape() {
            ReturnShape::Unit => 0,
            ReturnShape::ExitCode => outcome.exit_code(),
        })
    }

    fn help_context(&self) -> HelpContext<'_> {
        HelpContext {
            app_name: &self.name,
            description: &self.description,
            colored: self.colored,
        }
    }

    fn show_help(&self) -> io::Result<()> {
        let text = match &self.help_message {
            Some(message) => message.clone(),
            None => render_global(&self.help_context(), self.registry.all()),
        };
        self.write_line(&text)
    }

    fn show_command_help(&self, command: &Command) -> io::Result<()> {
        self.write_line(&render_command(&self.help_context(), command))
    }

    fn report(&self, err: &DispatchError) -> io::Result<()> {
        if is_user_error(err) {
            debug!(error = %err, "rejected command line");
        }
        let line = match err {
            DispatchError::TargetFailed { .. } => err.to_string(),
            other => format!("Error: {}", other),
        };
        if self.colored {
            self.write_line(&line.red().to_string())
        } else {
            self.write_line(&line)
        }
    }

    fn write_line(&self, text: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", text)?;
        writer.flush()
    }
}

/// Turn a panic payload from a target into an error
fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "command panicked".to_string());
    anyhow::anyhow!(message)
}
