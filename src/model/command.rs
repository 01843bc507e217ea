//! Commands, their invocable targets, and the builder that validates them

use crate::error::{invalid_config, RegistrationResult};
use crate::model::arguments::Arguments;
use crate::model::parameter::{extract_parameters, Parameter, ParameterDecl};
use futures::future::BoxFuture;
use futures::{FutureExt, TryFutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a target produced on success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    SuccessWithCode(i32),
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::SuccessWithCode(code) => code,
        }
    }
}

/// The return shape of a target, fixed at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// No value, exit code 0
    Unit,
    /// An integer exit code
    ExitCode,
}

/// Values a target may return
pub trait IntoOutcome: Send + 'static {
    const SHAPE: ReturnShape;

    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for () {
    const SHAPE: ReturnShape = ReturnShape::Unit;

    fn into_outcome(self) -> Outcome {
        Outcome::Success
    }
}

impl IntoOutcome for i32 {
    const SHAPE: ReturnShape = ReturnShape::ExitCode;

    fn into_outcome(self) -> Outcome {
        Outcome::SuccessWithCode(self)
    }
}

pub type SyncHandler = dyn Fn(&Arguments) -> anyhow::Result<Outcome> + Send + Sync;
pub type AsyncHandler =
    dyn Fn(Arguments) -> BoxFuture<'static, anyhow::Result<Outcome>> + Send + Sync;

/// An invocable reference bound at registration time.
///
/// Stateful commands capture their state in the closure.
#[derive(Clone)]
pub enum Target {
    Sync {
        shape: ReturnShape,
        handler: Arc<SyncHandler>,
    },
    Async {
        shape: ReturnShape,
        handler: Arc<AsyncHandler>,
    },
}

impl Target {
    pub fn sync<F, R>(f: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Target::Sync {
            shape: R::SHAPE,
            handler: Arc::new(move |args: &Arguments| f(args).map(IntoOutcome::into_outcome)),
        }
    }

    pub fn asynchronous<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: IntoOutcome,
    {
        Target::Async {
            shape: R::SHAPE,
            handler: Arc::new(move |args: Arguments| {
                f(args).map_ok(IntoOutcome::into_outcome).boxed()
            }),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Target::Async { .. })
    }

    pub fn shape(&self) -> ReturnShape {
        match self {
            Target::Sync { shape, .. } | Target::Async { shape, .. } => *shape,
        }
    }

    /// Manifest spelling of this target's return shape
    pub fn return_type_name(&self) -> &'static str {
        match (self.is_async(), self.shape()) {
            (false, ReturnShape::Unit) => "unit",
            (false, ReturnShape::ExitCode) => "exit-code",
            (true, ReturnShape::Unit) => "async-unit",
            (true, ReturnShape::ExitCode) => "async-exit-code",
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.return_type_name())
    }
}

/// Return types a target may be declared with
pub const SUPPORTED_RETURN_TYPES: &[&str] = &["unit", "exit-code", "async-unit", "async-exit-code"];

/// A fully validated, registrable command
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    description: String,
    parameters: Vec<Parameter>,
    target: Target,
}

impl Command {
    /// Start declaring a command
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_async(&self) -> bool {
        self.target.is_async()
    }
}

/// Declares a command and validates it into a [`Command`]
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    description: String,
    parameters: Vec<ParameterDecl>,
    target: Option<Target>,
    declared_return: Option<String>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        CommandBuilder {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            parameters: Vec::new(),
            target: None,
            declared_return: None,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn parameter(mut self, decl: ParameterDecl) -> Self {
        self.parameters.push(decl);
        self
    }

    /// Bind a synchronous target
    pub fn run<F, R>(self, f: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.target(Target::sync(f))
    }

    /// Bind an asynchronous target
    pub fn run_async<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: IntoOutcome,
    {
        self.target(Target::asynchronous(f))
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Return type as written by a declaration source, checked against the target
    pub fn declared_return(mut self, name: impl Into<String>) -> Self {
        self.declared_return = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate the declaration. Registration-time configuration errors surface here.
    pub fn build(self) -> RegistrationResult<Command> {
        if self.name.trim().is_empty() {
            return Err(invalid_config("Command name must not be empty"));
        }

        let target = self.target.ok_or_else(|| {
            invalid_config(format!("Command '{}' has no target bound", self.name))
        })?;

        if let Some(declared) = &self.declared_return {
            if !SUPPORTED_RETURN_TYPES.contains(&declared.as_str()) {
                return Err(invalid_config(format!(
                    "Unsupported return type '{}' for command '{}'. Supported: {}",
                    declared,
                    self.name,
                    SUPPORTED_RETURN_TYPES.join(", ")
                )));
            }
            if declared != target.return_type_name() {
                return Err(invalid_config(format!(
                    "Unsupported return type '{}' for command '{}': the bound target returns '{}'",
                    declared,
                    self.name,
                    target.return_type_name()
                )));
            }
        }

        let parameters = extract_parameters(&self.name, self.parameters)?;

        Ok(Command {
            name: self.name,
            aliases: self.aliases,
            description: self.description,
            parameters,
            target,
        })
    }
}
