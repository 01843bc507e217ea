//! Manifest validation and conversion
//!
//! Turns manifest entries into [`CommandBuilder`]s, binding each command to a
//! target registered in [`Bindings`] under its handler name.

use crate::config::types::{CommandDecl, Manifest, ParamDecl, ParamKind};
use crate::error::{invalid_config, RegistrationResult};
use crate::model::{Arguments, CommandBuilder, CustomType, IntoOutcome, ParameterDecl, Target, ValueType};
use std::collections::HashMap;
use std::future::Future;

/// Targets and custom types a manifest may refer to by name
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    handlers: HashMap<String, Target>,
    types: HashMap<String, CustomType>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a target under a handler name
    pub fn handler(mut self, name: impl Into<String>, target: Target) -> Self {
        self.handlers.insert(name.into(), target);
        self
    }

    /// Bind a synchronous target
    pub fn run<F, R>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.handler(name, Target::sync(f))
    }

    /// Bind an asynchronous target
    pub fn run_async<F, Fut, R>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: IntoOutcome,
    {
        self.handler(name, Target::asynchronous(f))
    }

    /// Make a custom type available under its own name
    pub fn custom_type(mut self, custom: CustomType) -> Self {
        self.types.insert(custom.name().to_string(), custom);
        self
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.handlers.get(name)
    }
}

/// Convert every manifest command, failing on the first invalid entry
pub fn commands_from_manifest(
    manifest: &Manifest,
    bindings: &Bindings,
) -> RegistrationResult<Vec<CommandBuilder>> {
    manifest
        .commands
        .iter()
        .map(|command| command_from_decl(command, bindings))
        .collect()
}

/// Convert one manifest command
pub fn command_from_decl(decl: &CommandDecl, bindings: &Bindings) -> RegistrationResult<CommandBuilder> {
    let handler = decl.handler_name();
    let target = bindings.target(handler).ok_or_else(|| {
        invalid_config(format!(
            "No handler '{}' is bound for command '{}'",
            handler, decl.name
        ))
    })?;

    let mut builder = CommandBuilder::new(decl.name.as_str())
        .description(decl.description.clone().unwrap_or_default())
        .aliases(decl.aliases.iter().cloned())
        .target(target.clone());

    if let Some(returns) = &decl.returns {
        builder = builder.declared_return(returns.as_str());
    }

    for param in &decl.parameters {
        builder = builder.parameter(parameter_from_decl(&decl.name, param, bindings)?);
    }

    Ok(builder)
}

fn parameter_from_decl(
    command: &str,
    decl: &ParamDecl,
    bindings: &Bindings,
) -> RegistrationResult<ParameterDecl> {
    let value_type = parse_type(&decl.param_type, &decl.name, &decl.values, bindings)
        .map_err(|msg| invalid_config(format!("Parameter '{}' of command '{}': {}", decl.name, command, msg)))?;

    let mut param = match decl.kind {
        Some(ParamKind::Argument) => ParameterDecl::argument(decl.name.as_str(), value_type)
            .required(decl.required.unwrap_or(true)),
        Some(ParamKind::Option) => {
            let mut option = ParameterDecl::option(decl.name.as_str(), value_type);
            if let Some(short) = &decl.short {
                option = option.short(short.as_str());
            }
            if let Some(long) = &decl.long {
                option = option.long(long.as_str());
            }
            option
        }
        None => ParameterDecl::untagged(decl.name.as_str(), value_type),
    };

    if let Some(description) = &decl.description {
        param = param.description(description.as_str());
    }
    if let Some(default) = &decl.default {
        param = param.default(default.as_str());
    }
    if let Some(fallback) = &decl.fallback {
        param = param.fallback(fallback.as_str());
    }
    Ok(param)
}

/// Resolve a manifest type name. Built-in names are case-insensitive, custom
/// names are matched exactly, and a trailing `?` makes the type nullable.
pub fn parse_type(
    raw: &str,
    param_name: &str,
    values: &[String],
    bindings: &Bindings,
) -> Result<ValueType, String> {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_suffix('?') {
        return parse_type(inner, param_name, values, bindings).map(ValueType::nullable);
    }

    let value_type = match raw.to_ascii_lowercase().as_str() {
        "string" | "str" => ValueType::String,
        "int" | "integer" => ValueType::Integer,
        "long" => ValueType::Long,
        "float" => ValueType::Float,
        "double" => ValueType::Double,
        "bool" | "boolean" => ValueType::Boolean,
        "enum" => ValueType::enumeration(param_name, values.iter().cloned()),
        _ => match bindings.types.get(raw) {
            Some(custom) => ValueType::Custom(custom.clone()),
            None => return Err(format!("unknown type '{}'", raw)),
        },
    };
    Ok(value_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_manifest;
    use crate::error::RegistrationError;
    use std::net::IpAddr;

    fn bindings() -> Bindings {
        Bindings::new()
            .run("greet", |_| Ok(()))
            .run("add", |_| Ok(0))
            .custom_type(CustomType::parsed::<IpAddr>("Ip"))
    }

    fn message(err: RegistrationError) -> String {
        match err {
            RegistrationError::InvalidCommandConfiguration(msg) => msg,
            other => panic!("expected InvalidCommandConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_type_names() {
        let b = Bindings::new();
        assert_eq!(parse_type("int", "x", &[], &b).unwrap(), ValueType::Integer);
        assert_eq!(parse_type("Boolean", "x", &[], &b).unwrap(), ValueType::Boolean);
        assert_eq!(
            parse_type("double?", "x", &[], &b).unwrap(),
            ValueType::Double.nullable()
        );
        assert!(parse_type("decimal", "x", &[], &b).is_err());
    }

    #[test]
    fn test_parse_enum_and_custom_types() {
        let b = bindings();
        let members = vec!["Low".to_string(), "High".to_string()];
        let level = parse_type("enum", "level", &members, &b).unwrap();
        assert_eq!(level, ValueType::enumeration("level", ["Low", "High"]));

        let ip = parse_type("Ip", "addr", &[], &b).unwrap();
        assert_eq!(ip.name(), "Ip");
        assert!(parse_type("ip", "addr", &[], &b).is_err());
    }

    #[test]
    fn test_convert_manifest() {
        let manifest = parse_manifest(
            r#"
commands:
  - name: greet
    aliases: [g]
    parameters:
      - name: name
        kind: argument
      - name: times
        type: int
        kind: option
        short: t
        default: 2
  - name: sum
    handler: add
    returns: exit-code
"#,
        )
        .unwrap();

        let builders = commands_from_manifest(&manifest, &bindings()).unwrap();
        assert_eq!(builders.len(), 2);

        let greet = builders[0].clone().build().unwrap();
        assert_eq!(greet.aliases(), &["g".to_string()]);
        assert_eq!(greet.parameters()[1].short_flag(), Some("t"));
        assert_eq!(greet.parameters()[1].default_text(), Some("2"));

        let sum = builders[1].clone().build().unwrap();
        assert_eq!(sum.target().return_type_name(), "exit-code");
    }

    #[test]
    fn test_unknown_handler() {
        let manifest = parse_manifest("commands:\n  - name: missing\n").unwrap();
        let err = commands_from_manifest(&manifest, &bindings()).unwrap_err();
        assert!(message(err).contains("No handler 'missing'"));
    }

    #[test]
    fn test_unknown_type() {
        let manifest = parse_manifest(
            "commands:\n  - name: greet\n    parameters:\n      - name: amount\n        type: decimal\n",
        )
        .unwrap();
        let err = commands_from_manifest(&manifest, &bindings()).unwrap_err();
        assert!(message(err).contains("unknown type 'decimal'"));
    }

    #[test]
    fn test_returns_mismatch_fails_at_build() {
        let manifest =
            parse_manifest("commands:\n  - name: greet\n    returns: exit-code\n").unwrap();
        let builders = commands_from_manifest(&manifest, &bindings()).unwrap();
        let err = builders[0].clone().build().unwrap_err();
        assert!(message(err).contains("Unsupported return type"));
    }
}
