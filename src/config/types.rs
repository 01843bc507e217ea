//! Manifest types
//!
//! The data structures behind a cmdhost.yml manifest. A manifest carries command
//! metadata only; targets are bound from code by handler name.

use serde::{Deserialize, Serialize};

/// Top-level manifest structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Text replacing the generated global help
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Commands, registered in order
    #[serde(default)]
    pub commands: Vec<CommandDecl>,
}

/// A command entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Name of the bound target; defaults to the command name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Declared return shape (`unit`, `exit-code`, `async-unit`, `async-exit-code`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParamDecl>,
}

impl CommandDecl {
    pub fn handler_name(&self) -> &str {
        self.handler.as_deref().unwrap_or(&self.name)
    }
}

/// How a manifest parameter is tagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Argument,
    Option,
}

/// A parameter entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParamDecl {
    pub name: String,

    /// Type name; a trailing `?` makes it nullable
    #[serde(rename = "type", default = "default_type")]
    pub param_type: String,

    /// Absent means untagged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParamKind>,

    /// Arguments only; defaults to true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_scalar")]
    pub default: Option<String>,

    /// Default the bound target would use for this parameter
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_scalar")]
    pub fallback: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Enum members
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

fn default_type() -> String {
    "string".to_string()
}

/// Accept any YAML scalar (`default: 5`, `default: true`) as its string form
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a scalar default, got {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_command() {
        let yaml = r#"
name: greet
description: Greets someone
aliases: [g, hi]
parameters:
  - name: name
    kind: argument
  - name: times
    type: int
    kind: option
    short: t
    default: 3
"#;
        let command: CommandDecl = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(command.name, "greet");
        assert_eq!(command.handler_name(), "greet");
        assert_eq!(command.aliases, vec!["g", "hi"]);
        assert_eq!(command.parameters[0].param_type, "string");
        assert_eq!(command.parameters[0].kind, Some(ParamKind::Argument));
        assert_eq!(command.parameters[1].default.as_deref(), Some("3"));
        assert_eq!(command.parameters[1].short.as_deref(), Some("t"));
    }

    #[test]
    fn test_untagged_parameter() {
        let param: ParamDecl = serde_yaml::from_str("name: extra\nfallback: none").unwrap();
        assert_eq!(param.kind, None);
        assert_eq!(param.fallback.as_deref(), Some("none"));
        assert_eq!(param.default, None);
    }

    #[test]
    fn test_boolean_scalar_default() {
        let param: ParamDecl =
            serde_yaml::from_str("name: verbose\ntype: bool\ndefault: true").unwrap();
        assert_eq!(param.default.as_deref(), Some("true"));
    }

    #[test]
    fn test_non_scalar_default_rejected() {
        let result: Result<ParamDecl, _> = serde_yaml::from_str("name: x\ndefault: [1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_handler() {
        let command: CommandDecl =
            serde_yaml::from_str("name: sum\nhandler: add\nreturns: exit-code").unwrap();
        assert_eq!(command.handler_name(), "add");
        assert_eq!(command.returns.as_deref(), Some("exit-code"));
    }
}
