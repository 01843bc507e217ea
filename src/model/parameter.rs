//! Parameter declarations and the normalized parameter model
//!
//! A [`ParameterDecl`] is what the declaration layer hands over (builder calls or
//! a manifest entry). [`extract_parameters`] turns an ordered list of them into
//! [`Parameter`]s, assigning positions and materializing defaults.

use crate::error::{invalid_config, ParseError, ParseResult, RegistrationResult};
use crate::model::value::{coerce, Value, ValueType};
use std::collections::HashSet;

/// How a parameter was tagged by its declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// Explicitly positional
    Argument { required: bool },
    /// Named, supplied through `-short` or `--long`
    Option {
        short: Option<String>,
        long: Option<String>,
    },
    /// No tag, treated as positional
    Untagged,
}

/// A parameter as declared, before normalization
#[derive(Debug, Clone)]
pub struct ParameterDecl {
    pub name: String,
    pub value_type: ValueType,
    pub tag: Tag,
    pub description: String,
    /// Default declared on the argument or option metadata
    pub default: Option<String>,
    /// Default carried by the target's own signature
    pub fallback: Option<String>,
}

impl ParameterDecl {
    fn new(name: impl Into<String>, value_type: ValueType, tag: Tag) -> Self {
        ParameterDecl {
            name: name.into(),
            value_type,
            tag,
            description: String::new(),
            default: None,
            fallback: None,
        }
    }

    /// A positional argument, required unless changed with [`ParameterDecl::optional`]
    pub fn argument(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, value_type, Tag::Argument { required: true })
    }

    /// A named option. The long flag defaults to the parameter name.
    pub fn option(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(
            name,
            value_type,
            Tag::Option {
                short: None,
                long: None,
            },
        )
    }

    /// A parameter with no tag
    pub fn untagged(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, value_type, Tag::Untagged)
    }

    pub fn short(mut self, flag: impl Into<String>) -> Self {
        if let Tag::Option { short, .. } = &mut self.tag {
            *short = Some(flag.into());
        }
        self
    }

    pub fn long(mut self, flag: impl Into<String>) -> Self {
        if let Tag::Option { long, .. } = &mut self.tag {
            *long = Some(flag.into());
        }
        self
    }

    /// Mark an argument as optional
    pub fn optional(mut self) -> Self {
        if let Tag::Argument { required } = &mut self.tag {
            *required = false;
        }
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        if let Tag::Argument { required } = &mut self.tag {
            *required = value;
        }
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    pub fn fallback(mut self, raw: impl Into<String>) -> Self {
        self.fallback = Some(raw.into());
        self
    }
}

/// Positional or named
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Positional { position: usize },
    Option {
        short: Option<String>,
        long: String,
    },
}

/// One normalized formal parameter of a command
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
    value_type: ValueType,
    required: bool,
    default_value: Value,
    /// Declared default as written, for help output
    default_text: Option<String>,
    description: String,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn default_text(&self) -> Option<&str> {
        self.default_text.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_positional(&self) -> bool {
        matches!(self.kind, ParameterKind::Positional { .. })
    }

    pub fn position(&self) -> Option<usize> {
        match self.kind {
            ParameterKind::Positional { position } => Some(position),
            ParameterKind::Option { .. } => None,
        }
    }

    pub fn short_flag(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Option { short, .. } => short.as_deref(),
            ParameterKind::Positional { .. } => None,
        }
    }

    pub fn long_flag(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Option { long, .. } => Some(long),
            ParameterKind::Positional { .. } => None,
        }
    }

    /// Coerce a token for this parameter
    pub fn coerce(&self, token: &str) -> ParseResult<Value> {
        coerce(token, &self.value_type).map_err(|_| ParseError::InvalidArgumentValue {
            name: self.name.clone(),
            value: token.to_string(),
            expected: self.value_type.underlying().name(),
        })
    }
}

/// Normalize declarations in order and validate them as a set.
pub fn extract_parameters(
    command: &str,
    decls: Vec<ParameterDecl>,
) -> RegistrationResult<Vec<Parameter>> {
    let mut parameters: Vec<Parameter> = Vec::with_capacity(decls.len());
    let mut next_position = 0;

    for decl in decls {
        if let ValueType::Enum(e) = decl.value_type.underlying() {
            if e.members.is_empty() {
                return Err(invalid_config(format!(
                    "Enum type '{}' of parameter '{}' in command '{}' has no members",
                    e.name, decl.name, command
                )));
            }
        }

        // Declared default wins over the signature default, then the zero value
        let default_text = decl.default.clone().or_else(|| decl.fallback.clone());
        let default_value = match &default_text {
            Some(raw) => coerce(raw, &decl.value_type).map_err(|reason| {
                invalid_config(format!(
                    "Default value '{}' of parameter '{}' in command '{}' is not a valid {}: {}",
                    raw,
                    decl.name,
                    command,
                    decl.value_type.name(),
                    reason
                ))
            })?,
            None => decl.value_type.zero_value(),
        };

        let (kind, required) = match decl.tag {
            Tag::Argument { required } => {
                let position = next_position;
                next_position += 1;
                // A declared default satisfies the argument when it is omitted
                (
                    ParameterKind::Positional { position },
                    required && decl.default.is_none(),
                )
            }
            Tag::Option { short, long } => (
                ParameterKind::Option {
                    short,
                    long: long.unwrap_or_else(|| decl.name.clone()),
                },
                default_text.is_none(),
            ),
            Tag::Untagged => {
                let position = next_position;
                next_position += 1;
                (
                    ParameterKind::Positional { position },
                    decl.fallback.is_none(),
                )
            }
        };

        parameters.push(Parameter {
            name: decl.name,
            kind,
            value_type: decl.value_type,
            required,
            default_value,
            default_text: decl.default,
            description: decl.description,
        });
    }

    validate_parameters(command, &parameters)?;
    Ok(parameters)
}

fn validate_parameters(command: &str, parameters: &[Parameter]) -> RegistrationResult<()> {
    let mut names = HashSet::new();
    let duplicates: Vec<&str> = parameters
        .iter()
        .filter(|p| !names.insert(p.name()))
        .map(|p| p.name())
        .collect();
    if !duplicates.is_empty() {
        return Err(invalid_config(format!(
            "Duplicate parameter names found in command '{}': {}",
            command,
            duplicates.join(", ")
        )));
    }

    let mut longs = HashSet::new();
    let mut shorts = HashSet::new();
    for param in parameters {
        if let ParameterKind::Option { short, long } = param.kind() {
            if long.is_empty() || !longs.insert(long.as_str()) {
                return Err(invalid_config(format!(
                    "Option '{}' in command '{}' has an empty or duplicate long flag '--{}'",
                    param.name(),
                    command,
                    long
                )));
            }
            if let Some(short) = short {
                if short.is_empty() || !shorts.insert(short.as_str()) {
                    return Err(invalid_config(format!(
                        "Option '{}' in command '{}' has an empty or duplicate short flag '-{}'",
                        param.name(),
                        command,
                        short
                    )));
                }
            }
        }
    }

    Ok(())
}
