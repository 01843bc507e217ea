//! Bound call arguments handed to a command target

use crate::model::value::Value;
use std::fmt;
use thiserror::Error;

/// Failure to read a bound argument in the requested shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentAccessError {
    #[error("Command has no parameter named '{0}'")]
    Unknown(String),

    #[error("Parameter '{name}' holds {found}, not {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: String,
    },
}

/// The ordered, typed values bound to a command's parameters.
///
/// Order matches the command's declaration order.
#[derive(Clone, Default)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Arguments { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw value by parameter name
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Values in declaration order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Typed value by parameter name
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ArgumentAccessError> {
        let value = self
            .value(name)
            .ok_or_else(|| ArgumentAccessError::Unknown(name.to_string()))?;
        T::from_value(value).ok_or_else(|| ArgumentAccessError::WrongType {
            name: name.to_string(),
            expected: T::EXPECTED,
            found: format!("{:?}", value),
        })
    }

    /// A custom-typed value by parameter name, `None` when the slot is null
    pub fn custom<T: Clone + 'static>(&self, name: &str) -> Result<Option<T>, ArgumentAccessError> {
        let value = self
            .value(name)
            .ok_or_else(|| ArgumentAccessError::Unknown(name.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .downcast_ref::<T>()
            .cloned()
            .map(Some)
            .ok_or_else(|| ArgumentAccessError::WrongType {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                found: format!("{:?}", value),
            })
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Conversion out of a bound [`Value`]
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const EXPECTED: &'static str = "a string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) | Value::Enum(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "an integer";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "a long";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Long(v) => Some(*v),
            Value::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    const EXPECTED: &'static str = "a float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "a double";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
