//! Value types and string-to-value coercion
//!
//! Every parameter declares a [`ValueType`]. Raw command-line tokens are turned
//! into [`Value`]s by [`coerce`], which is locale-invariant and never panics.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Converter used by custom types
type Converter = dyn Fn(&str) -> Result<Arc<dyn Any + Send + Sync>, String> + Send + Sync;

/// The semantic type a parameter is coerced into
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Enum(EnumType),
    Nullable(Box<ValueType>),
    Custom(CustomType),
}

/// An enumeration with a fixed list of member names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<String>,
}

/// A user-supplied type parsed through a generic string conversion
#[derive(Clone)]
pub struct CustomType {
    name: String,
    convert: Arc<Converter>,
}

impl CustomType {
    /// A custom type backed by `T`'s `FromStr` implementation
    pub fn parsed<T>(name: impl Into<String>) -> Self
    where
        T: FromStr + Send + Sync + 'static,
        T::Err: fmt::Display,
    {
        CustomType {
            name: name.into(),
            convert: Arc::new(|token: &str| {
                token
                    .parse::<T>()
                    .map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
                    .map_err(|e| e.to_string())
            }),
        }
    }

    /// A custom type with an arbitrary converter
    pub fn with_converter<T, F>(name: impl Into<String>, convert: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        CustomType {
            name: name.into(),
            convert: Arc::new(move |token: &str| {
                convert(token).map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType").field("name", &self.name).finish()
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl ValueType {
    /// An enumeration type
    pub fn enumeration<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValueType::Enum(EnumType {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        })
    }

    /// Wrap this type so that absence is represented as `Value::Null`
    pub fn nullable(self) -> Self {
        match self {
            ValueType::Nullable(_) => self,
            other => ValueType::Nullable(Box::new(other)),
        }
    }

    /// The type with any nullable wrapper removed
    pub fn underlying(&self) -> &ValueType {
        match self {
            ValueType::Nullable(inner) => inner.underlying(),
            other => other,
        }
    }

    /// Boolean options are satisfied by presence alone
    pub fn is_flag(&self) -> bool {
        matches!(self, ValueType::Boolean)
    }

    /// Name used in diagnostics
    pub fn name(&self) -> String {
        match self {
            ValueType::String => "String".to_string(),
            ValueType::Integer => "Integer".to_string(),
            ValueType::Long => "Long".to_string(),
            ValueType::Float => "Float".to_string(),
            ValueType::Double => "Double".to_string(),
            ValueType::Boolean => "Boolean".to_string(),
            ValueType::Enum(e) => e.name.clone(),
            ValueType::Nullable(inner) => format!("{}?", inner.name()),
            ValueType::Custom(c) => c.name.clone(),
        }
    }

    /// The zero value used when nothing else supplies one
    pub fn zero_value(&self) -> Value {
        match self {
            ValueType::String => Value::Str(String::new()),
            ValueType::Integer => Value::Int(0),
            ValueType::Long => Value::Long(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Double => Value::Double(0.0),
            ValueType::Boolean => Value::Bool(false),
            ValueType::Enum(e) => e
                .members
                .first()
                .map(|m| Value::Enum(m.clone()))
                .unwrap_or(Value::Null),
            ValueType::Nullable(_) | ValueType::Custom(_) => Value::Null,
        }
    }
}

/// A typed parameter value
#[derive(Clone)]
pub enum Value {
    Null,
    Str(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    /// Canonical member name of an enumeration
    Enum(String),
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Downcast a custom value
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Custom(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Long(v) => write!(f, "Long({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Double(v) => write!(f, "Double({})", v),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Enum(s) => write!(f, "Enum({})", s),
            Value::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) | Value::Enum(s) => write!(f, "{}", s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Custom(_) => write!(f, "<custom>"),
        }
    }
}

/// Convert a raw token into a value of the given type.
///
/// The error carries the parser's reason; callers wrap it into an
/// `InvalidArgumentValue` with the parameter name.
pub fn coerce(token: &str, target: &ValueType) -> Result<Value, String> {
    match target {
        ValueType::Nullable(inner) => coerce(token, inner),
        ValueType::String => Ok(Value::Str(token.to_string())),
        ValueType::Integer => token.parse().map(Value::Int).map_err(|e| e.to_string()),
        ValueType::Long => token.parse().map(Value::Long).map_err(|e| e.to_string()),
        ValueType::Float => token.parse().map(Value::Float).map_err(|e| e.to_string()),
        ValueType::Double => token.parse().map(Value::Double).map_err(|e| e.to_string()),
        // `str::parse::<bool>` accepts exactly "true" and "false"
        ValueType::Boolean => token.parse().map(Value::Bool).map_err(|e| e.to_string()),
        ValueType::Enum(e) => e
            .members
            .iter()
            .find(|m| m.eq_ignore_ascii_case(token))
            .map(|m| Value::Enum(m.clone()))
            .ok_or_else(|| format!("expected one of: {}", e.members.join(", "))),
        ValueType::Custom(c) => (c.convert)(token).map(Value::Custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn priority() -> ValueType {
        ValueType::enumeration("Priority", ["Low", "Medium", "High"])
    }

    #[test]
    fn test_coerce_primitives() {
        assert_eq!(coerce("hello", &ValueType::String), Ok(Value::Str("hello".into())));
        assert_eq!(coerce("-42", &ValueType::Integer), Ok(Value::Int(-42)));
        assert_eq!(
            coerce("9000000000", &ValueType::Long),
            Ok(Value::Long(9_000_000_000))
        );
        assert_eq!(coerce("3.14", &ValueType::Float), Ok(Value::Float(3.14)));
        assert_eq!(coerce("-10.5", &ValueType::Double), Ok(Value::Double(-10.5)));
        assert_eq!(coerce("true", &ValueType::Boolean), Ok(Value::Bool(true)));
        assert_eq!(coerce("false", &ValueType::Boolean), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_coerce_is_locale_invariant() {
        assert!(coerce("3,14", &ValueType::Double).is_err());
        assert!(coerce("1,000", &ValueType::Integer).is_err());
    }

    #[test]
    fn test_coerce_boolean_is_case_sensitive() {
        assert!(coerce("True", &ValueType::Boolean).is_err());
        assert!(coerce("yes", &ValueType::Boolean).is_err());
    }

    #[test]
    fn test_coerce_integer_overflow() {
        assert!(coerce("9000000000", &ValueType::Integer).is_err());
    }

    #[test]
    fn test_coerce_enum_case_insensitive() {
        assert_eq!(coerce("high", &priority()), Ok(Value::Enum("High".into())));
        assert_eq!(coerce("MEDIUM", &priority()), Ok(Value::Enum("Medium".into())));
        let err = coerce("Urgent", &priority()).unwrap_err();
        assert!(err.contains("Low, Medium, High"));
    }

    #[test]
    fn test_coerce_nullable_uses_underlying_type() {
        let ty = ValueType::Integer.nullable();
        assert_eq!(coerce("7", &ty), Ok(Value::Int(7)));
        assert!(coerce("seven", &ty).is_err());
    }

    #[test]
    fn test_coerce_custom_type() {
        let ty = ValueType::Custom(CustomType::parsed::<u8>("Byte"));
        let value = coerce("200", &ty).unwrap();
        assert_eq!(value.downcast_ref::<u8>(), Some(&200));
        assert!(coerce("300", &ty).is_err());

        let ty = ValueType::Custom(CustomType::parsed::<IpAddr>("IpAddr"));
        let value = coerce("127.0.0.1", &ty).unwrap();
        assert!(value.downcast_ref::<IpAddr>().unwrap().is_loopback());
    }

    #[test]
    fn test_coerce_custom_converter() {
        let percent = CustomType::with_converter("Percent", |token: &str| {
            let n: u8 = token
                .strip_suffix('%')
                .ok_or("missing '%'")?
                .parse()
                .map_err(|_| "not a number".to_string())?;
            if n > 100 {
                return Err(format!("{} is above 100", n));
            }
            Ok(n)
        });
        let ty = ValueType::Custom(percent);

        assert_eq!(ty.name(), "Percent");
        assert_eq!(coerce("42%", &ty).unwrap().downcast_ref::<u8>(), Some(&42));
        assert_eq!(coerce("42", &ty).unwrap_err(), "missing '%'");
        assert!(coerce("120%", &ty).is_err());
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(ValueType::String.zero_value(), Value::Str(String::new()));
        assert_eq!(ValueType::Integer.zero_value(), Value::Int(0));
        assert_eq!(ValueType::Boolean.zero_value(), Value::Bool(false));
        assert_eq!(priority().zero_value(), Value::Enum("Low".into()));
        assert_eq!(ValueType::Double.nullable().zero_value(), Value::Null);
    }

    #[test]
    fn test_nullable_does_not_nest() {
        let ty = ValueType::Integer.nullable().nullable();
        assert_eq!(ty, ValueType::Nullable(Box::new(ValueType::Integer)));
        assert_eq!(ty.name(), "Integer?");
        assert_eq!(ty.underlying(), &ValueType::Integer);
    }
}
