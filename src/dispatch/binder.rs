//! Argument binding
//!
//! Maps the raw tokens that follow a command name onto the command's declared
//! parameters in a single left-to-right scan.

use crate::error::{ParseError, ParseResult};
use crate::model::{Arguments, Command, Parameter, Value};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// `-` followed by a digit is data, never a flag
fn is_negative_number(token: &str) -> bool {
    static NEGATIVE_NUMBER: OnceLock<Regex> = OnceLock::new();
    NEGATIVE_NUMBER
        .get_or_init(|| Regex::new(r"^-[0-9]").expect("negative number pattern is valid"))
        .is_match(token)
}

fn find_option<'a, F>(parameters: &'a [Parameter], flag_of: F) -> Option<usize>
where
    F: Fn(&'a Parameter) -> Option<&'a str>,
{
    parameters
        .iter()
        .position(|p| !p.is_positional() && flag_of(p).is_some())
}

/// Bind tokens to a command's parameters, producing values in declaration order.
pub fn bind(command: &Command, tokens: &[String]) -> ParseResult<Arguments> {
    let parameters = command.parameters();
    let mut slots: Vec<Value> = parameters
        .iter()
        .map(|p| p.default_value().clone())
        .collect();
    let mut supplied = vec![false; parameters.len()];
    let mut queue: Vec<&str> = Vec::new();

    let mut rest = tokens.iter();
    while let Some(token) = rest.next() {
        let token = token.as_str();

        let found = if is_negative_number(token) {
            queue.push(token);
            continue;
        } else if let Some(long) = token.strip_prefix("--") {
            find_option(parameters, |p| p.long_flag().filter(|f| *f == long))
        } else if let Some(short) = token.strip_prefix('-') {
            find_option(parameters, |p| p.short_flag().filter(|f| *f == short))
        } else {
            queue.push(token);
            continue;
        };

        let index = found.ok_or_else(|| ParseError::UnrecognizedArgument(token.to_string()))?;
        let option = &parameters[index];
        slots[index] = if option.value_type().is_flag() {
            Value::Bool(true)
        } else {
            let raw = rest
                .next()
                .ok_or_else(|| ParseError::MissingOptionValue(option.name().to_string()))?;
            option.coerce(raw)?
        };
        supplied[index] = true;
    }

    let mut positionals: Vec<usize> = parameters
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_positional())
        .map(|(i, _)| i)
        .collect();
    positionals.sort_by_key(|&i| parameters[i].position());

    for (&index, raw) in positionals.iter().zip(queue.iter()) {
        slots[index] = parameters[index].coerce(raw)?;
        supplied[index] = true;
    }

    if queue.len() > positionals.len() {
        return Err(ParseError::UnrecognizedArgument(
            queue[positionals.len()..].join(" "),
        ));
    }

    // Presence, not equality with the zero value, decides whether a required
    // positional was given, so an explicit `0` or `""` counts as supplied.
    if let Some(&missing) = positionals
        .iter()
        .find(|&&i| parameters[i].is_required() && !supplied[i])
    {
        return Err(ParseError::MissingRequiredArgument(
            parameters[missing].name().to_string(),
        ));
    }

    debug!(
        command = command.name(),
        tokens = tokens.len(),
        positionals = queue.len(),
        "bound arguments"
    );

    Ok(Arguments::new(
        parameters
            .iter()
            .map(|p| p.name().to_string())
            .zip(slots)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommandBuilder, ParameterDecl, ValueType};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    /// `test <input> [-c|--count N]`
    fn test_command() -> Command {
        CommandBuilder::new("test")
            .parameter(ParameterDecl::argument("input", ValueType::String))
            .parameter(
                ParameterDecl::option("count", ValueType::Integer)
                    .short("c")
                    .long("count"),
            )
            .run(|_| Ok(()))
            .build()
            .unwrap()
    }

    fn math_command() -> Command {
        CommandBuilder::new("math")
            .parameter(ParameterDecl::argument("value", ValueType::Integer))
            .parameter(ParameterDecl::option("offset", ValueType::Double).short("o"))
            .parameter(ParameterDecl::option("verbose", ValueType::Boolean).short("v"))
            .run(|_| Ok(()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_bind_positional_and_short_option() {
        let args = bind(&test_command(), &tokens(&["hello", "-c", "5"])).unwrap();
        assert_eq!(args.value("input"), Some(&Value::Str("hello".into())));
        assert_eq!(args.value("count"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_bind_option_before_positional() {
        let args = bind(&test_command(), &tokens(&["--count", "5", "hello"])).unwrap();
        assert_eq!(args.get::<String>("input").unwrap(), "hello");
        assert_eq!(args.get::<i32>("count").unwrap(), 5);
    }

    #[test]
    fn test_missing_required_argument() {
        let err = bind(&test_command(), &[]).unwrap_err();
        assert_eq!(err, ParseError::MissingRequiredArgument("input".into()));
    }

    #[test]
    fn test_missing_option_value() {
        let err = bind(&test_command(), &tokens(&["hello", "--count"])).unwrap_err();
        assert_eq!(err, ParseError::MissingOptionValue("count".into()));
    }

    #[test]
    fn test_surplus_positionals_joined() {
        let err = bind(
            &test_command(),
            &tokens(&["hello", "-c", "5", "extra1", "extra2"]),
        )
        .unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedArgument("extra1 extra2".into()));
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let err = bind(&test_command(), &tokens(&["hello", "--unknown"])).unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedArgument("--unknown".into()));

        let err = bind(&test_command(), &tokens(&["-x", "hello"])).unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedArgument("-x".into()));
    }

    #[test]
    fn test_negative_numbers_are_data() {
        let args = bind(&math_command(), &tokens(&["-5", "--offset", "-10.5"])).unwrap();
        assert_eq!(args.get::<i32>("value").unwrap(), -5);
        assert_eq!(args.get::<f64>("offset").unwrap(), -10.5);
    }

    #[test]
    fn test_boolean_flag_presence() {
        let args = bind(&math_command(), &tokens(&["1", "-v"])).unwrap();
        assert!(args.get::<bool>("verbose").unwrap());

        let args = bind(&math_command(), &tokens(&["1"])).unwrap();
        assert!(!args.get::<bool>("verbose").unwrap());
    }

    #[test]
    fn test_invalid_value_reports_name_and_type() {
        let err = bind(&test_command(), &tokens(&["hello", "-c", "notAnInt"])).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidArgumentValue {
                name: "count".into(),
                value: "notAnInt".into(),
                expected: "Integer".into(),
            }
        );
    }

    #[test]
    fn test_option_defaults_applied() {
        let command = CommandBuilder::new("greet")
            .parameter(ParameterDecl::argument("name", ValueType::String))
            .parameter(
                ParameterDecl::option("visited", ValueType::Integer)
                    .short("vc")
                    .long("visited-countries")
                    .default("100"),
            )
            .run(|_| Ok(()))
            .build()
            .unwrap();

        let args = bind(&command, &tokens(&["Ada"])).unwrap();
        assert_eq!(args.get::<i32>("visited").unwrap(), 100);

        let args = bind(&command, &tokens(&["Ada", "-vc", "12"])).unwrap();
        assert_eq!(args.get::<i32>("visited").unwrap(), 12);
    }

    #[test]
    fn test_optional_positional_keeps_default() {
        let command = CommandBuilder::new("copy")
            .parameter(ParameterDecl::argument("source", ValueType::String))
            .parameter(ParameterDecl::untagged("dest", ValueType::String).fallback("out.txt"))
            .run(|_| Ok(()))
            .build()
            .unwrap();

        let args = bind(&command, &tokens(&["in.txt"])).unwrap();
        assert_eq!(args.get::<String>("dest").unwrap(), "out.txt");
    }

    #[test]
    fn test_argument_default_used_when_omitted() {
        let command = CommandBuilder::new("d")
            .parameter(ParameterDecl::argument("x", ValueType::Integer).default("5"))
            .run(|_| Ok(()))
            .build()
            .unwrap();

        let args = bind(&command, &[]).unwrap();
        assert_eq!(args.get::<i32>("x").unwrap(), 5);

        let args = bind(&command, &tokens(&["0"])).unwrap();
        assert_eq!(args.get::<i32>("x").unwrap(), 0);
    }

    #[test]
    fn test_explicit_zero_counts_as_supplied() {
        // An equality-with-default check would reject this; presence tracking accepts it
        let args = bind(&math_command(), &tokens(&["0"])).unwrap();
        assert_eq!(args.get::<i32>("value").unwrap(), 0);

        let args = bind(&test_command(), &tokens(&[""])).unwrap();
        assert_eq!(args.get::<String>("input").unwrap(), "");
    }

    #[test]
    fn test_values_follow_declaration_order() {
        let args = bind(&test_command(), &tokens(&["-c", "2", "x"])).unwrap();
        let values: Vec<&Value> = args.values().collect();
        assert_eq!(values, vec![&Value::Str("x".into()), &Value::Int(2)]);
    }

    #[test]
    fn test_negative_number_shape() {
        assert!(is_negative_number("-5"));
        assert!(is_negative_number("-0.5"));
        assert!(!is_negative_number("-c"));
        assert!(!is_negative_number("--5"));
        assert!(!is_negative_number("5"));
    }
}
