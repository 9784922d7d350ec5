use std::fmt;

/// Parsed command line intent. Flags are scanned left to right and may appear
/// in any order. Unrecognized tokens are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InvocationArgs {
    /// Run the task as the built-in SYSTEM account at the highest run level
    pub run_as_system: bool,
    /// Delete the fixed-name task instead of registering one
    pub delete_requested: bool,
    /// Executable path for the task action
    pub command: Option<String>,
    /// Arguments for the task action
    pub arguments: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue(String),
}

impl std::error::Error for ArgsError {}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue(flag) => write!(f, "Argument expected after {flag}"),
        }
    }
}

/// Scan the raw argument list for the supported flags. `/c` and `/a` consume
/// the following token and fail without one.
pub fn parse_args(args: &[String]) -> Result<InvocationArgs, ArgsError> {
    let mut parsed = InvocationArgs::default();

    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        match token.as_str() {
            "/s" => parsed.run_as_system = true,
            "/d" => parsed.delete_requested = true,
            "/c" => match tokens.next() {
                Some(value) => parsed.command = Some(value.clone()),
                None => return Err(ArgsError::MissingValue(String::from("/c"))),
            },
            "/a" => match tokens.next() {
                Some(value) => parsed.arguments = Some(value.clone()),
                None => return Err(ArgsError::MissingValue(String::from("/a"))),
            },
            _ => continue,
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::{parse_args, ArgsError};

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|value| String::from(*value)).collect()
    }

    #[test]
    fn test_parse_args_empty() {
        let result = parse_args(&[]).unwrap();
        assert!(!result.run_as_system);
        assert!(!result.delete_requested);
        assert_eq!(result.command, None);
        assert_eq!(result.arguments, None);
    }

    #[test]
    fn test_parse_args_all_flags() {
        let args = tokens(&["/s", "/c", "C:\\Tools\\run.exe", "/a", "-x 1"]);
        let result = parse_args(&args).unwrap();
        assert!(result.run_as_system);
        assert!(!result.delete_requested);
        assert_eq!(result.command.unwrap(), "C:\\Tools\\run.exe");
        assert_eq!(result.arguments.unwrap(), "-x 1");
    }

    #[test]
    fn test_parse_args_order_independent() {
        let args = tokens(&["/a", "-x 1", "/d", "/c", "C:\\Tools\\run.exe", "/s"]);
        let result = parse_args(&args).unwrap();
        assert!(result.run_as_system);
        assert!(result.delete_requested);
        assert_eq!(result.command.unwrap(), "C:\\Tools\\run.exe");
        assert_eq!(result.arguments.unwrap(), "-x 1");
    }

    #[test]
    fn test_parse_args_ignores_unknown_tokens() {
        let args = tokens(&["/x", "bogus", "/d", "leftover"]);
        let result = parse_args(&args).unwrap();
        assert!(result.delete_requested);
        assert_eq!(result.command, None);
        assert_eq!(result.arguments, None);
    }

    #[test]
    fn test_parse_args_command_missing_value() {
        let args = tokens(&["/s", "/c"]);
        let result = parse_args(&args).unwrap_err();
        assert_eq!(result, ArgsError::MissingValue(String::from("/c")));
    }

    #[test]
    fn test_parse_args_arguments_missing_value() {
        let args = tokens(&["/a"]);
        let result = parse_args(&args).unwrap_err();
        assert_eq!(result, ArgsError::MissingValue(String::from("/a")));
        assert_eq!(result.to_string(), "Argument expected after /a");
    }

    #[test]
    fn test_parse_args_flag_value_not_reparsed() {
        // A value that looks like a flag still belongs to the preceding flag
        let args = tokens(&["/c", "/d"]);
        let result = parse_args(&args).unwrap();
        assert!(!result.delete_requested);
        assert_eq!(result.command.unwrap(), "/d");
    }
}
