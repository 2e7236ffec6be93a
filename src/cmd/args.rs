//! cmd::args
//!
//! Positional-argument validators.
//!
//! Validators run after flag parsing and before the command's action. A
//! failing validator prints the command's usage and aborts the invocation.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors from positional-argument validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgsError {
    #[error("unknown command {arg:?} for {command_path:?}")]
    UnknownCommand { arg: String, command_path: String },

    #[error("accepts {expected} arg(s), received {received}")]
    Exact { expected: usize, received: usize },

    #[error("requires at least {min} arg(s), only received {received}")]
    Minimum { min: usize, received: usize },

    #[error("accepts at most {max} arg(s), received {received}")]
    Maximum { max: usize, received: usize },

    #[error("accepts between {min} and {max} arg(s), received {received}")]
    Range {
        min: usize,
        max: usize,
        received: usize,
    },
}

type CustomFn = Arc<dyn Fn(&[String]) -> anyhow::Result<()>>;

/// Expected positional arguments of a command.
#[derive(Clone)]
pub enum PositionalArgs {
    /// Any number of arguments.
    Arbitrary,
    /// No arguments.
    NoArgs,
    /// Exactly `n` arguments.
    Exact(usize),
    /// At least `n` arguments.
    Minimum(usize),
    /// At most `n` arguments.
    Maximum(usize),
    /// Between `min` and `max` arguments, inclusive.
    Range(usize, usize),
    /// A caller-supplied check.
    Custom(CustomFn),
}

impl PositionalArgs {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<()> + 'static,
    {
        PositionalArgs::Custom(Arc::new(f))
    }

    /// Check `args` for the command at `command_path`.
    pub fn validate(&self, command_path: &str, args: &[String]) -> anyhow::Result<()> {
        let received = args.len();
        match *self {
            PositionalArgs::Arbitrary => Ok(()),
            PositionalArgs::NoArgs => match args.first() {
                Some(arg) => Err(ArgsError::UnknownCommand {
                    arg: arg.clone(),
                    command_path: command_path.to_owned(),
                }
                .into()),
                None => Ok(()),
            },
            PositionalArgs::Exact(expected) if received != expected => {
                Err(ArgsError::Exact { expected, received }.into())
            }
            PositionalArgs::Minimum(min) if received < min => {
                Err(ArgsError::Minimum { min, received }.into())
            }
            PositionalArgs::Maximum(max) if received > max => {
                Err(ArgsError::Maximum { max, received }.into())
            }
            PositionalArgs::Range(min, max) if received < min || received > max => {
                Err(ArgsError::Range { min, max, received }.into())
            }
            PositionalArgs::Custom(ref f) => f(args),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for PositionalArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionalArgs::Arbitrary => f.write_str("Arbitrary"),
            PositionalArgs::NoArgs => f.write_str("NoArgs"),
            PositionalArgs::Exact(n) => f.debug_tuple("Exact").field(n).finish(),
            PositionalArgs::Minimum(n) => f.debug_tuple("Minimum").field(n).finish(),
            PositionalArgs::Maximum(n) => f.debug_tuple("Maximum").field(n).finish(),
            PositionalArgs::Range(min, max) => {
                f.debug_tuple("Range").field(min).field(max).finish()
            }
            PositionalArgs::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("a{i}")).collect()
    }

    #[test]
    fn none_reports_first_arg() {
        let err = PositionalArgs::NoArgs.validate("app sub", &args(2)).unwrap_err();
        assert_eq!(err.to_string(), "unknown command \"a0\" for \"app sub\"");
        assert!(PositionalArgs::NoArgs.validate("app", &[]).is_ok());
    }

    #[test]
    fn exact_minimum_maximum_range() {
        assert!(PositionalArgs::Exact(1).validate("x", &args(1)).is_ok());
        assert_eq!(
            PositionalArgs::Exact(1).validate("x", &args(2)).unwrap_err().to_string(),
            "accepts 1 arg(s), received 2"
        );
        assert_eq!(
            PositionalArgs::Minimum(2).validate("x", &args(1)).unwrap_err().to_string(),
            "requires at least 2 arg(s), only received 1"
        );
        assert_eq!(
            PositionalArgs::Maximum(1).validate("x", &args(3)).unwrap_err().to_string(),
            "accepts at most 1 arg(s), received 3"
        );
        assert!(PositionalArgs::Range(1, 2).validate("x", &args(2)).is_ok());
        assert_eq!(
            PositionalArgs::Range(1, 2).validate("x", &args(0)).unwrap_err().to_string(),
            "accepts between 1 and 2 arg(s), received 0"
        );
    }

    #[test]
    fn custom_validator_is_called() {
        let validator = PositionalArgs::custom(|args| {
            anyhow::ensure!(args.iter().all(|a| a.starts_with('a')), "bad arg");
            Ok(())
        });
        assert!(validator.validate("x", &args(3)).is_ok());
        assert!(validator.validate("x", &["b".to_string()]).is_err());
    }
}
