//! cmd::error
//!
//! Error types for building and executing command trees.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::app;

/// Errors from building or routing a command tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("must set Command.usage")]
    MissingUsage,

    #[error("must set Command.short if Command.long is set")]
    LongWithoutShort,

    #[error("cannot set both Command.run and Command.sub_commands")]
    RunAndSubCommands,

    #[error("must set one of Command.run and Command.sub_commands")]
    NoRunOrSubCommands,

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("modifying command {name:?} failed: {message}")]
    Modify { name: String, message: String },

    #[error("Sub-command required.")]
    SubCommandRequired,

    #[error("Unknown sub-command: {}", .0.join(" "))]
    UnknownSubCommand(Vec<String>),

    #[error("{0}")]
    Parse(String),
}

impl CommandError {
    /// Whether this error is a structural problem of the command model.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            CommandError::MissingUsage
                | CommandError::LongWithoutShort
                | CommandError::RunAndSubCommands
                | CommandError::NoRunOrSubCommands
                | CommandError::UnknownFlag(_)
                | CommandError::Modify { .. }
        )
    }
}

/// An error caused by invalid arguments to a command.
///
/// When an action returns this error (anywhere in its source chain), the
/// usage of the failing command is printed to standard error before the
/// error propagates.
#[derive(Debug)]
pub struct InvalidArgumentError {
    inner: anyhow::Error,
}

impl InvalidArgumentError {
    pub fn new<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::wrap(anyhow::Error::msg(message))
    }

    pub fn wrap(err: impl Into<anyhow::Error>) -> Self {
        Self { inner: err.into() }
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for InvalidArgumentError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Create an [`InvalidArgumentError`] from a format string.
///
/// ```
/// let err = appcmd::invalid_argument!("unknown format {:?}", "xml");
/// assert_eq!(err.to_string(), "unknown format \"xml\"");
/// ```
#[macro_export]
macro_rules! invalid_argument {
    ($($arg:tt)+) => {
        $crate::cmd::InvalidArgumentError::new(::std::format!($($arg)+))
    };
}

/// Whether `err` is, or wraps, an [`InvalidArgumentError`].
///
/// An [`ExitError`](crate::app::ExitError) wrapping an invalid-argument error counts as well.
pub fn is_invalid_argument(err: &anyhow::Error) -> bool {
    err.chain().any(|e| {
        e.is::<InvalidArgumentError>() || app::error::wrapped(e).is_some_and(is_invalid_argument)
    })
}
