//! app::error
//!
//! Exit-code error protocol.
//!
//! # Design
//!
//! Any error can terminate an application. Most errors map to exit code 1.
//! An application that needs a specific exit code returns an [`ExitError`],
//! possibly wrapped in further context; [`exit_code`] walks the full source
//! chain to find it.
//!
//! | Result                          | Exit code |
//! |---------------------------------|-----------|
//! | `Ok(())`                        | 0         |
//! | chain contains `ExitError(c)`   | `c`       |
//! | any other error                 | 1         |
//!
//! # Example
//!
//! ```
//! use appcmd::app::{exit_code, ExitError};
//!
//! let err = anyhow::Error::from(ExitError::new(3, "lint failures"))
//!     .context("while checking module");
//! assert_eq!(exit_code(Some(&err)), 3);
//! assert_eq!(exit_code(Some(&anyhow::anyhow!("other"))), 1);
//! assert_eq!(exit_code(None), 0);
//! ```

use std::error::Error as StdError;
use std::fmt;

/// An error carrying an explicit, non-zero process exit code.
///
/// Displays as the wrapped error and forwards its source chain.
#[derive(Debug)]
pub struct ExitError {
    code: i32,
    inner: anyhow::Error,
}

impl ExitError {
    /// Create an exit-coded error from a message.
    ///
    /// # Panics
    ///
    /// Panics if `code` is 0.
    pub fn new<M>(code: i32, message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::wrap(code, anyhow::Error::msg(message))
    }

    /// Wrap an existing error with an exit code.
    ///
    /// # Panics
    ///
    /// Panics if `code` is 0.
    pub fn wrap(code: i32, err: impl Into<anyhow::Error>) -> Self {
        assert_ne!(code, 0, "exit code cannot be 0");
        Self {
            code,
            inner: err.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// The wrapped error.
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for ExitError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Create an [`ExitError`] from a format string.
///
/// ```
/// let err = appcmd::exit_error!(2, "{} files failed", 4);
/// assert_eq!(err.code(), 2);
/// assert_eq!(err.to_string(), "4 files failed");
/// ```
#[macro_export]
macro_rules! exit_error {
    ($code:expr, $($arg:tt)+) => {
        $crate::app::ExitError::new($code, ::std::format!($($arg)+))
    };
}

/// Exit code for the result of an application.
///
/// Returns 0 for `None`, the code of the first [`ExitError`] in the source
/// chain, or 1. Never panics.
pub fn exit_code(err: Option<&anyhow::Error>) -> i32 {
    match err {
        None => 0,
        Some(err) => {
            let err: &(dyn StdError + 'static) = err.as_ref();
            exit_code_of(err)
        }
    }
}

/// Exit code for a bare error value.
///
/// Same rules as [`exit_code`] for a non-`None` error.
pub fn exit_code_of(err: &(dyn StdError + 'static)) -> i32 {
    find_code(err).unwrap_or(1)
}

fn find_code(err: &(dyn StdError + 'static)) -> Option<i32> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(exit) = err.downcast_ref::<ExitError>() {
            return Some(exit.code());
        }
        if let Some(inner) = wrapped(err) {
            let inner: &(dyn StdError + 'static) = inner.as_ref();
            return find_code(inner);
        }
        current = err.source();
    }
    None
}

/// The error held by one of this crate's wrapper types.
///
/// Wrappers display as their inner error and leave it out of `source()`, so
/// chain walks have to descend into it explicitly.
pub(crate) fn wrapped<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a anyhow::Error> {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return Some(exit.inner());
    }
    err.downcast_ref::<crate::cmd::InvalidArgumentError>()
        .map(|invalid| invalid.inner())
}
