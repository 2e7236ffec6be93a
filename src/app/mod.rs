//! app
//!
//! Process-boundary primitives for command-line applications.
//!
//! # Overview
//!
//! Application code never touches the real process directly. Environment
//! variables, standard streams and arguments are provided through a
//! [`Container`], so the same code runs against the operating system in
//! production and against in-memory values in tests.
//!
//! A container is the conjunction of five facets:
//!
//! - [`EnvContainer`] - environment variables
//! - [`StdinContainer`] - standard input
//! - [`StdoutContainer`] - standard output
//! - [`StderrContainer`] - standard error
//! - [`ArgContainer`] - process arguments
//!
//! Functions that need only part of the process should accept the narrowest
//! facet (or one of the combination traits such as [`EnvStdioContainer`]).
//!
//! # Entry points
//!
//! [`main`] runs an application against the operating system and exits the
//! process with the code derived from [`exit_code`]. [`run`] does the same
//! against any container and returns the error instead of exiting.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use appcmd::app::{self, AppContainer, ArgList, Context, EnvMap, Reader, Writer};
//!
//! let container = AppContainer::new(
//!     EnvMap::new([("GREETING", "hello")]),
//!     Reader::empty(),
//!     Writer::discard(),
//!     Writer::discard(),
//!     ArgList::new(["prog"]),
//! );
//!
//! let result = app::run(&Context::background(), &container, |_ctx, container| {
//!     let greeting = container.env("GREETING").unwrap_or("hi");
//!     writeln!(container.stdout(), "{greeting}")?;
//!     Ok(())
//! });
//! assert!(result.is_ok());
//! ```

pub mod container;
pub mod context;
pub mod error;
pub mod interrupt;
pub mod output;
pub mod paths;

pub use container::{AppContainer, ArgList, ArgsView, EnvError, EnvMap, Reader, Writer};
pub use context::{Cancelled, Context};
pub use error::{exit_code, exit_code_of, ExitError};
pub use paths::{
    is_dev_null, is_dev_path, is_dev_stderr, is_dev_stdin, is_dev_stdout, DEV_NULL_FILE_PATH,
    DEV_STDERR_FILE_PATH, DEV_STDIN_FILE_PATH, DEV_STDOUT_FILE_PATH,
};

use std::collections::BTreeMap;

/// Provides environment variables.
pub trait EnvContainer {
    /// Get the value for `key`.
    ///
    /// Returns `None` if the key is unset or the value is empty.
    fn env(&self, key: &str) -> Option<&str>;

    /// Call `f` for every environment variable with a non-empty value.
    fn for_each_env(&self, f: &mut dyn FnMut(&str, &str));
}

/// Provides standard input.
pub trait StdinContainer {
    /// Standard input. If none was supplied, every read returns end of stream.
    fn stdin(&self) -> Reader;
}

/// Provides standard output.
pub trait StdoutContainer {
    /// Standard output. If none was supplied, writes are discarded.
    fn stdout(&self) -> Writer;
}

/// Provides standard error.
pub trait StderrContainer {
    /// Standard error. If none was supplied, writes are discarded.
    fn stderr(&self) -> Writer;
}

/// Provides the process arguments.
pub trait ArgContainer {
    /// Number of arguments.
    fn num_args(&self) -> usize;

    /// The `i`th argument.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.num_args()`.
    fn arg(&self, i: usize) -> &str;
}

/// Environment variables, arguments and stdio.
pub trait Container:
    EnvContainer + StdinContainer + StdoutContainer + StderrContainer + ArgContainer
{
}

impl<T> Container for T where
    T: EnvContainer + StdinContainer + StdoutContainer + StderrContainer + ArgContainer + ?Sized
{
}

/// Standard input, output and error.
pub trait StdioContainer: StdinContainer + StdoutContainer + StderrContainer {}

impl<T> StdioContainer for T where T: StdinContainer + StdoutContainer + StderrContainer + ?Sized {}

/// Environment variables and standard input.
pub trait EnvStdinContainer: EnvContainer + StdinContainer {}

impl<T> EnvStdinContainer for T where T: EnvContainer + StdinContainer + ?Sized {}

/// Environment variables and standard output.
pub trait EnvStdoutContainer: EnvContainer + StdoutContainer {}

impl<T> EnvStdoutContainer for T where T: EnvContainer + StdoutContainer + ?Sized {}

/// Environment variables and standard error.
pub trait EnvStderrContainer: EnvContainer + StderrContainer {}

impl<T> EnvStderrContainer for T where T: EnvContainer + StderrContainer + ?Sized {}

/// Environment variables and stdio.
pub trait EnvStdioContainer: EnvContainer + StdioContainer {}

impl<T> EnvStdioContainer for T where T: EnvContainer + StdioContainer + ?Sized {}

impl<T: EnvContainer + ?Sized> EnvContainer for &T {
    fn env(&self, key: &str) -> Option<&str> {
        (**self).env(key)
    }

    fn for_each_env(&self, f: &mut dyn FnMut(&str, &str)) {
        (**self).for_each_env(f)
    }
}

impl<T: StdinContainer + ?Sized> StdinContainer for &T {
    fn stdin(&self) -> Reader {
        (**self).stdin()
    }
}

impl<T: StdoutContainer + ?Sized> StdoutContainer for &T {
    fn stdout(&self) -> Writer {
        (**self).stdout()
    }
}

impl<T: StderrContainer + ?Sized> StderrContainer for &T {
    fn stderr(&self) -> Writer {
        (**self).stderr()
    }
}

impl<T: ArgContainer + ?Sized> ArgContainer for &T {
    fn num_args(&self) -> usize {
        (**self).num_args()
    }

    fn arg(&self, i: usize) -> &str {
        (**self).arg(i)
    }
}

/// Replace the arguments of `container`.
///
/// Every other facet is shared with `container`.
pub fn with_args<I, S>(container: &dyn Container, args: I) -> ArgsView<'_>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ArgsView::new(container, ArgList::new(args))
}

/// All environment variables as `KEY=VALUE`, sorted.
pub fn environ(container: &(impl EnvContainer + ?Sized)) -> Vec<String> {
    let mut environ = Vec::new();
    container.for_each_env(&mut |key, value| environ.push(format!("{key}={value}")));
    environ.sort();
    environ
}

/// All environment variables as a map.
///
/// No key has an empty value.
pub fn environ_map(container: &(impl EnvContainer + ?Sized)) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    container.for_each_env(&mut |key, value| {
        if !value.is_empty() {
            map.insert(key.to_owned(), value.to_owned());
        }
    });
    map
}

/// All arguments, in order.
pub fn args(container: &(impl ArgContainer + ?Sized)) -> Vec<String> {
    (0..container.num_args())
        .map(|i| container.arg(i).to_owned())
        .collect()
}

/// Parse the environment variable `key` as a bool.
///
/// Returns `default` if the variable is unset or empty. Accepts the
/// spellings `1 t T TRUE true True` and `0 f F FALSE false False`.
///
/// # Errors
///
/// Returns [`EnvError::InvalidBool`] for any other value.
pub fn env_bool(
    container: &(impl EnvContainer + ?Sized),
    key: &str,
    default: bool,
) -> Result<bool, EnvError> {
    match container.env(key) {
        None => Ok(default),
        Some("1" | "t" | "T" | "TRUE" | "true" | "True") => Ok(true),
        Some("0" | "f" | "F" | "FALSE" | "false" | "False") => Ok(false),
        Some(value) => Err(EnvError::InvalidBool {
            key: key.to_owned(),
            value: value.to_owned(),
        }),
    }
}

/// Run `f` against the operating system and exit the process.
///
/// The exit code is derived from the returned error with [`exit_code`].
pub fn main<F>(f: F) -> !
where
    F: FnOnce(&Context, &dyn Container) -> anyhow::Result<()>,
{
    let container = match AppContainer::from_os() {
        Ok(container) => container,
        Err(err) => {
            let err = anyhow::Error::from(err);
            eprintln!("{err:#}");
            std::process::exit(exit_code(Some(&err)));
        }
    };
    let result = run(&Context::background(), &container, f);
    std::process::exit(exit_code(result.as_ref().err()))
}

/// Run `f` against `container`.
///
/// The context passed to `f` is cancelled when the process receives an
/// interrupt or termination signal. An error returned by `f` is printed to
/// the container's standard error and then returned.
pub fn run<F>(ctx: &Context, container: &dyn Container, f: F) -> anyhow::Result<()>
where
    F: FnOnce(&Context, &dyn Container) -> anyhow::Result<()>,
{
    let ctx = interrupt::handle(ctx);
    if let Err(err) = f(&ctx, container) {
        output::print_error(container, &err);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(env: &[(&str, &str)], args: &[&str]) -> AppContainer {
        AppContainer::new(
            EnvMap::new(env.iter().copied()),
            Reader::empty(),
            Writer::discard(),
            Writer::discard(),
            ArgList::new(args.iter().copied()),
        )
    }

    #[test]
    fn environ_is_sorted() {
        let c = container(&[("B", "2"), ("A", "1"), ("C", "")], &[]);
        assert_eq!(environ(&c), vec!["A=1".to_string(), "B=2".to_string()]);
    }

    #[test]
    fn environ_map_drops_empty() {
        let c = container(&[("A", "1"), ("B", "")], &[]);
        let map = environ_map(&c);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("A").map(String::as_str), Some("1"));
    }

    #[test]
    fn env_bool_default_and_parse() {
        let c = container(&[("YES", "true"), ("NO", "0"), ("BAD", "maybe")], &[]);
        assert!(env_bool(&c, "YES", false).unwrap());
        assert!(!env_bool(&c, "NO", true).unwrap());
        assert!(env_bool(&c, "UNSET", true).unwrap());
        assert!(env_bool(&c, "BAD", false).is_err());
    }

    #[test]
    fn with_args_replaces_only_args() {
        let c = container(&[("A", "1")], &["prog", "x"]);
        let view = with_args(&c, ["y", "z"]);
        assert_eq!(args(&view), vec!["y".to_string(), "z".to_string()]);
        assert_eq!(view.env("A"), Some("1"));
    }

    #[test]
    fn run_returns_error_from_f() {
        let c = container(&[], &[]);
        let result = run(&Context::background(), &c, |_, _| anyhow::bail!("boom"));
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }
}
