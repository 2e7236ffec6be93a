//! app::container
//!
//! Concrete implementations of the container facets.
//!
//! # Types
//!
//! - [`EnvMap`] - Snapshot of environment variables
//! - [`Reader`] / [`Writer`] - Shared, clonable handles to byte streams
//! - [`ArgList`] - Ordered argument list
//! - [`AppContainer`] - All facets bundled together
//! - [`ArgsView`] - A container with its arguments replaced
//!
//! All of these are immutable after construction. "Overriding" a value always
//! produces a new container.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::{ArgContainer, Container, EnvContainer, StderrContainer, StdinContainer, StdoutContainer};

/// Errors from building an environment snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("malformed environment entry: {0:?}")]
    MalformedEntry(String),

    #[error("environment variable {0:?} is not valid unicode")]
    NotUnicode(String),

    #[error("could not parse environment variable {key}={value:?} as bool")]
    InvalidBool { key: String, value: String },
}

// =============================================================================
// Environment
// =============================================================================

/// Immutable snapshot of environment variables.
///
/// Empty values are dropped on construction, so a lookup of a key that was
/// set to `""` behaves exactly like a lookup of an unset key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    vars: BTreeMap<String, String>,
}

impl EnvMap {
    /// Create a snapshot from a map.
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(_, v)| !v.is_empty())
                .collect(),
        }
    }

    /// Create a snapshot from `KEY=VALUE` entries.
    ///
    /// Later entries win over earlier ones with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MalformedEntry`] for an entry without `=` or with
    /// an empty key.
    pub fn from_environ<I, S>(environ: I) -> Result<Self, EnvError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = BTreeMap::new();
        for entry in environ {
            let entry = entry.as_ref();
            match entry.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    vars.insert(key.to_owned(), value.to_owned());
                }
                _ => return Err(EnvError::MalformedEntry(entry.to_owned())),
            }
        }
        Ok(Self::new(vars))
    }

    /// Snapshot the environment of the current process.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::NotUnicode`] if a key or value is not valid unicode.
    pub fn from_os() -> Result<Self, EnvError> {
        let mut vars = BTreeMap::new();
        for (key, value) in std::env::vars_os() {
            let key = key
                .into_string()
                .map_err(|k| EnvError::NotUnicode(k.to_string_lossy().into_owned()))?;
            let value = value
                .into_string()
                .map_err(|_| EnvError::NotUnicode(key.clone()))?;
            vars.insert(key, value);
        }
        Ok(Self::new(vars))
    }

    /// Layer `overrides` over the values of `base`.
    ///
    /// An empty override value removes the key.
    pub fn with_overrides<I, K, V>(base: &(impl EnvContainer + ?Sized), overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = super::environ_map(base);
        vars.extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self::new(vars)
    }
}

impl EnvContainer for EnvMap {
    fn env(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn for_each_env(&self, f: &mut dyn FnMut(&str, &str)) {
        for (key, value) in &self.vars {
            f(key, value);
        }
    }
}

// =============================================================================
// Streams
// =============================================================================

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clonable handle to a readable byte stream.
///
/// Clones share the underlying stream. A reader created with
/// [`Reader::empty`] is always at end of stream.
#[derive(Clone, Default)]
pub struct Reader {
    inner: Option<Arc<Mutex<Box<dyn Read + Send>>>>,
}

impl Reader {
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(Box::new(reader)))),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &self.inner {
            Some(inner) => lock(inner).read(buf),
            None => Ok(0),
        }
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("empty", &self.inner.is_none())
            .finish()
    }
}

/// Clonable handle to a writable byte stream.
///
/// Clones share the underlying stream. A writer created with
/// [`Writer::discard`] accepts and drops every write.
#[derive(Clone, Default)]
pub struct Writer {
    inner: Option<Arc<Mutex<Box<dyn Write + Send>>>>,
}

impl Writer {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    pub fn discard() -> Self {
        Self::default()
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.inner {
            Some(inner) => lock(inner).write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.inner {
            Some(inner) => lock(inner).flush(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("discard", &self.inner.is_none())
            .finish()
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Ordered list of process arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList(Vec<String>);

impl ArgList {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(args.into_iter().map(Into::into).collect())
    }

    /// Arguments of the current process, including the program name.
    pub fn from_os() -> Self {
        Self(std::env::args_os().map(|a| a.to_string_lossy().into_owned()).collect())
    }
}

impl ArgContainer for ArgList {
    fn num_args(&self) -> usize {
        self.0.len()
    }

    fn arg(&self, i: usize) -> &str {
        &self.0[i]
    }
}

// =============================================================================
// Full containers
// =============================================================================

/// A container holding every facet by value.
#[derive(Debug, Clone, Default)]
pub struct AppContainer {
    env: EnvMap,
    stdin: Reader,
    stdout: Writer,
    stderr: Writer,
    args: ArgList,
}

impl AppContainer {
    pub fn new(env: EnvMap, stdin: Reader, stdout: Writer, stderr: Writer, args: ArgList) -> Self {
        Self {
            env,
            stdin,
            stdout,
            stderr,
            args,
        }
    }

    /// Snapshot the current process.
    ///
    /// Environment, arguments and the three standard streams are captured
    /// once; nothing is re-read afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be represented.
    pub fn from_os() -> Result<Self, EnvError> {
        Ok(Self {
            env: EnvMap::from_os()?,
            stdin: Reader::new(io::stdin()),
            stdout: Writer::new(io::stdout()),
            stderr: Writer::new(io::stderr()),
            args: ArgList::from_os(),
        })
    }
}

impl EnvContainer for AppContainer {
    fn env(&self, key: &str) -> Option<&str> {
        self.env.env(key)
    }

    fn for_each_env(&self, f: &mut dyn FnMut(&str, &str)) {
        self.env.for_each_env(f)
    }
}

impl StdinContainer for AppContainer {
    fn stdin(&self) -> Reader {
        self.stdin.clone()
    }
}

impl StdoutContainer for AppContainer {
    fn stdout(&self) -> Writer {
        self.stdout.clone()
    }
}

impl StderrContainer for AppContainer {
    fn stderr(&self) -> Writer {
        self.stderr.clone()
    }
}

impl ArgContainer for AppContainer {
    fn num_args(&self) -> usize {
        self.args.num_args()
    }

    fn arg(&self, i: usize) -> &str {
        self.args.arg(i)
    }
}

/// A view over another container with the arguments replaced.
pub struct ArgsView<'a> {
    base: &'a dyn Container,
    args: ArgList,
}

impl<'a> ArgsView<'a> {
    pub fn new(base: &'a dyn Container, args: ArgList) -> Self {
        Self { base, args }
    }
}

impl EnvContainer for ArgsView<'_> {
    fn env(&self, key: &str) -> Option<&str> {
        self.base.env(key)
    }

    fn for_each_env(&self, f: &mut dyn FnMut(&str, &str)) {
        self.base.for_each_env(f)
    }
}

impl StdinContainer for ArgsView<'_> {
    fn stdin(&self) -> Reader {
        self.base.stdin()
    }
}

impl StdoutContainer for ArgsView<'_> {
    fn stdout(&self) -> Writer {
        self.base.stdout()
    }
}

impl StderrContainer for ArgsView<'_> {
    fn stderr(&self) -> Writer {
        self.base.stderr()
    }
}

impl ArgContainer for ArgsView<'_> {
    fn num_args(&self) -> usize {
        self.args.num_args()
    }

    fn arg(&self, i: usize) -> &str {
        self.args.arg(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_map_drops_empty_values() {
        let env = EnvMap::new([("A", "1"), ("B", "")]);
        assert_eq!(env.env("A"), Some("1"));
        assert_eq!(env.env("B"), None);
        assert_eq!(env.env("C"), None);
    }

    #[test]
    fn from_environ_rejects_missing_separator() {
        let err = EnvMap::from_environ(["A=1", "BROKEN"]).unwrap_err();
        assert_eq!(err, EnvError::MalformedEntry("BROKEN".to_string()));
    }

    #[test]
    fn from_environ_rejects_empty_key() {
        assert!(EnvMap::from_environ(["=value"]).is_err());
    }

    #[test]
    fn from_environ_keeps_equals_in_value() {
        let env = EnvMap::from_environ(["A=b=c", "A2="]).unwrap();
        assert_eq!(env.env("A"), Some("b=c"));
        assert_eq!(env.env("A2"), None);
    }

    #[test]
    fn overrides_replace_and_clear() {
        let base = EnvMap::new([("A", "1"), ("B", "2")]);
        let env = EnvMap::with_overrides(&base, [("A", ""), ("C", "3")]);
        assert_eq!(env.env("A"), None);
        assert_eq!(env.env("B"), Some("2"));
        assert_eq!(env.env("C"), Some("3"));
    }

    #[test]
    fn empty_reader_is_at_eof() {
        let mut reader = Reader::empty();
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn writer_clones_share_stream() {
        let sink = std::sync::Arc::new(Mutex::new(Vec::new()));
        struct Shared(std::sync::Arc<Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let writer = Writer::new(Shared(sink.clone()));
        let mut a = writer.clone();
        let mut b = writer;
        a.write_all(b"one ").unwrap();
        b.write_all(b"two").unwrap();
        assert_eq!(sink.lock().unwrap().as_slice(), b"one two");
    }

    #[test]
    #[should_panic]
    fn arg_out_of_range_panics() {
        let args = ArgList::new(["a"]);
        let _ = args.arg(1);
    }
}
