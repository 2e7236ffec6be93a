//! cmd::testing
//!
//! Helpers for running command trees against in-memory containers.
//!
//! # Example
//!
//! ```
//! use appcmd::cmd::{self, Command};
//! use appcmd::cmd::testing::Invocation;
//!
//! let command = Command {
//!     usage: "fail".into(),
//!     run: cmd::action(|_, _, _| Err(appcmd::exit_error!(4, "nope").into())),
//!     ..Default::default()
//! };
//! let outcome = Invocation::new(Vec::<String>::new()).run(&command);
//! assert_eq!(outcome.exit_code, 4);
//! assert_eq!(outcome.stderr, "nope\n");
//! ```

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use super::Command;
use crate::app::{self, AppContainer, ArgList, Context, EnvMap, Reader, Writer};

/// Program name used as the first argument of an [`Invocation`].
pub const PROGRAM: &str = "test";

/// A shareable in-memory output stream.
#[derive(Debug, Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An in-memory invocation of a command tree.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    env: Vec<(String, String)>,
    stdin: Vec<u8>,
    args: Vec<String>,
}

/// What an [`Invocation`] produced.
#[derive(Debug)]
pub struct Outcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub error: Option<anyhow::Error>,
}

impl Invocation {
    /// An invocation with `args`, not including the program name.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = input.into();
        self
    }

    /// Run `command` as the root of the tree.
    pub fn run(self, command: &Command) -> Outcome {
        let stdout = Buffer::new();
        let stderr = Buffer::new();
        let container = AppContainer::new(
            EnvMap::new(self.env),
            Reader::new(io::Cursor::new(self.stdin)),
            Writer::new(stdout.clone()),
            Writer::new(stderr.clone()),
            ArgList::new(std::iter::once(PROGRAM.to_owned()).chain(self.args)),
        );
        let result = super::run(&Context::background(), &container, command);
        let error = result.err();
        Outcome {
            stdout: stdout.contents(),
            stderr: stderr.contents(),
            exit_code: app::exit_code(error.as_ref()),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_clones_share_contents() {
        let buffer = Buffer::new();
        let mut writer = buffer.clone();
        writer.write_all(b"abc").unwrap();
        assert_eq!(buffer.contents(), "abc");
    }

    #[test]
    fn stdin_and_env_reach_the_action() {
        use std::io::Read;

        let command = Command {
            usage: "cat".into(),
            run: crate::cmd::action(|_, container, _| {
                let mut input = String::new();
                container.stdin().read_to_string(&mut input)?;
                let suffix = container.env("SUFFIX").unwrap_or_default();
                write!(container.stdout(), "{input}{suffix}")?;
                Ok(())
            }),
            ..Default::default()
        };
        let outcome = Invocation::new(Vec::<String>::new())
            .stdin("in")
            .env("SUFFIX", "!")
            .run(&command);
        assert_eq!(outcome.stdout, "in!");
        assert!(outcome.error.is_none());
    }
}
