//! app::output
//!
//! User-facing output written through a container.
//!
//! # Design
//!
//! Errors and usage text always go to the container's streams, never to the
//! real process streams, so tests observe exactly what a user would see.
//! Write failures on these paths are ignored: there is nowhere left to report
//! them.

use std::io::Write;

use super::{StderrContainer, Writer};

/// Print an error and its cause chain to standard error.
pub fn print_error(container: &(impl StderrContainer + ?Sized), err: &anyhow::Error) {
    let message = format!("{err:#}");
    if !message.is_empty() {
        let _ = writeln!(container.stderr(), "{message}");
    }
}

/// Print usage text to standard error.
pub fn print_usage(container: &(impl StderrContainer + ?Sized), usage: &str) {
    write_line(&mut container.stderr(), usage);
}

/// Write `text` followed by a newline, ignoring failures.
pub fn write_line(writer: &mut Writer, text: &str) {
    let _ = writeln!(writer, "{text}");
}

/// Pad `s` on the right with spaces to `width` characters.
pub fn rpad(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}
