//! appcmd - Process containers and declarative command trees
//!
//! appcmd is a small framework for command-line applications. Applications
//! declare their commands as plain data, run them against an abstract
//! process container, and signal failures with errors that carry exit codes.
//!
//! # Architecture
//!
//! - [`app`] - Process container facets, exit-code errors, entry points
//! - [`cmd`] - Command model, compilation to clap, execution
//! - [`ext`] - Application-scoped containers (directories, port)
//!
//! # Guarantees
//!
//! 1. Application code never touches the real process streams, environment
//!    or arguments directly
//! 2. An invalid command tree is rejected before any argument is parsed
//! 3. Exactly one command handler runs per invocation
//! 4. Errors are printed once, and the exit code is derived from the error

pub mod app;
pub mod cmd;
pub mod ext;
