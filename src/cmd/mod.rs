//! cmd
//!
//! Declarative command trees on top of clap.
//!
//! # Architecture
//!
//! Applications describe their command line as a tree of [`Command`] values.
//! Running a tree happens in two phases:
//!
//! 1. **Compile**: every node is validated and translated into a
//!    `clap::Command`, bound to the process [`Container`]. Synthetic commands
//!    (`completion`, `manpages`) and flags (`--version`, `--help-tree`) are
//!    injected here.
//! 2. **Execute**: the arguments are parsed, exactly one node is selected and
//!    its handler runs. The handler's result is the result of the invocation.
//!
//! The model itself holds no process state, so it can be inspected with
//! [`Command::describe`] and executed against an in-memory container in
//! tests (see [`testing`]).
//!
//! # Output
//!
//! - Help (`--help`), `--version` and `--help-tree` go to standard output.
//! - Usage printed because of an error goes to standard error.
//! - Error messages are printed once, by [`crate::app::run`].
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use appcmd::cmd::{self, Command, PositionalArgs};
//! use appcmd::cmd::testing::Invocation;
//!
//! let command = Command {
//!     usage: "greet".into(),
//!     sub_commands: vec![Command {
//!         usage: "hello <name>".into(),
//!         short: "Say hello".into(),
//!         args: Some(PositionalArgs::Exact(1)),
//!         run: cmd::action(|_ctx, container, _flags| {
//!             writeln!(container.stdout(), "hello {}", container.arg(0))?;
//!             Ok(())
//!         }),
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let outcome = Invocation::new(["hello", "world"]).run(&command);
//! assert_eq!(outcome.stdout, "hello world\n");
//! assert_eq!(outcome.exit_code, 0);
//! ```

pub mod args;
mod compile;
mod completion;
pub mod error;
mod exec;
pub mod flags;
mod help_tree;
pub mod testing;

pub use args::{ArgsError, PositionalArgs};
pub use error::{is_invalid_argument, CommandError, InvalidArgumentError};
pub use flags::{bind_multiple, FlagSet, Flags};

use std::fmt;

use serde::Serialize;

use crate::app::{self, Container, Context};

/// Action run by a leaf command.
///
/// The container's arguments are the positional arguments left after flag
/// parsing.
pub type RunFn = Box<dyn Fn(&Context, &dyn Container, &Flags<'_>) -> anyhow::Result<()>>;

/// Callback declaring flags on a command.
pub type BindFlagsFn = Box<dyn Fn(&mut FlagSet)>;

/// Callback mapping a flag name to its canonical spelling.
pub type NormalizeFn = Box<dyn Fn(&str) -> String>;

/// Callback modifying the underlying `clap::Command`.
pub type ModifyClapFn = Box<dyn Fn(clap::Command) -> anyhow::Result<clap::Command>>;

/// A command and, optionally, its sub-commands.
///
/// Exactly one of `run` and `sub_commands` must be set.
#[derive(Default)]
pub struct Command {
    /// One-line usage message. The first word is the command name.
    /// Required.
    pub usage: String,
    /// Names that can be used instead of the first word of `usage`.
    pub aliases: Vec<String>,
    /// Short description shown in help output.
    /// Required if `long` is set.
    pub short: String,
    /// Long description shown in `--help` output, after `short`.
    pub long: String,
    /// Expected positional arguments. Unchecked if unset.
    pub args: Option<PositionalArgs>,
    /// If set, running the command prints this deprecation message first.
    pub deprecated: String,
    /// Hide the command from help, completion and the help tree.
    pub hidden: bool,
    /// Flags of this command only.
    pub bind_flags: Option<BindFlagsFn>,
    /// Flags of this command and all of its descendants.
    pub bind_persistent_flags: Option<BindFlagsFn>,
    /// Normalization of the names of this command's own flags.
    pub normalize_flag: Option<NormalizeFn>,
    /// Normalization of the names of persistent flags.
    pub normalize_persistent_flag: Option<NormalizeFn>,
    /// The action. Must be unset if there are sub-commands.
    pub run: Option<RunFn>,
    /// Sub-commands. Must be empty if there is an action.
    pub sub_commands: Vec<Command>,
    /// Modify the compiled `clap::Command` of this node.
    ///
    /// This is an escape hatch; almost everything should be expressible
    /// through the other fields.
    pub modify_clap: Option<ModifyClapFn>,
    /// If set, a `--version` flag printing this value is added.
    pub version: String,
}

impl Command {
    /// The command name: the first word of `usage`.
    pub fn name(&self) -> &str {
        self.usage.split_whitespace().next().unwrap_or_default()
    }

    /// Check the structural rules of this node (not its children).
    pub fn validate(&self) -> Result<(), CommandError> {
        if self.usage.trim().is_empty() {
            return Err(CommandError::MissingUsage);
        }
        if !self.long.is_empty() && self.short.is_empty() {
            return Err(CommandError::LongWithoutShort);
        }
        match (self.run.is_some(), self.sub_commands.is_empty()) {
            (true, false) => Err(CommandError::RunAndSubCommands),
            (false, true) => Err(CommandError::NoRunOrSubCommands),
            _ => Ok(()),
        }
    }

    /// Check the structural rules of this node and every descendant.
    pub fn validate_tree(&self) -> Result<(), CommandError> {
        self.validate()?;
        self.sub_commands.iter().try_for_each(Command::validate_tree)
    }

    /// Metadata of this tree, without any callbacks.
    pub fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: self.name().to_owned(),
            usage: self.usage.clone(),
            aliases: self.aliases.clone(),
            short: self.short.trim().to_owned(),
            long: self.long.trim().to_owned(),
            deprecated: self.deprecated.clone(),
            hidden: self.hidden,
            version: self.version.clone(),
            runnable: self.run.is_some(),
            sub_commands: self.sub_commands.iter().map(Command::describe).collect(),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("usage", &self.usage)
            .field("aliases", &self.aliases)
            .field("short", &self.short)
            .field("args", &self.args)
            .field("hidden", &self.hidden)
            .field("version", &self.version)
            .field("runnable", &self.run.is_some())
            .field("sub_commands", &self.sub_commands)
            .finish_non_exhaustive()
    }
}

/// Serializable metadata of a [`Command`] tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescription {
    pub name: String,
    pub usage: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub long: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deprecated: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub runnable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_commands: Vec<CommandDescription>,
}

/// Wrap a closure as a [`Command::run`] action.
pub fn action<F>(f: F) -> Option<RunFn>
where
    F: Fn(&Context, &dyn Container, &Flags<'_>) -> anyhow::Result<()> + 'static,
{
    Some(Box::new(f))
}

/// Wrap a closure as a [`Command::bind_flags`] callback.
pub fn bind<F>(f: F) -> Option<BindFlagsFn>
where
    F: Fn(&mut FlagSet) + 'static,
{
    Some(Box::new(f))
}

/// Wrap a closure as a flag-name normalization callback.
pub fn normalize<F>(f: F) -> Option<NormalizeFn>
where
    F: Fn(&str) -> String + 'static,
{
    Some(Box::new(f))
}

/// Wrap a closure as a [`Command::modify_clap`] callback.
pub fn modify<F>(f: F) -> Option<ModifyClapFn>
where
    F: Fn(clap::Command) -> anyhow::Result<clap::Command> + 'static,
{
    Some(Box::new(f))
}

/// Run `command` against the operating system and exit the process.
pub fn main(command: Command) -> ! {
    app::main(move |ctx, container| exec::execute(ctx, container, &command))
}

/// Run `command` against `container`.
///
/// The first argument of the container is taken to be the program name and
/// is not parsed. Errors are printed to standard error and returned.
pub fn run(ctx: &Context, container: &dyn Container, command: &Command) -> anyhow::Result<()> {
    app::run(ctx, container, |ctx, container| {
        exec::execute(ctx, container, command)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(usage: &str) -> Command {
        Command {
            usage: usage.into(),
            run: action(|_, _, _| Ok(())),
            ..Default::default()
        }
    }

    #[test]
    fn name_is_first_word_of_usage() {
        assert_eq!(leaf("build <dir> [flags]").name(), "build");
    }

    #[test]
    fn validate_rules() {
        assert_eq!(Command::default().validate(), Err(CommandError::MissingUsage));
        assert_eq!(
            Command {
                usage: "x".into(),
                ..Default::default()
            }
            .validate(),
            Err(CommandError::NoRunOrSubCommands)
        );
        assert_eq!(
            Command {
                long: "long".into(),
                ..leaf("x")
            }
            .validate(),
            Err(CommandError::LongWithoutShort)
        );
        assert_eq!(
            Command {
                sub_commands: vec![leaf("y")],
                ..leaf("x")
            }
            .validate(),
            Err(CommandError::RunAndSubCommands)
        );
        assert!(leaf("x").validate().is_ok());
    }

    #[test]
    fn validate_tree_reaches_children() {
        let tree = Command {
            usage: "root".into(),
            sub_commands: vec![leaf("ok"), Command::default()],
            ..Default::default()
        };
        assert!(tree.validate().is_ok());
        assert_eq!(tree.validate_tree(), Err(CommandError::MissingUsage));
    }

    #[test]
    fn describe_serializes_metadata_only() {
        let tree = Command {
            usage: "root".into(),
            short: "  The root  ".into(),
            version: "1.2.3".into(),
            sub_commands: vec![Command {
                hidden: true,
                aliases: vec!["l".into()],
                ..leaf("leaf <arg>")
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(tree.describe()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "root",
                "usage": "root",
                "short": "The root",
                "version": "1.2.3",
                "runnable": false,
                "sub_commands": [{
                    "name": "leaf",
                    "usage": "leaf <arg>",
                    "aliases": ["l"],
                    "hidden": true,
                    "runnable": true
                }]
            })
        );
    }
}
