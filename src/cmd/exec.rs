//! cmd::exec
//!
//! Parsing and dispatch of a compiled command tree.
//!
//! # Flow
//!
//! 1. Compile the tree. Build errors are returned before anything is parsed.
//! 2. Route the arguments through the node tree to find the node the user
//!    is addressing and rewrite long flags through the normalizers in scope.
//! 3. Parse with clap. Help and version requests are answered on standard
//!    output; parse errors print the routed node's usage.
//! 4. Run the selected node: deprecation notice, argument validation,
//!    built-in flags and finally the node's action.

use std::io::Write;
use std::path::Path;

use clap::error::ErrorKind;
use clap::ArgMatches;

use super::compile::{
    self, CompiledTree, FlagInfo, Kind, Node, ARGS_ID, HELP_TREE_FLAG, VERSION_FLAG,
};
use super::{completion, help_tree, Command, CommandError, Flags};
use crate::app::{self, output, Container, Context, Writer};

const COMPLETE_PREFIX: &str = "__complete";

/// Run `command` with the arguments of `container`.
///
/// The first argument is the program name and is skipped.
pub(crate) fn execute(
    ctx: &Context,
    container: &dyn Container,
    command: &Command,
) -> anyhow::Result<()> {
    let CompiledTree {
        root,
        command: mut clap,
    } = compile::compile(command)?;

    let args: Vec<String> = app::args(container).into_iter().skip(1).collect();
    let sink = if args.iter().any(|arg| arg.starts_with(COMPLETE_PREFIX)) {
        container.stdout()
    } else {
        container.stderr()
    };

    let (routed, args) = route(&root, args);
    log::debug!("routed to {:?}", routed);

    let argv = std::iter::once(root.name.clone()).chain(args);
    let matches = match clap.try_get_matches_from_mut(argv) {
        Ok(matches) => matches,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    write!(container.stdout(), "{}", err.render())?;
                    Ok(())
                }
                _ => {
                    print_usage(sink, &mut clap, &routed);
                    Err(CommandError::Parse(parse_message(&err)).into())
                }
            };
        }
    };

    let (node, matches) = select(&root, &matches);
    run_node(ctx, container, sink, &mut clap, node, matches)
}

fn run_node(
    ctx: &Context,
    container: &dyn Container,
    mut sink: Writer,
    clap: &mut clap::Command,
    node: &Node<'_>,
    matches: &ArgMatches,
) -> anyhow::Result<()> {
    if !node.deprecated.is_empty() {
        let _ = writeln!(
            sink,
            "Command {:?} is deprecated, {}",
            node.name, node.deprecated
        );
    }

    let args: Vec<String> = matches
        .try_get_many::<String>(ARGS_ID)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if let Some(validator) = &node.args {
        if let Err(err) = validator.validate(&node.command_path(), &args) {
            print_usage(sink, clap, &node.path);
            return Err(err);
        }
    }

    let flags = Flags::new(matches);
    if !node.version.is_empty() && flags.bool(VERSION_FLAG) {
        writeln!(container.stdout(), "{}", node.version)?;
        return Ok(());
    }
    if node.has_children() && flags.bool(HELP_TREE_FLAG) {
        write!(container.stdout(), "{}", help_tree::render(node))?;
        return Ok(());
    }

    match node.kind {
        Kind::Run(run) => {
            let view = app::with_args(container, args);
            let result = run(ctx, &view, &flags);
            if let Err(err) = &result {
                if super::is_invalid_argument(err) {
                    print_usage(container.stderr(), clap, &node.path);
                }
            }
            result
        }
        Kind::Parent => {
            print_usage(container.stderr(), clap, &node.path);
            if args.is_empty() {
                Err(CommandError::SubCommandRequired.into())
            } else {
                Err(CommandError::UnknownSubCommand(args).into())
            }
        }
        Kind::Completion(shell) => {
            let root = node.path.first().map(String::as_str).unwrap_or_default();
            completion::generate(shell, clap, root, &mut container.stdout())
        }
        Kind::Manpages => {
            let dir = args.first().map(String::as_str).unwrap_or_default();
            completion::generate_manpages(clap, Path::new(dir))
        }
    }
}

/// Follow the sub-commands clap matched down to the selected node.
fn select<'n, 'a, 'm>(
    root: &'n Node<'a>,
    matches: &'m ArgMatches,
) -> (&'n Node<'a>, &'m ArgMatches) {
    let mut node = root;
    let mut matches = matches;
    while let Some((name, sub_matches)) = matches.subcommand() {
        match node.child(name) {
            Some(child) => {
                node = child;
                matches = sub_matches;
            }
            // clap's own help command; it never gets this far.
            None => break,
        }
    }
    (node, matches)
}

/// Walk `args` through the tree, returning the path of the addressed node
/// and the arguments with long flags normalized.
///
/// Descending stops at the first positional argument that does not name a
/// child, mirroring how sub-commands are matched during parsing.
fn route(root: &Node<'_>, args: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut stack: Vec<&Node<'_>> = vec![root];
    let mut out = Vec::with_capacity(args.len());
    let mut positional_seen = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--" {
            out.push(arg);
            out.extend(args.by_ref());
            break;
        }
        if let Some(flag) = arg.strip_prefix("--") {
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            let (name, info) = resolve_long(&stack, name);
            out.push(match value {
                Some(value) => format!("--{name}={value}"),
                None => format!("--{name}"),
            });
            if value.is_none() && info.is_some_and(|f| f.takes_value) {
                out.extend(args.next());
            }
            continue;
        }
        if arg.len() == 2 && arg.starts_with('-') {
            let short = arg.chars().nth(1);
            let takes_value = find_flag(&stack, |f| short.is_some() && f.short == short)
                .is_some_and(|f| f.takes_value);
            out.push(arg);
            if takes_value {
                out.extend(args.next());
            }
            continue;
        }
        if !arg.starts_with('-') && !positional_seen {
            let current = stack.last().copied().unwrap_or(root);
            match current.child(&arg) {
                Some(child) => stack.push(child),
                None => positional_seen = true,
            }
        }
        out.push(arg);
    }

    let path = stack
        .last()
        .map(|node| node.path.clone())
        .unwrap_or_default();
    (path, out)
}

/// Resolve a long flag name against the nodes on `stack`.
///
/// The current node's own normalizer is tried first, then the persistent
/// normalizers from the nearest ancestor outwards. The first candidate naming
/// a declared flag wins; otherwise `name` is kept as given.
fn resolve_long<'s>(stack: &[&'s Node<'_>], name: &str) -> (String, Option<&'s FlagInfo>) {
    let mut candidates = Vec::new();
    if let Some(current) = stack.last().copied() {
        if let Some(normalize) = current.normalize {
            let normalized = normalize(name);
            if let Some(info) = current.flags.iter().find(|f| f.long == normalized) {
                return (normalized, Some(info));
            }
        }
    }
    for node in stack.iter().rev().copied() {
        if let Some(normalize) = node.normalize_persistent {
            candidates.push(normalize(name));
        }
    }
    for candidate in candidates {
        if let Some(info) = find_flag(stack, |f| f.long == candidate) {
            return (candidate, Some(info));
        }
    }
    let info = find_flag(stack, |f| f.long == name);
    (name.to_owned(), info)
}

/// A flag visible at the top of `stack`: the current node's own flags or the
/// persistent flags of any node on the path.
fn find_flag<'s>(
    stack: &[&'s Node<'_>],
    matches: impl Fn(&FlagInfo) -> bool,
) -> Option<&'s FlagInfo> {
    let current: &'s Node<'_> = stack.last().copied()?;
    current
        .flags
        .iter()
        .chain(
            stack
                .iter()
                .rev()
                .copied()
                .flat_map(|node| node.persistent_flags.iter()),
        )
        .find(|f| matches(f))
}

fn parse_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_owned()
}

fn print_usage(mut sink: Writer, clap: &mut clap::Command, path: &[String]) {
    if let Some(usage) = usage_of(clap, path) {
        output::write_line(&mut sink, &usage);
    }
}

/// Usage block of the command at `path`, the root name included.
fn usage_of(root: &mut clap::Command, path: &[String]) -> Option<String> {
    root.build();
    let mut cmd = &*root;
    for name in path.iter().skip(1) {
        cmd = cmd.find_subcommand(name)?;
    }
    Some(compile::usage_string(cmd))
}
