//! cmd::compile
//!
//! Translation of a [`Command`] tree into a `clap::Command` tree plus the
//! parallel [`Node`] tree the executor dispatches on.
//!
//! # Invariants
//!
//! - Every node is validated before anything is compiled; an invalid node
//!   anywhere aborts the whole build.
//! - Node `i` of `Node::children` corresponds to sub-command `i` added to the
//!   clap command of its parent, and carries the same name.
//! - `completion` and `manpages` exist only under the root, and only when
//!   the root has sub-commands.

use clap::{Arg, ArgAction};
use clap_complete::Shell;

use super::{Command, CommandError, FlagSet, NormalizeFn, PositionalArgs, RunFn};

/// Id of the hidden positional catching every argument that is not a flag.
pub(crate) const ARGS_ID: &str = "__args";
pub(crate) const VERSION_FLAG: &str = "version";
pub(crate) const HELP_TREE_FLAG: &str = "help-tree";

const USAGE_TEMPLATE: &str = "{usage-heading} {usage}\n\n{all-args}";
/// Help layout; the command's own text is rendered as `before_help` so that
/// braces in it are printed as written.
const HELP_TEMPLATE: &str = "{before-help}{usage-heading} {usage}\n\n{all-args}";

/// A long flag as seen by argument routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FlagInfo {
    pub(crate) long: String,
    pub(crate) short: Option<char>,
    pub(crate) takes_value: bool,
}

impl FlagInfo {
    fn of(arg: &Arg) -> Option<Self> {
        arg.get_long().map(|long| FlagInfo {
            long: long.to_owned(),
            short: arg.get_short(),
            takes_value: arg.get_action().takes_values(),
        })
    }
}

/// What running a node does.
pub(crate) enum Kind<'a> {
    Run(&'a RunFn),
    Parent,
    Completion(Shell),
    Manpages,
}

/// A compiled command.
pub(crate) struct Node<'a> {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    /// Names from the root down to and including this node.
    pub(crate) path: Vec<String>,
    pub(crate) short: String,
    pub(crate) hidden: bool,
    pub(crate) deprecated: String,
    pub(crate) version: String,
    pub(crate) args: Option<PositionalArgs>,
    pub(crate) kind: Kind<'a>,
    pub(crate) normalize: Option<&'a NormalizeFn>,
    pub(crate) normalize_persistent: Option<&'a NormalizeFn>,
    pub(crate) flags: Vec<FlagInfo>,
    pub(crate) persistent_flags: Vec<FlagInfo>,
    pub(crate) children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    pub(crate) fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The child called `name`, by name or alias.
    pub(crate) fn child(&self, name: &str) -> Option<&Node<'a>> {
        self.children
            .iter()
            .find(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }

    pub(crate) fn command_path(&self) -> String {
        self.path.join(" ")
    }
}

/// The result of compiling a command tree.
pub(crate) struct CompiledTree<'a> {
    pub(crate) root: Node<'a>,
    pub(crate) command: clap::Command,
}

/// Compile `command` as the root of a tree.
pub(crate) fn compile(command: &Command) -> Result<CompiledTree<'_>, CommandError> {
    command.validate_tree()?;
    let (mut root, mut clap) = compile_node(command, &[])?;
    if root.has_children() {
        for (node, sub) in [completion_tree(&root.path), manpages(&root.path)] {
            log::debug!("attaching {} to {}", node.name, root.name);
            clap = clap.subcommand(sub);
            root.children.push(node);
        }
    }
    let clap = modify(command, clap)?;
    Ok(CompiledTree {
        root,
        command: clap,
    })
}

fn compile_node<'a>(
    command: &'a Command,
    parent_path: &[String],
) -> Result<(Node<'a>, clap::Command), CommandError> {
    command.validate()?;
    let has_children = !command.sub_commands.is_empty();
    let meta = Meta {
        usage: &command.usage,
        aliases: &command.aliases,
        short: &command.short,
        long: &command.long,
        hidden: command.hidden || !command.deprecated.is_empty(),
        has_children,
    };
    let mut clap = base_command(&meta, parent_path);
    let mut node = Node {
        name: command.name().to_owned(),
        aliases: command.aliases.clone(),
        path: child_path(parent_path, command.name()),
        short: command.short.trim().to_owned(),
        hidden: command.hidden,
        deprecated: command.deprecated.clone(),
        version: command.version.clone(),
        args: command.args.clone(),
        kind: match &command.run {
            Some(run) => Kind::Run(run),
            None => Kind::Parent,
        },
        normalize: command.normalize_flag.as_ref(),
        normalize_persistent: command.normalize_persistent_flag.as_ref(),
        flags: Vec::new(),
        persistent_flags: Vec::new(),
        children: Vec::new(),
    };

    if let Some(bind) = &command.bind_flags {
        let mut set = FlagSet::new();
        bind(&mut set);
        for arg in set.into_args() {
            let arg = normalize_arg(arg, node.normalize);
            node.flags.extend(FlagInfo::of(&arg));
            clap = clap.arg(arg);
        }
    }
    if let Some(bind) = &command.bind_persistent_flags {
        let mut set = FlagSet::new();
        bind(&mut set);
        for arg in set.into_args() {
            let arg = normalize_arg(arg, node.normalize_persistent).global(true);
            node.persistent_flags.extend(FlagInfo::of(&arg));
            clap = clap.arg(arg);
        }
    }

    for sub_command in &command.sub_commands {
        let (child, sub) = compile_node(sub_command, &node.path)?;
        let sub = modify(sub_command, sub)?;
        clap = clap.subcommand(sub);
        node.children.push(child);
    }
    if has_children {
        clap = clap.arg(help_tree_flag());
    }
    if !command.version.is_empty() {
        clap = clap.arg(version_flag());
    }
    Ok((node, clap))
}

/// Static metadata shared by user-defined and synthetic nodes.
struct Meta<'s> {
    usage: &'s str,
    aliases: &'s [String],
    short: &'s str,
    long: &'s str,
    hidden: bool,
    has_children: bool,
}

fn base_command(meta: &Meta<'_>, parent_path: &[String]) -> clap::Command {
    let name = meta.usage.split_whitespace().next().unwrap_or_default();
    let short = meta.short.trim();
    let long = meta.long.trim();
    let mut cmd = clap::Command::new(name.to_owned())
        .about(short.to_owned())
        .override_usage(usage_line(meta, parent_path))
        .help_template(HELP_TEMPLATE)
        .visible_aliases(meta.aliases.iter().cloned())
        .hide(meta.hidden)
        .arg(
            Arg::new(ARGS_ID)
                .num_args(0..)
                .action(ArgAction::Append)
                .hide(true),
        );
    if !long.is_empty() {
        cmd = cmd.long_about(long.to_owned());
    }
    let text = help_text(short, long);
    if !text.is_empty() {
        cmd = cmd.before_help(text);
    }
    cmd
}

fn usage_line(meta: &Meta<'_>, parent_path: &[String]) -> String {
    let mut line = parent_path.join(" ");
    if !line.is_empty() {
        line.push(' ');
    }
    let path = format!("{line}{}", meta.usage.split_whitespace().next().unwrap_or_default());
    line.push_str(meta.usage.trim());
    if !line.contains("[flags]") {
        line.push_str(" [flags]");
    }
    if meta.has_children {
        line.push_str(&format!("\n       {path} [command]"));
    }
    line
}

/// Short text, blank line, long text. Empty texts are left out.
fn help_text(short: &str, long: &str) -> String {
    [short.trim(), long.trim_end()]
        .into_iter()
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the usage block of a compiled command.
pub(crate) fn usage_string(cmd: &clap::Command) -> String {
    cmd.clone()
        .help_template(USAGE_TEMPLATE)
        .render_help()
        .to_string()
        .trim_end()
        .to_owned()
}

fn child_path(parent_path: &[String], name: &str) -> Vec<String> {
    let mut path = parent_path.to_vec();
    path.push(name.to_owned());
    path
}

fn normalize_arg(arg: Arg, normalize: Option<&NormalizeFn>) -> Arg {
    let normalized = normalize.and_then(|f| arg.get_long().map(|long| f(long)));
    match normalized {
        Some(long) => arg.long(long),
        None => arg,
    }
}

fn modify(command: &Command, clap: clap::Command) -> Result<clap::Command, CommandError> {
    match &command.modify_clap {
        Some(modify) => modify(clap).map_err(|err| CommandError::Modify {
            name: command.name().to_owned(),
            message: format!("{err:#}"),
        }),
        None => Ok(clap),
    }
}

fn version_flag() -> Arg {
    Arg::new(VERSION_FLAG)
        .long(VERSION_FLAG)
        .action(ArgAction::SetTrue)
        .help("Print the version")
}

fn help_tree_flag() -> Arg {
    Arg::new(HELP_TREE_FLAG)
        .long(HELP_TREE_FLAG)
        .action(ArgAction::SetTrue)
        .help("Print the entire sub-command tree")
}

// =============================================================================
// Synthetic commands
// =============================================================================

fn synthetic<'a>(
    meta: Meta<'_>,
    parent_path: &[String],
    args: Option<PositionalArgs>,
    kind: Kind<'a>,
    children: Vec<(Node<'a>, clap::Command)>,
) -> (Node<'a>, clap::Command) {
    let mut clap = base_command(&meta, parent_path);
    let name = meta.usage.split_whitespace().next().unwrap_or_default();
    let mut node = Node {
        name: name.to_owned(),
        aliases: Vec::new(),
        path: child_path(parent_path, name),
        short: meta.short.to_owned(),
        hidden: meta.hidden,
        deprecated: String::new(),
        version: String::new(),
        args,
        kind,
        normalize: None,
        normalize_persistent: None,
        flags: Vec::new(),
        persistent_flags: Vec::new(),
        children: Vec::new(),
    };
    let has_children = !children.is_empty();
    for (child, sub) in children {
        clap = clap.subcommand(sub);
        node.children.push(child);
    }
    if has_children {
        clap = clap.arg(help_tree_flag());
    }
    (node, clap)
}

fn completion_tree<'a>(root_path: &[String]) -> (Node<'a>, clap::Command) {
    let path = child_path(root_path, "completion");
    let shells = [
        ("bash", Shell::Bash),
        ("fish", Shell::Fish),
        ("powershell", Shell::PowerShell),
        ("zsh", Shell::Zsh),
    ];
    let children = shells
        .into_iter()
        .map(|(name, shell)| {
            let short = format!("Generate auto-completion scripts for {name}");
            synthetic(
                Meta {
                    usage: name,
                    aliases: &[],
                    short: &short,
                    long: "",
                    hidden: false,
                    has_children: false,
                },
                &path,
                Some(PositionalArgs::NoArgs),
                Kind::Completion(shell),
                Vec::new(),
            )
        })
        .collect();
    synthetic(
        Meta {
            usage: "completion",
            aliases: &[],
            short: "Generate auto-completion scripts for commonly used shells",
            long: "",
            hidden: false,
            has_children: true,
        },
        root_path,
        None,
        Kind::Parent,
        children,
    )
}

fn manpages<'a>(root_path: &[String]) -> (Node<'a>, clap::Command) {
    synthetic(
        Meta {
            usage: "manpages <output-dir>",
            aliases: &[],
            short: "Generate man pages",
            long: "",
            hidden: true,
            has_children: false,
        },
        root_path,
        Some(PositionalArgs::Exact(1)),
        Kind::Manpages,
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{action, bind, normalize};

    fn leaf(usage: &str) -> Command {
        Command {
            usage: usage.into(),
            run: action(|_, _, _| Ok(())),
            ..Default::default()
        }
    }

    fn names<'n>(node: &'n Node<'_>) -> Vec<&'n str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn leaf_root_gets_no_synthetic_commands() {
        let command = leaf("solo");
        let tree = compile(&command).unwrap();
        assert!(tree.root.children.is_empty());
        assert!(tree.command.find_subcommand("completion").is_none());
    }

    #[test]
    fn parent_root_gets_completion_and_manpages() {
        let command = Command {
            usage: "root".into(),
            sub_commands: vec![leaf("a"), leaf("b")],
            ..Default::default()
        };
        let tree = compile(&command).unwrap();
        assert_eq!(names(&tree.root), vec!["a", "b", "completion", "manpages"]);
        let completion = tree.root.child("completion").unwrap();
        assert_eq!(names(completion), vec!["bash", "fish", "powershell", "zsh"]);
        assert_eq!(completion.path, vec!["root", "completion"]);
        assert!(tree.root.child("manpages").unwrap().hidden);
        assert!(tree.command.find_subcommand("manpages").unwrap().is_hide_set());
    }

    #[test]
    fn invalid_descendant_fails_the_build() {
        let command = Command {
            usage: "root".into(),
            sub_commands: vec![Command {
                usage: "mid".into(),
                sub_commands: vec![Command {
                    long: "only long".into(),
                    ..leaf("bad")
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(compile(&command).err(), Some(CommandError::LongWithoutShort));
    }

    #[test]
    fn flags_are_normalized_at_declaration() {
        let command = Command {
            bind_flags: bind(|f| {
                f.bool("dry_run", None, "Do nothing");
            }),
            normalize_flag: normalize(|name| name.replace('_', "-")),
            ..leaf("x")
        };
        let tree = compile(&command).unwrap();
        assert_eq!(
            tree.root.flags,
            vec![FlagInfo {
                long: "dry-run".into(),
                short: None,
                takes_value: false
            }]
        );
    }

    #[test]
    fn child_lookup_uses_aliases() {
        let command = Command {
            usage: "root".into(),
            sub_commands: vec![Command {
                aliases: vec!["ls".into()],
                ..leaf("list")
            }],
            ..Default::default()
        };
        let tree = compile(&command).unwrap();
        assert_eq!(tree.root.child("ls").map(|c| c.name.as_str()), Some("list"));
    }

    #[test]
    fn help_text_layout() {
        assert_eq!(help_text("Short", "Long text  \n"), "Short\n\nLong text");
        assert_eq!(help_text("Short", ""), "Short");
        assert_eq!(help_text("", ""), "");
    }

    #[test]
    fn deprecated_commands_are_hidden_from_clap_only() {
        let command = Command {
            usage: "root".into(),
            sub_commands: vec![Command {
                deprecated: "use new instead".into(),
                ..leaf("old")
            }],
            ..Default::default()
        };
        let tree = compile(&command).unwrap();
        assert!(tree.command.find_subcommand("old").unwrap().is_hide_set());
        assert!(!tree.root.child("old").unwrap().hidden);
    }

    #[test]
    fn usage_line_includes_parent_path() {
        let meta = Meta {
            usage: "add <file>",
            aliases: &[],
            short: "",
            long: "",
            hidden: false,
            has_children: false,
        };
        assert_eq!(
            usage_line(&meta, &["app".into(), "mod".into()]),
            "app mod add <file> [flags]"
        );
    }

    #[test]
    fn modify_failure_is_a_build_error() {
        let command = Command {
            modify_clap: crate::cmd::modify(|_| anyhow::bail!("nope")),
            ..leaf("x")
        };
        let err = compile(&command).err().unwrap();
        assert!(err.is_build_error());
        assert_eq!(err.to_string(), "modifying command \"x\" failed: nope");
    }
}
