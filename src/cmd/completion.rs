//! cmd::completion
//!
//! Output of the synthetic `completion <shell>` and `manpages <dir>`
//! commands.
//!
//! Both render from the compiled root `clap::Command`, so hidden commands are
//! left out the same way they are left out of help.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};
use clap_complete::{shells, Shell};

use crate::app::Writer;

/// Write the completion script for `shell` to `out`.
pub(crate) fn generate(
    shell: Shell,
    root: &mut clap::Command,
    bin_name: &str,
    out: &mut Writer,
) -> Result<()> {
    // clap_complete panics on write errors, so render into memory first.
    let mut script = Vec::new();
    match shell {
        Shell::Bash => clap_complete::generate(shells::Bash, root, bin_name, &mut script),
        Shell::Zsh => clap_complete::generate(shells::Zsh, root, bin_name, &mut script),
        Shell::Fish => clap_complete::generate(shells::Fish, root, bin_name, &mut script),
        Shell::PowerShell => {
            clap_complete::generate(shells::PowerShell, root, bin_name, &mut script)
        }
        other => anyhow::bail!("unsupported shell: {other}"),
    }
    out.write_all(&script)
        .context("Failed to write completion script")?;
    Ok(())
}

/// Write one man page per visible command under `dir`.
///
/// Pages are named after the command path joined with `-`, e.g.
/// `tool-remote-add.1`.
pub(crate) fn generate_manpages(root: &clap::Command, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let title = root.get_name().to_uppercase();
    let mut pending = vec![(root.get_name().to_owned(), root)];
    while let Some((name, cmd)) = pending.pop() {
        for sub in cmd.get_subcommands() {
            if sub.is_hide_set() || sub.get_name() == "help" {
                continue;
            }
            pending.push((format!("{name}-{}", sub.get_name()), sub));
        }
        let path = dir.join(format!("{name}.1"));
        log::debug!("writing {}", path.display());
        let mut page = Vec::new();
        clap_mangen::Man::new(cmd.clone().name(name))
            .title(title.clone())
            .section("1")
            .render(&mut page)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        fs::write(&path, page).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> clap::Command {
        clap::Command::new("tool")
            .subcommand(clap::Command::new("remote").subcommand(clap::Command::new("add")))
            .subcommand(clap::Command::new("secret").hide(true))
    }

    #[test]
    fn bash_script_names_the_binary() {
        let buffer = crate::cmd::testing::Buffer::new();
        let mut out = Writer::new(buffer.clone());
        generate(Shell::Bash, &mut tree(), "tool", &mut out).unwrap();
        assert!(buffer.contents().contains("tool"));
    }

    #[test]
    fn manpages_skip_hidden_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut root = tree();
        root.build();
        generate_manpages(&root, dir.path()).unwrap();
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["tool-remote-add.1", "tool-remote.1", "tool.1"]);
    }
}
