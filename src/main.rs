//! appcmd-demo - A small command tree built with appcmd.
//!
//! Exists to exercise the framework end to end; see `tests/demo_cli.rs`.

use std::io::{self, Write};

use anyhow::Context as _;
use env_logger::{Builder, Env};

use appcmd::app::{self, Container};
use appcmd::cmd::{self, Command, FlagSet, Flags, InvalidArgumentError, PositionalArgs};
use appcmd::ext::NameContainer;

const NAME: &str = "appcmd-demo";

fn main() {
    Builder::from_env(Env::default().default_filter_or("warn")).init();
    cmd::main(root())
}

fn root() -> Command {
    Command {
        usage: NAME.into(),
        short: "Demonstrate appcmd command trees".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        bind_persistent_flags: cmd::bind(|flags: &mut FlagSet| {
            flags.bool("upper-case", Some('U'), "Upper-case all output");
        }),
        normalize_persistent_flag: cmd::normalize(|name| name.replace('_', "-")),
        sub_commands: vec![echo(), env(), cat(), exit(), dirs()],
        ..Default::default()
    }
}

fn echo() -> Command {
    Command {
        usage: "echo <words...>".into(),
        aliases: vec!["say".into()],
        short: "Print arguments".into(),
        long: "Print the arguments joined by the separator, followed by a newline.".into(),
        args: Some(PositionalArgs::Minimum(1)),
        bind_flags: cmd::bind(|flags| {
            flags.string("separator", Some('s'), " ", "Separator between words");
        }),
        run: cmd::action(|_ctx, container, flags| {
            let words = app::args(container);
            let line = words.join(flags.string("separator").unwrap_or(" "));
            emit(container, flags, &line)
        }),
        ..Default::default()
    }
}

fn env() -> Command {
    Command {
        usage: "env [key]".into(),
        short: "Print environment variables".into(),
        args: Some(PositionalArgs::Maximum(1)),
        run: cmd::action(|_ctx, container, flags| {
            if container.num_args() == 0 {
                return emit(container, flags, &app::environ(container).join("\n"));
            }
            let key = container.arg(0);
            match container.env(key) {
                Some(value) => emit(container, flags, value),
                None => Err(appcmd::exit_error!(2, "{key} is not set").into()),
            }
        }),
        ..Default::default()
    }
}

fn cat() -> Command {
    Command {
        usage: "cat".into(),
        short: "Copy standard input to standard output".into(),
        args: Some(PositionalArgs::NoArgs),
        run: cmd::action(|ctx, container, flags| {
            ctx.check()?;
            let mut input = String::new();
            io::Read::read_to_string(&mut container.stdin(), &mut input)
                .context("Failed to read standard input")?;
            if flags.bool("upper-case") {
                input = input.to_uppercase();
            }
            container.stdout().write_all(input.as_bytes())?;
            Ok(())
        }),
        ..Default::default()
    }
}

fn exit() -> Command {
    Command {
        usage: "exit <code>".into(),
        short: "Exit with the given code".into(),
        args: Some(PositionalArgs::Exact(1)),
        run: cmd::action(|_ctx, container, _flags| {
            let code: i32 = container.arg(0).parse().map_err(|err| {
                InvalidArgumentError::wrap(anyhow::Error::new(err).context("invalid code"))
            })?;
            if code == 0 {
                return Ok(());
            }
            Err(appcmd::exit_error!(code, "exiting with {code}").into())
        }),
        ..Default::default()
    }
}

fn dirs() -> Command {
    Command {
        usage: "dirs".into(),
        short: "Print the application directories and port".into(),
        args: Some(PositionalArgs::NoArgs),
        run: cmd::action(|_ctx, container, flags| {
            let named = NameContainer::new(container, NAME)?;
            let show = |dir: Option<&std::path::Path>| {
                dir.map(|d| d.display().to_string()).unwrap_or_default()
            };
            let lines = [
                format!("config {}", show(named.config_dir_path())),
                format!("cache {}", show(named.cache_dir_path())),
                format!("data {}", show(named.data_dir_path())),
                format!("port {}", named.port()?),
            ];
            emit(&named, flags, &lines.join("\n"))
        }),
        ..Default::default()
    }
}

fn emit(container: &dyn Container, flags: &Flags<'_>, text: &str) -> anyhow::Result<()> {
    let text = if flags.bool("upper-case") {
        text.to_uppercase()
    } else {
        text.to_owned()
    };
    writeln!(container.stdout(), "{text}")?;
    Ok(())
}
