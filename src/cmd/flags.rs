//! cmd::flags
//!
//! Flag declaration and access.
//!
//! # Design
//!
//! Commands declare flags by filling a [`FlagSet`] from their bind
//! callbacks. Actions read parsed values through [`Flags`], keyed by the name
//! the flag was declared with, regardless of how the user spelled it on the
//! command line (see flag-name normalization on [`crate::cmd::Command`]).
//!
//! Persistent flags are declared on a parent and are readable from every
//! descendant's [`Flags`].

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};

use super::error::CommandError;

/// Flags declared by a command.
#[derive(Debug, Default)]
pub struct FlagSet {
    args: Vec<Arg>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a boolean flag.
    pub fn bool(&mut self, name: &str, shorthand: Option<char>, usage: &str) -> &mut Self {
        self.push(name, shorthand, usage, |arg| arg.action(ArgAction::SetTrue))
    }

    /// Declare a string flag with a default value.
    ///
    /// An empty default means the flag has no value unless given.
    pub fn string(
        &mut self,
        name: &str,
        shorthand: Option<char>,
        default: &str,
        usage: &str,
    ) -> &mut Self {
        let default = default.to_owned();
        self.push(name, shorthand, usage, move |arg| {
            let arg = arg.action(ArgAction::Set).value_name("STRING");
            if default.is_empty() {
                arg
            } else {
                arg.default_value(default)
            }
        })
    }

    /// Declare a repeatable string flag.
    pub fn strings(&mut self, name: &str, shorthand: Option<char>, usage: &str) -> &mut Self {
        self.push(name, shorthand, usage, |arg| {
            arg.action(ArgAction::Append).value_name("STRING")
        })
    }

    /// Declare an integer flag with a default value.
    pub fn int(
        &mut self,
        name: &str,
        shorthand: Option<char>,
        default: i64,
        usage: &str,
    ) -> &mut Self {
        self.push(name, shorthand, usage, move |arg| {
            arg.action(ArgAction::Set)
                .value_name("INT")
                .value_parser(clap::value_parser!(i64))
                .default_value(default.to_string())
        })
    }

    /// Declare a flag from a raw [`clap::Arg`].
    pub fn arg(&mut self, arg: Arg) -> &mut Self {
        self.args.push(arg);
        self
    }

    /// Mark the flag `name` as required.
    pub fn mark_required(&mut self, name: &str) -> Result<(), CommandError> {
        let arg = self
            .args
            .iter_mut()
            .find(|a| a.get_id() == name)
            .ok_or_else(|| CommandError::UnknownFlag(name.to_owned()))?;
        *arg = std::mem::take(arg).required(true);
        Ok(())
    }

    /// Whether a flag called `name` was declared.
    pub fn contains(&self, name: &str) -> bool {
        self.args.iter().any(|a| a.get_id() == name)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub(crate) fn into_args(self) -> Vec<Arg> {
        self.args
    }

    fn push(
        &mut self,
        name: &str,
        shorthand: Option<char>,
        usage: &str,
        configure: impl FnOnce(Arg) -> Arg,
    ) -> &mut Self {
        let mut arg = Arg::new(name.to_owned())
            .long(name.to_owned())
            .help(usage.to_owned());
        if let Some(short) = shorthand {
            arg = arg.short(short);
        }
        self.args.push(configure(arg));
        self
    }
}

/// Combine several bind callbacks into one.
pub fn bind_multiple<I>(binds: I) -> impl Fn(&mut FlagSet)
where
    I: IntoIterator<Item = Box<dyn Fn(&mut FlagSet)>>,
{
    let binds: Vec<_> = binds.into_iter().collect();
    move |flags: &mut FlagSet| {
        for bind in &binds {
            bind(flags);
        }
    }
}

/// Parsed flag values of the executing command.
#[derive(Debug, Clone, Copy)]
pub struct Flags<'m> {
    matches: &'m ArgMatches,
}

impl<'m> Flags<'m> {
    pub(crate) fn new(matches: &'m ArgMatches) -> Self {
        Self { matches }
    }

    /// Value of a boolean flag; false if unknown.
    pub fn bool(&self, name: &str) -> bool {
        self.matches
            .try_get_one::<bool>(name)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    }

    /// Value of a string flag, including its default.
    pub fn string(&self, name: &str) -> Option<&'m str> {
        self.matches
            .try_get_one::<String>(name)
            .ok()
            .flatten()
            .map(String::as_str)
    }

    /// All values of a repeatable string flag.
    pub fn strings(&self, name: &str) -> Vec<&'m str> {
        self.matches
            .try_get_many::<String>(name)
            .ok()
            .flatten()
            .map(|values| values.map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Value of an integer flag, including its default.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.matches.try_get_one::<i64>(name).ok().flatten().copied()
    }

    /// Whether the flag was given on the command line, as opposed to
    /// taking its default.
    pub fn changed(&self, name: &str) -> bool {
        self.matches
            .try_contains_id(name)
            .unwrap_or(false)
            && self.matches.value_source(name) == Some(ValueSource::CommandLine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(flags: FlagSet, argv: &[&str]) -> ArgMatches {
        let mut cmd = clap::Command::new("t");
        for arg in flags.into_args() {
            cmd = cmd.arg(arg);
        }
        cmd.try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn declared_flags_parse() {
        let mut set = FlagSet::new();
        set.bool("verbose", Some('v'), "Be loud")
            .string("format", None, "text", "Output format")
            .strings("include", Some('I'), "Include path")
            .int("depth", None, 3, "Depth");
        let matches = parse(set, &["t", "-v", "--include", "a", "-I", "b", "--depth", "7"]);
        let flags = Flags::new(&matches);
        assert!(flags.bool("verbose"));
        assert_eq!(flags.string("format"), Some("text"));
        assert!(!flags.changed("format"));
        assert_eq!(flags.strings("include"), vec!["a", "b"]);
        assert_eq!(flags.int("depth"), Some(7));
        assert!(flags.changed("depth"));
    }

    #[test]
    fn unknown_names_are_empty() {
        let matches = parse(FlagSet::new(), &["t"]);
        let flags = Flags::new(&matches);
        assert!(!flags.bool("missing"));
        assert_eq!(flags.string("missing"), None);
        assert!(flags.strings("missing").is_empty());
        assert!(!flags.changed("missing"));
    }

    #[test]
    fn mark_required_unknown_flag_fails() {
        let mut set = FlagSet::new();
        set.string("name", None, "", "Name");
        assert!(set.mark_required("name").is_ok());
        assert_eq!(
            set.mark_required("other"),
            Err(CommandError::UnknownFlag("other".to_string()))
        );
    }

    #[test]
    fn bind_multiple_runs_all() {
        let bind = bind_multiple([
            Box::new(|f: &mut FlagSet| {
                f.bool("a", None, "A");
            }) as Box<dyn Fn(&mut FlagSet)>,
            Box::new(|f: &mut FlagSet| {
                f.bool("b", None, "B");
            }),
        ]);
        let mut set = FlagSet::new();
        bind(&mut set);
        assert!(set.contains("a") && set.contains("b"));
        assert_eq!(set.len(), 2);
    }
}
