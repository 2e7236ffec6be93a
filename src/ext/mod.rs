//! ext
//!
//! Application-scoped extensions of the process container.
//!
//! # NameContainer
//!
//! [`NameContainer`] binds a container to an application name and derives the
//! application's configuration from the environment:
//!
//! | Value            | Sources, in order                                         |
//! |------------------|-----------------------------------------------------------|
//! | config directory | `<PREFIX>CONFIG_DIR`, `$XDG_CONFIG_HOME/<name>`, platform |
//! | cache directory  | `<PREFIX>CACHE_DIR`, `$XDG_CACHE_HOME/<name>`, platform   |
//! | data directory   | `<PREFIX>DATA_DIR`, `$XDG_DATA_HOME/<name>`, platform     |
//! | port             | `<PREFIX>PORT`, `PORT`, 0                                 |
//!
//! `<PREFIX>` is derived from the name: `my-app` becomes `MY_APP_`.
//!
//! Every value is computed on first use and cached for the lifetime of the
//! container, errors included.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use appcmd::app::{AppContainer, ArgList, EnvMap, Reader, Writer};
//! use appcmd::ext::NameContainer;
//!
//! let base = AppContainer::new(
//!     EnvMap::new([("MY_APP_CONFIG_DIR", "/etc/my-app"), ("PORT", "8080")]),
//!     Reader::empty(),
//!     Writer::discard(),
//!     Writer::discard(),
//!     ArgList::default(),
//! );
//! let container = NameContainer::new(base, "my-app").unwrap();
//! assert_eq!(container.config_dir_path(), Some(Path::new("/etc/my-app")));
//! assert_eq!(container.port(), Ok(8080));
//! ```

use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

use crate::app::{
    ArgContainer, Container, EnvContainer, Reader, StderrContainer, StdinContainer,
    StdoutContainer, Writer,
};

/// Errors from naming a container or reading its configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("app name cannot be empty")]
    EmptyName,

    #[error("invalid app name {0:?}: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidName(String),

    #[error("invalid port {value:?}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// A container bound to an application name.
#[derive(Debug)]
pub struct NameContainer<C> {
    base: C,
    app_name: String,
    prefix: String,
    config_dir: OnceLock<Option<PathBuf>>,
    cache_dir: OnceLock<Option<PathBuf>>,
    data_dir: OnceLock<Option<PathBuf>>,
    port: OnceLock<Result<u16, NameError>>,
}

impl<C: Container> NameContainer<C> {
    /// Bind `base` to `app_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `app_name` is empty or contains characters other
    /// than ASCII alphanumerics, `-` and `_`.
    pub fn new(base: C, app_name: impl Into<String>) -> Result<Self, NameError> {
        let app_name = app_name.into();
        if app_name.is_empty() {
            return Err(NameError::EmptyName);
        }
        if !app_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(NameError::InvalidName(app_name));
        }
        Ok(Self {
            base,
            prefix: env_prefix(&app_name),
            app_name,
            config_dir: OnceLock::new(),
            cache_dir: OnceLock::new(),
            data_dir: OnceLock::new(),
            port: OnceLock::new(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Prefix of the application's environment variables, e.g. `MY_APP_`.
    pub fn env_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn config_dir_path(&self) -> Option<&Path> {
        self.config_dir
            .get_or_init(|| self.dir("CONFIG_DIR", "XDG_CONFIG_HOME", dirs::config_dir))
            .as_deref()
    }

    pub fn cache_dir_path(&self) -> Option<&Path> {
        self.cache_dir
            .get_or_init(|| self.dir("CACHE_DIR", "XDG_CACHE_HOME", dirs::cache_dir))
            .as_deref()
    }

    pub fn data_dir_path(&self) -> Option<&Path> {
        self.data_dir
            .get_or_init(|| self.dir("DATA_DIR", "XDG_DATA_HOME", dirs::data_dir))
            .as_deref()
    }

    /// The port to listen on, 0 if unset.
    pub fn port(&self) -> Result<u16, NameError> {
        self.port
            .get_or_init(|| {
                let key = format!("{}PORT", self.prefix);
                match self.base.env(&key).or_else(|| self.base.env("PORT")) {
                    None => Ok(0),
                    Some(value) => value.parse().map_err(|source| NameError::InvalidPort {
                        value: value.to_owned(),
                        source,
                    }),
                }
            })
            .clone()
    }

    pub fn into_inner(self) -> C {
        self.base
    }

    fn dir(
        &self,
        suffix: &str,
        xdg_key: &str,
        platform: fn() -> Option<PathBuf>,
    ) -> Option<PathBuf> {
        let key = format!("{}{suffix}", self.prefix);
        if let Some(dir) = self.base.env(&key) {
            return Some(PathBuf::from(dir));
        }
        let base = match self.base.env(xdg_key) {
            Some(dir) => Some(PathBuf::from(dir)),
            None => platform(),
        };
        let dir = base.map(|base| base.join(&self.app_name));
        log::debug!("{key} unset, using {dir:?}");
        dir
    }
}

/// Environment variable prefix for `app_name`.
///
/// Upper-cased, with every run of non-alphanumeric characters replaced by a
/// single `_`, and a trailing `_`.
pub fn env_prefix(app_name: &str) -> String {
    let mut prefix = String::with_capacity(app_name.len() + 1);
    for c in app_name.chars() {
        if c.is_ascii_alphanumeric() {
            prefix.push(c.to_ascii_uppercase());
        } else if !prefix.ends_with('_') {
            prefix.push('_');
        }
    }
    if !prefix.ends_with('_') {
        prefix.push('_');
    }
    prefix
}

impl<C: EnvContainer> EnvContainer for NameContainer<C> {
    fn env(&self, key: &str) -> Option<&str> {
        self.base.env(key)
    }

    fn for_each_env(&self, f: &mut dyn FnMut(&str, &str)) {
        self.base.for_each_env(f)
    }
}

impl<C: StdinContainer> StdinContainer for NameContainer<C> {
    fn stdin(&self) -> Reader {
        self.base.stdin()
    }
}

impl<C: StdoutContainer> StdoutContainer for NameContainer<C> {
    fn stdout(&self) -> Writer {
        self.base.stdout()
    }
}

impl<C: StderrContainer> StderrContainer for NameContainer<C> {
    fn stderr(&self) -> Writer {
        self.base.stderr()
    }
}

impl<C: ArgContainer> ArgContainer for NameContainer<C> {
    fn num_args(&self) -> usize {
        self.base.num_args()
    }

    fn arg(&self, i: usize) -> &str {
        self.base.arg(i)
    }
}
