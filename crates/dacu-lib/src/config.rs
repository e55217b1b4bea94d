//! Reading and interpreting the project configuration.

use std::collections::BTreeMap;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::stdx::result::ResultEx;

/// The name of the config file inside the store directory.
pub const CONFIG_NAME: &str = "config.toml";

/// The config which can be read from `.dacu/config.toml`. Every field is
/// optional, a missing file is equivalent to an empty one.
///
/// ```toml
/// strict = false
/// timeout = 2000
///
/// [languages.sh]
/// kind = "interpreted"
/// program = "sh"
/// ```
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Whether outputs are compared byte for byte by default.
    pub strict: Option<bool>,

    /// The time limit of a single dataset run in milliseconds.
    pub timeout: Option<u64>,

    /// Additional or overridden language adapters keyed by file extension.
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageConfig>,
}

/// A configured language adapter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LanguageConfig {
    /// A compiler which turns `<name>.<ext>` into the executable `<name>`.
    Native {
        /// The compiler binary.
        program: String,

        /// Arguments passed before the source file.
        #[serde(default)]
        args: Vec<String>,
    },

    /// An interpreter which runs the source file directly.
    Interpreted {
        /// The interpreter binary.
        program: String,

        /// Arguments passed before the source file.
        #[serde(default)]
        args: Vec<String>,
    },
}

/// An error which can occur while reading the config.
#[derive(Debug, Error)]
pub enum Error {
    /// The config file could not be parsed.
    #[error("couldn't parse config")]
    Toml(#[from] toml::de::Error),

    /// An io error occurred.
    #[error("an io error occurred")]
    Io(#[from] io::Error),
}

impl Config {
    /// Parses a config from its toml source.
    pub fn parse(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    /// Reads the config at the given path, a missing file yields the default
    /// config.
    #[tracing::instrument]
    pub fn read(path: &Path) -> Result<Self, Error> {
        let Some(source) =
            std::fs::read_to_string(path).ignore(|e| e.kind() == ErrorKind::NotFound)?
        else {
            tracing::debug!("no config found, using defaults");
            return Ok(Self::default());
        };

        Self::parse(&source)
    }

    /// Returns whether strict comparison is enabled, defaults to `false`.
    pub fn strict_fallback(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    /// Returns the run time limit, if any.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }
}
