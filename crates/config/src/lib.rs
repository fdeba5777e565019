//! Recording configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A configuration file: TOML, YAML or JSON, chosen by extension (TOML when
//!    there is none). Either given explicitly, or `config.toml` in the
//!    platform's configuration directory if it exists.
//! 3. Environment variables prefixed with `RECSTORE_` (`RECSTORE_SHIP_NAME`,
//!    `RECSTORE_FORMAT`, ...).
//!
//! Loading always [validates](Config::validate) the result.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use recstore_path::{PathFormat, Placeholder, RecordFormat, add_extension};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "RECSTORE_";
/// Format string used when none is configured.
pub const DEFAULT_PATH: &str = "./recordings/%path/%Y-%m-%d_%H-%M-%S-%f";

/// Time placeholders that together pin down a segment's start when `%s` is
/// absent.
const CALENDAR_PLACEHOLDERS: [Placeholder; 6] = [
    Placeholder::Year,
    Placeholder::Month,
    Placeholder::Day,
    Placeholder::Hour,
    Placeholder::Minute,
    Placeholder::Second,
];

/// Recording settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Format string segments are written to and listed from, without the
    /// file extension.
    pub path: String,
    /// Container format; decides the file extension.
    pub format: RecordFormat,
    /// Label substituted for `%ship_name`.
    pub ship_name: String,
    /// Segments older than this many seconds are pruned. `None` or `0` keeps
    /// everything.
    pub delete_after: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH.to_string(),
            format: RecordFormat::default(),
            ship_name: String::new(),
            delete_after: None,
        }
    }
}

impl Config {
    /// Loads configuration from defaults, `file` (or the default location),
    /// and the environment, then validates it.
    ///
    /// An explicit `file` must exist. The default location is optional.
    #[instrument(level = "debug", skip_all, fields(file = ?file.map(Path::display)))]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(file) = file
            && !file.is_file()
        {
            exn::bail!(ErrorKind::NotFound(file.to_path_buf()));
        }
        let file = file.map(Path::to_path_buf).or_else(Self::default_file);
        Self::from_figment(Self::figment(file.as_deref()).merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Builds the defaults-then-file layers, without the environment.
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        let Some(file) = file else {
            return figment;
        };
        match file.extension().and_then(OsStr::to_str) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
            Some("json") => figment.merge(Json::file(file)),
            _ => figment.merge(Toml::file(file)),
        }
    }

    /// Extracts and validates a configuration from any [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(path = %config.path, format = %config.format, "loaded recording configuration");
        Ok(config)
    }

    /// `config.toml` in the platform's configuration directory.
    pub fn default_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", "recstore").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Checks that the format string can identify segments.
    ///
    /// It must contain `%path`, and either `%s` or every one of `%Y %m %d %H
    /// %M %S`. The codec itself accepts any format; this is where that policy
    /// lives.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ErrorKind::Invalid { field: "path", reason };
        let format = PathFormat::new(self.record_path()).or_raise(|| invalid("cannot be compiled".to_string()))?;
        if !format.contains(Placeholder::Path) {
            exn::bail!(invalid(format!("'{}' is missing {}", self.path, Placeholder::Path)));
        }
        if !format.contains(Placeholder::UnixSeconds) {
            let missing: Vec<&str> = CALENDAR_PLACEHOLDERS
                .iter()
                .filter(|p| !format.contains(**p))
                .map(Placeholder::as_str)
                .collect();
            if !missing.is_empty() {
                exn::bail!(invalid(format!(
                    "'{}' needs either {} or all of {}, missing {}",
                    self.path,
                    Placeholder::UnixSeconds,
                    CALENDAR_PLACEHOLDERS.map(|p| p.as_str()).join(" "),
                    missing.join(" ")
                )));
            }
        }
        Ok(())
    }

    /// The full format string, with the extension of the record format.
    pub fn record_path(&self) -> String {
        add_extension(&self.path, self.format)
    }

    /// How long segments are kept, if pruning is enabled.
    pub fn retention(&self) -> Option<Duration> {
        self.delete_after.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}
