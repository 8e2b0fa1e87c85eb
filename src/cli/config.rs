//! `~/.robinctl/config.toml` and API location resolution
//!
//! Settings come from, in order: command line flags, the config file,
//! `ROBINCTL_*` environment variables, built-in defaults. Frontend commands
//! treat the file as optional: no home directory or an unreadable file
//! leaves the other sources in charge.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::errors::Error;
use crate::registry::http::DEFAULT_API_URL;

/// Environment variable consulted for the API URL
pub const API_URL_ENV: &str = "ROBINCTL_API_URL";

/// Environment variable consulted for the request timeout (seconds)
pub const TIMEOUT_ENV: &str = "ROBINCTL_TIMEOUT";

/// Settings persisted between invocations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// URL of the Robin API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Seconds before a registry request is abandoned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(std::env::var_os)
        .find(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

impl CliConfig {
    /// `~/.robinctl/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        home_dir()
            .map(|home| home.join(".robinctl").join("config.toml"))
            .ok_or_else(|| anyhow!("No home directory: neither HOME nor USERPROFILE is set"))
    }

    /// Configuration for frontend commands. Never fails: a missing home
    /// directory means no file, and a broken file is reported and skipped.
    pub fn load_or_default() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("Skipping configuration file: {:#}", e);
                return Self::default();
            }
        };

        Self::read(&path).unwrap_or_else(|e| {
            warn!("Ignoring configuration file: {:#}", e);
            Self::default()
        })
    }

    /// Read `path`. A file that does not exist reads as an empty configuration.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("Cannot read {}", path.display())),
        };

        toml::from_str(&contents).with_context(|| format!("Cannot parse {}", path.display()))
    }

    /// Write to `path`, creating `~/.robinctl` if needed
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Cannot encode configuration")?;
        std::fs::write(path, contents).with_context(|| format!("Cannot write {}", path.display()))
    }
}

/// Parse and validate an API URL
pub fn parse_api_url(raw: &str) -> crate::Result<Url> {
    if raw.trim().is_empty() {
        return Err(Error::input("api-url cannot be empty"));
    }
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::input(format!("api-url cannot be parsed: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::input(format!("api-url must use http or https, got '{}'", url.scheme())));
    }
    Ok(url)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// API URL from `--api-url`, the config file, `ROBINCTL_API_URL` or the default
pub fn resolve_api_url(flag: Option<String>, config: &CliConfig) -> crate::Result<Url> {
    let (source, raw) = flag
        .map(|url| ("--api-url", url))
        .or_else(|| config.api_url.clone().filter(|u| !u.is_empty()).map(|url| ("config file", url)))
        .or_else(|| env_value(API_URL_ENV).map(|url| (API_URL_ENV, url)))
        .unwrap_or(("default", DEFAULT_API_URL.to_string()));

    debug!(source, api_url = %raw, "Resolved API URL");
    parse_api_url(&raw)
}

/// Request timeout from `--timeout`, the config file or `ROBINCTL_TIMEOUT`.
/// `None` means requests never time out.
pub fn resolve_timeout(flag: Option<u64>, config: &CliConfig) -> crate::Result<Option<Duration>> {
    let seconds = match flag.or(config.timeout) {
        Some(seconds) => Some(seconds),
        None => env_value(TIMEOUT_ENV)
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    Error::config(format!("{} must be a number of seconds, got '{}'", TIMEOUT_ENV, raw))
                })
            })
            .transpose()?,
    };

    if let Some(seconds) = seconds {
        debug!("Request timeout: {} seconds", seconds);
    }
    Ok(seconds.map(Duration::from_secs))
}
