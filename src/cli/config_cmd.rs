//! `robinctl config`: inspect and edit `~/.robinctl/config.toml`

use anyhow::{bail, Result};
use clap::{Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::fmt;
use std::path::Path;

use super::config::{parse_api_url, CliConfig};
use super::output;
use crate::errors::Error;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write an empty configuration file
    Init {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the stored settings
    Show {
        /// Output format (json or yaml)
        #[arg(short, long, default_value = "yaml", value_parser = ["json", "yaml"])]
        output: String,
    },

    /// Store one setting
    Set {
        /// Setting to change
        key: ConfigKey,

        /// New value
        value: String,
    },

    /// Print where the configuration file lives
    Path,
}

/// Settings that can be stored in the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ConfigKey {
    /// URL of the Robin API
    ApiUrl,
    /// Request timeout in seconds
    Timeout,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiUrl => "api_url",
            ConfigKey::Timeout => "timeout",
        }
    }

    /// Validate `value` and store it in `config`. `config` is untouched on error.
    pub fn apply(self, config: &mut CliConfig, value: &str) -> crate::Result<()> {
        match self {
            ConfigKey::ApiUrl => {
                parse_api_url(value)?;
                config.api_url = Some(value.trim().to_string());
            }
            ConfigKey::Timeout => {
                let seconds = value.trim().parse().map_err(|_| {
                    Error::config(format!("timeout must be a number of seconds, got '{}'", value))
                })?;
                config.timeout = Some(seconds);
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle config commands
pub async fn handle_config_command(command: ConfigCommands) -> Result<()> {
    let path = CliConfig::config_path()?;

    match command {
        ConfigCommands::Init { force } => init_config(&path, force),
        ConfigCommands::Show { output } => {
            output::print_output(&CliConfig::read(&path)?, &output)
        }
        ConfigCommands::Set { key, value } => set_config(&path, key, &value),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, pass --force to replace it", path.display());
    }

    CliConfig::default().write(path)?;
    println!("{} {}", "Created".green(), path.display());
    Ok(())
}

fn set_config(path: &Path, key: ConfigKey, value: &str) -> Result<()> {
    let mut config = CliConfig::read(path)?;
    key.apply(&mut config, value)?;
    config.write(path)?;

    println!("{} {} = {} in {}", "Stored".green(), key, value.trim(), path.display());
    Ok(())
}
