//! Frontend CLI commands
//!
//! `add`, `get`, `ls` and `rm` against the Robin registry.

use anyhow::{Context, Result};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use clap::{Args, Subcommand};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::output;
use crate::domain::{FrontendMode, FrontendRecord, FrontendSelectorRecord, MAX_WEIGHT};
use crate::errors::Error;
use crate::projection::{self, DEFAULT_FIELDS};
use crate::registry::FrontendRegistry;
use crate::session::{self, signals, SessionOptions, DEFAULT_GRACE_PERIOD};

#[derive(Subcommand, Debug)]
pub enum FrontendCommands {
    /// Add a frontend
    #[command(
        long_about = "Add a frontend to the registry.\n\nThe frontend is built from flags (one selector) or from a JSON document given with --json. With --wait the command blocks until it receives SIGINT or SIGTERM and removes the frontend before exiting.",
        after_help = "EXAMPLES:\n    # Route a.com/ on port 443 to port 8080 of service web\n    robinctl add web --domain a.com --path-prefix / --port 8080 --frontend-port 443\n\n    # Register from JSON (plain or base64) for the lifetime of this process\n    robinctl add web --json \"$FRONTEND_JSON\" --wait"
    )]
    Add(AddArgs),

    /// Show frontends
    #[command(
        after_help = "EXAMPLES:\n    robinctl get web\n    robinctl get web api --output yaml"
    )]
    Get {
        /// Frontend IDs
        #[arg(value_name = "ID")]
        ids: Vec<String>,

        /// Output format (json or yaml)
        #[arg(short, long, default_value = "json", value_parser = ["json", "yaml"])]
        output: String,
    },

    /// List frontends as a table
    Ls {
        /// The fields to include in the list
        #[arg(long, default_value = DEFAULT_FIELDS)]
        fields: String,
    },

    /// Remove frontends
    Rm {
        /// Frontend IDs
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// ID of the new frontend
    #[arg(value_name = "ID")]
    pub positional_id: Option<String>,

    /// ID of the new frontend (takes precedence over the positional ID; defaults to --service)
    #[arg(long = "id", value_name = "ID")]
    pub id: Option<String>,

    /// Frontend formatted as JSON (can be base64 encoded). Frontend and selector flags are ignored.
    #[arg(long, value_name = "PAYLOAD")]
    pub json: Option<String>,

    /// Add the frontend, wait until termination, then remove it
    #[arg(long)]
    pub wait: bool,

    /// Seconds the final remove may take in --wait mode before giving up
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_GRACE_PERIOD.as_secs())]
    pub grace_period: u64,

    /// Service that is providing the frontend
    #[arg(long, default_value = "")]
    pub service: String,

    /// Mode of the frontend (http|tcp)
    #[arg(long)]
    pub mode: Option<FrontendMode>,

    /// Path for HTTP health checks
    #[arg(long, default_value = "")]
    pub http_check_path: String,

    /// HTTP method for health checks
    #[arg(long, default_value = "")]
    pub http_check_method: String,

    /// Send requests to the same server when possible
    #[arg(long)]
    pub sticky: bool,

    /// Only send requests here when other frontends with the same selectors are down
    #[arg(long)]
    pub backup: bool,

    /// A value between 0-100 used for prioritizing frontends (100 most important)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=MAX_WEIGHT as i64))]
    pub weight: u8,

    /// The domain to select for this frontend
    #[arg(long, default_value = "")]
    pub domain: String,

    /// The path-prefix to select for this frontend
    #[arg(long, default_value = "")]
    pub path_prefix: String,

    /// The port on the service to forward requests for this frontend to
    #[arg(long = "port", default_value_t = 0)]
    pub service_port: u16,

    /// The port on the load-balancer host for this frontend to listen on
    #[arg(long, default_value_t = 0)]
    pub frontend_port: u16,

    /// Make this a cluster-local frontend
    #[arg(long)]
    pub private: bool,

    /// Name of the SSL certificate to use for this frontend
    #[arg(long, default_value = "")]
    pub ssl_cert: String,
}

impl AddArgs {
    /// `--id`, then the positional ID, then `--service`
    pub fn resolve_id(&self) -> crate::Result<String> {
        [self.id.as_deref(), self.positional_id.as_deref(), Some(self.service.as_str())]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::input("No frontend ID given. Pass an ID, --id or --service"))
    }

    /// Record built from flags, always with exactly one selector
    pub fn record_from_flags(&self) -> FrontendRecord {
        FrontendRecord {
            service: self.service.clone(),
            mode: self.mode,
            http_check_path: self.http_check_path.clone(),
            http_check_method: self.http_check_method.clone(),
            sticky: self.sticky,
            backup: self.backup,
            selectors: vec![FrontendSelectorRecord {
                weight: self.weight,
                domain: self.domain.clone(),
                path_prefix: self.path_prefix.clone(),
                service_port: self.service_port,
                frontend_port: self.frontend_port,
                private: self.private,
                ssl_cert: self.ssl_cert.clone(),
            }],
        }
    }

    /// The record to submit: the JSON payload as-is when given, flags otherwise
    pub fn build_record(&self) -> crate::Result<FrontendRecord> {
        match &self.json {
            Some(payload) => decode_json_payload(payload),
            None => Ok(self.record_from_flags()),
        }
    }
}

/// Examples for `ls --help`, naming every known field
pub fn ls_after_help() -> String {
    format!(
        "EXAMPLES:\n    robinctl ls\n    robinctl ls --fields={}",
        projection::all_field_ids().join(",")
    )
}

/// Parse a frontend from JSON, accepting base64-encoded JSON as well
pub fn decode_json_payload(payload: &str) -> crate::Result<FrontendRecord> {
    let decoded = BASE64_STANDARD
        .decode(payload.trim())
        .ok()
        .and_then(|raw| String::from_utf8(raw).ok());
    if decoded.is_some() {
        debug!("JSON payload was base64 encoded");
    }
    let data = decoded.as_deref().unwrap_or(payload);

    serde_json::from_str(data).map_err(|e| Error::input(format!("Failed to parse JSON: {}", e)))
}

/// Handle frontend commands
pub async fn handle_frontend_command(
    command: FrontendCommands,
    registry: &dyn FrontendRegistry,
) -> Result<()> {
    match command {
        FrontendCommands::Add(args) => add_frontend(&args, registry).await?,
        FrontendCommands::Get { ids, output } => get_frontends(registry, &ids, &output).await?,
        FrontendCommands::Ls { fields } => {
            if let Some(table) = list_frontends(registry, &fields).await? {
                print!("{}", table);
            }
        }
        FrontendCommands::Rm { ids } => remove_frontends(registry, &ids).await?,
    }

    Ok(())
}

async fn add_frontend(args: &AddArgs, registry: &dyn FrontendRegistry) -> Result<()> {
    let id = args.resolve_id()?;
    let record = args.build_record()?;

    if record.has_ignored_http_checks() {
        warn!("HTTP health check settings are ignored for {} frontends", record.effective_mode());
    }

    // Handlers go in before the add. A signal during the add is bounded by
    // the grace period in session::run.
    let shutdown = CancellationToken::new();
    let listener = if args.wait {
        Some(
            signals::listen_for_termination(shutdown.clone())
                .context("Failed to install termination signal handlers")?,
        )
    } else {
        None
    };

    let options =
        SessionOptions { wait: args.wait, grace_period: Duration::from_secs(args.grace_period) };
    let result = session::run(registry, &id, &record, options, &shutdown).await;

    if let Some(listener) = listener {
        listener.abort();
    }
    result.map_err(Error::from)?;

    Ok(())
}

async fn get_frontends(registry: &dyn FrontendRegistry, ids: &[String], output: &str) -> Result<()> {
    for id in ids {
        let record = registry
            .get(id)
            .await
            .map_err(|e| Error::registry(format!("Failed to get frontend '{}'", id), e))?;
        output::print_output(&record, output)
            .with_context(|| format!("Failed to marshal frontend '{}'", id))?;
    }
    Ok(())
}

/// Render the `ls` table. `None` when the registry holds no frontends.
///
/// Field names are checked before the registry is contacted.
pub async fn list_frontends(
    registry: &dyn FrontendRegistry,
    fields: &str,
) -> crate::Result<Option<String>> {
    let columns = projection::parse_field_list(fields)?;

    let records =
        registry.all().await.map_err(|e| Error::registry("Failed to list frontends", e))?;

    if records.is_empty() {
        info!("No frontends found.");
        return Ok(None);
    }

    Ok(Some(projection::project(&records, &columns).render()))
}

async fn remove_frontends(registry: &dyn FrontendRegistry, ids: &[String]) -> Result<()> {
    for id in ids {
        registry
            .remove(id)
            .await
            .map_err(|e| Error::registry(format!("Failed to remove frontend '{}'", id), e))?;
        info!("Removed frontend '{}'", id);
    }
    Ok(())
}
