//! Frontend records as stored in the Robin registry.
//!
//! The wire format uses kebab-case keys and omits empty, zero and false
//! values. `selectors` is always present.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mode used when a record does not specify one
pub const DEFAULT_MODE: FrontendMode = FrontendMode::Http;

/// Highest selector weight accepted by the registry
pub const MAX_WEIGHT: u8 = 100;

/// Proxy mode of a frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontendMode {
    Http,
    Tcp,
}

impl FrontendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrontendMode::Http => "http",
            FrontendMode::Tcp => "tcp",
        }
    }
}

impl fmt::Display for FrontendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrontendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(FrontendMode::Http),
            "tcp" => Ok(FrontendMode::Tcp),
            other => Err(format!("Unknown mode '{}'. Use 'http' or 'tcp'.", other)),
        }
    }
}

/// A named routing rule exposed by the load balancer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FrontendRecord {
    pub selectors: Vec<FrontendSelectorRecord>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub service: String,

    /// `None` is rendered and treated as `http`
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_mode")]
    pub mode: Option<FrontendMode>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub http_check_path: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub http_check_method: String,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sticky: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub backup: bool,
}

impl FrontendRecord {
    /// Mode after applying the `http` default
    pub fn effective_mode(&self) -> FrontendMode {
        self.mode.unwrap_or(DEFAULT_MODE)
    }

    /// Whether HTTP health check settings are present on a non-HTTP frontend
    pub fn has_ignored_http_checks(&self) -> bool {
        self.effective_mode() != FrontendMode::Http
            && (!self.http_check_path.is_empty() || !self.http_check_method.is_empty())
    }
}

/// A matching condition (domain/path/port) plus priority weight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FrontendSelectorRecord {
    /// 0-100, higher wins when several selectors match
    #[serde(skip_serializing_if = "is_zero_u8")]
    pub weight: u8,

    /// Empty matches any domain
    #[serde(skip_serializing_if = "String::is_empty")]
    pub domain: String,

    /// Empty matches every path
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path_prefix: String,

    #[serde(rename = "port", skip_serializing_if = "is_zero_u16")]
    pub service_port: u16,

    #[serde(skip_serializing_if = "is_zero_u16")]
    pub frontend_port: u16,

    /// Cluster-local only
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub private: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssl_cert: String,
}

fn is_zero_u8(v: &u8) -> bool {
    *v == 0
}

fn is_zero_u16(v: &u16) -> bool {
    *v == 0
}

// An empty string is what older registries send for "unset".
fn deserialize_mode<'de, D>(deserializer: D) -> Result<Option<FrontendMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
