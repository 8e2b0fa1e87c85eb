//! HTTP client for the Robin API
//!
//! Frontends live under `/v1/frontend`. `PUT`/`GET`/`DELETE` act on
//! `/v1/frontend/{id}` and `GET /v1/frontend` returns an object keyed by id.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use super::{FrontendRegistry, RegistryError};
use crate::domain::FrontendRecord;

/// Default location of the Robin API
pub const DEFAULT_API_URL: &str = "http://localhost:8056";

const FRONTEND_PATH: &str = "/v1/frontend";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the Robin API (e.g., "http://localhost:8056")
    pub api_url: Url,

    /// Optional request timeout. Unset means a call can block until the
    /// server or the OS gives up.
    pub timeout: Option<Duration>,

    /// Enable request/response body tracing
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout: None,
            verbose: false,
        }
    }
}

/// Robin API client
#[derive(Debug, Clone)]
pub struct RobinClient {
    client: Client,
    config: ClientConfig,
}

impl RobinClient {
    /// Create a new Robin client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, RegistryError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RegistryError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL
    pub fn api_url(&self) -> &Url {
        &self.config.api_url
    }

    fn url(&self, id: Option<&str>) -> String {
        let base = self.config.api_url.as_str().trim_end_matches('/');
        match id {
            Some(id) => format!("{}{}/{}", base, FRONTEND_PATH, encode_segment(id)),
            None => format!("{}{}", base, FRONTEND_PATH),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RegistryError> {
        let response = request.send().await.map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound);
        }

        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());

            if self.config.verbose {
                trace!("Error response:\n{}", body);
            }

            return Err(RegistryError::Status { status: status.as_u16(), body });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, RegistryError> {
        let body = response.text().await.map_err(|e| RegistryError::Transport(e.to_string()))?;

        if self.config.verbose {
            trace!("Response body:\n{}", body);
        }

        serde_json::from_str(&body).map_err(|e| RegistryError::Decode(format!("{}: {}", e, body)))
    }
}

#[async_trait]
impl FrontendRegistry for RobinClient {
    async fn add(&self, id: &str, record: &FrontendRecord) -> Result<(), RegistryError> {
        let url = self.url(Some(id));
        debug!("PUT {}", url);

        if self.config.verbose {
            let body_json = serde_json::to_string_pretty(record)
                .unwrap_or_else(|_| "<unable to serialize>".to_string());
            trace!("Request body:\n{}", body_json);
        }

        self.send(self.client.put(&url).json(record)).await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<FrontendRecord, RegistryError> {
        let url = self.url(Some(id));
        debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        self.decode(response).await
    }

    async fn all(&self) -> Result<HashMap<String, FrontendRecord>, RegistryError> {
        let url = self.url(None);
        debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        // Older registries answer `null` when nothing is registered.
        let all: Option<HashMap<String, FrontendRecord>> = self.decode(response).await?;
        Ok(all.unwrap_or_default())
    }

    async fn remove(&self, id: &str) -> Result<(), RegistryError> {
        let url = self.url(Some(id));
        debug!("DELETE {}", url);

        self.send(self.client.delete(&url)).await?;
        Ok(())
    }
}

/// Percent-encode an id so it stays a single path segment
fn encode_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes()).collect::<String>().replace('+', "%20")
}
