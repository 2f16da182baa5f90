//! HTTP transport for the files service.
//!
//! The service speaks Twirp: every operation is a JSON `POST` to
//! `{endpoint}/twirp/cca.Files/{Method}`. Errors come back as a JSON body
//! with `code` and `msg`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::files::Files;
use cca_core::{
    ArtifactContent, ClientConfig, CreateUploadReq, GetArtifactReq, GetStatusReq, StatusResponse,
    UploadTarget,
};

const SERVICE_PATH: &str = "/twirp/cca.Files";

#[derive(Debug, Deserialize)]
struct TwirpError {
    code: String,
    msg: String,
}

/// Files service client over HTTP with optional bearer auth.
#[derive(Clone)]
pub struct HttpFilesClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for HttpFilesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFilesClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpFilesClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, config))
    }

    /// Use an existing (possibly shared, pre-authenticated) reqwest client.
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    /// Create client from environment. See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying HTTP client, reusable for the byte transfer.
    pub fn http(&self) -> &Client {
        &self.client
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}{}/{}", self.base_url, SERVICE_PATH, method)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn call<T: DeserializeOwned, B: Serialize>(&self, method: &str, body: &B) -> Result<T> {
        let url = self.method_url(method);
        let request = self.client.post(&url).json(body);
        let request = self.apply_auth(request);

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send Files.{} request", method))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(match serde_json::from_str::<TwirpError>(&error_text) {
                Ok(twirp) => anyhow::anyhow!(
                    "Files.{} failed with status {}: {} ({})",
                    method,
                    status,
                    twirp.msg,
                    twirp.code
                ),
                Err(_) => anyhow::anyhow!(
                    "Files.{} failed with status {}: {}",
                    method,
                    status,
                    error_text
                ),
            });
        }

        let body: T = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Files.{} response", method))?;

        Ok(body)
    }
}

#[async_trait]
impl Files for HttpFilesClient {
    async fn create_upload(&self, req: CreateUploadReq) -> Result<UploadTarget> {
        self.call("CreateUpload", &req).await
    }

    async fn get_status(&self, req: GetStatusReq) -> Result<StatusResponse> {
        self.call("GetStatus", &req).await
    }

    async fn get_artifact(&self, req: GetArtifactReq) -> Result<ArtifactContent> {
        self.call("GetArtifact", &req).await
    }
}
