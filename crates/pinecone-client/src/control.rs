//! Control-plane client: index lifecycle.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pinecone_client::{Cloud, Metric, PineconeClient};
//!
//! let pc = PineconeClient::builder(std::env::var("PINECONE_API_KEY")?).build()?;
//! pc.create_serverless_index("docs-quickstart-index", Metric::Cosine, 8, Cloud::Aws, "us-east-1")
//!     .await?;
//! let model = pc
//!     .wait_until_ready("docs-quickstart-index", Duration::from_secs(120), Duration::from_secs(2))
//!     .await?;
//! let index = pc.index_for(&model)?;
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::{PineconeError, Result};
use crate::http::{default_headers, normalize_base_url, send_empty, send_json};
use crate::index::IndexConnection;
use crate::model::{Cloud, CreateIndexRequest, IndexList, IndexModel, Metric};

pub const DEFAULT_CONTROLLER_URL: &str = "https://api.pinecone.io";

/// Builder for [`PineconeClient`].
#[derive(Clone)]
pub struct PineconeClientBuilder {
    api_key: String,
    controller_url: String,
    timeout: Option<Duration>,
}

impl PineconeClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            controller_url: DEFAULT_CONTROLLER_URL.to_string(),
            timeout: None,
        }
    }

    /// Override the control-plane base URL (regional endpoints, local stand-ins).
    pub fn controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = url.into();
        self
    }

    /// Per-request timeout applied by the transport. Unset by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<PineconeClient> {
        if self.api_key.trim().is_empty() {
            return Err(PineconeError::MissingApiKey);
        }
        let mut http =
            reqwest::Client::builder().default_headers(default_headers(self.api_key.trim())?);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build()?;
        Ok(PineconeClient {
            http,
            controller_url: normalize_base_url(&self.controller_url),
        })
    }
}

impl fmt::Debug for PineconeClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeClientBuilder")
            .field("api_key", &"<redacted>")
            .field("controller_url", &self.controller_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Handle to the Pinecone control plane.
///
/// Cheap to clone: the underlying connection pool is shared, and every
/// [`IndexConnection`] it hands out reuses it.
#[derive(Clone)]
pub struct PineconeClient {
    http: reqwest::Client,
    controller_url: String,
}

impl fmt::Debug for PineconeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeClient")
            .field("controller_url", &self.controller_url)
            .finish_non_exhaustive()
    }
}

impl PineconeClient {
    pub fn builder(api_key: impl Into<String>) -> PineconeClientBuilder {
        PineconeClientBuilder::new(api_key)
    }

    pub fn controller_url(&self) -> &str {
        &self.controller_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.controller_url, path)
    }

    // ── Index lifecycle ───────────────────────────────

    pub async fn list_indexes(&self) -> Result<IndexList> {
        tracing::debug!(method = "GET", path = "/indexes");
        send_json(self.http.get(self.url("/indexes"))).await
    }

    pub async fn create_index(&self, request: &CreateIndexRequest) -> Result<IndexModel> {
        if request.name.trim().is_empty() {
            return Err(PineconeError::InvalidArgument("index name must not be empty".into()));
        }
        if request.dimension == 0 {
            return Err(PineconeError::InvalidArgument("dimension must be > 0".into()));
        }
        tracing::debug!(method = "POST", path = "/indexes", index = %request.name);
        send_json(self.http.post(self.url("/indexes")).json(request)).await
    }

    /// Provision a serverless index. The service returns before the index is
    /// queryable; follow up with [`PineconeClient::wait_until_ready`].
    pub async fn create_serverless_index(
        &self,
        name: &str,
        metric: Metric,
        dimension: usize,
        cloud: Cloud,
        region: &str,
    ) -> Result<IndexModel> {
        let request = CreateIndexRequest::serverless(name, metric, dimension, cloud, region);
        self.create_index(&request).await
    }

    pub async fn describe_index(&self, name: &str) -> Result<IndexModel> {
        let path = format!("/indexes/{name}");
        tracing::debug!(method = "GET", path = %path);
        send_json(self.http.get(self.url(&path))).await
    }

    /// Delete an index. Deleting a missing index surfaces the service's 404.
    pub async fn delete_index(&self, name: &str) -> Result<()> {
        let path = format!("/indexes/{name}");
        tracing::debug!(method = "DELETE", path = %path);
        send_empty(self.http.delete(self.url(&path))).await
    }

    /// Poll `describe_index` until the service reports the index ready.
    pub async fn wait_until_ready(
        &self,
        name: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<IndexModel> {
        let started = Instant::now();
        loop {
            let model = self.describe_index(name).await?;
            if model.status.ready {
                tracing::info!(
                    index = %name,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Index is ready"
                );
                return Ok(model);
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(PineconeError::IndexNotReady {
                    name: name.to_string(),
                    waited,
                });
            }
            tracing::debug!(index = %name, state = %model.status.state, "Index not ready yet");
            tokio::time::sleep(poll_interval.min(timeout - waited)).await;
        }
    }

    // ── Data plane ────────────────────────────────────

    /// Open a data-plane connection for `name`, resolving its host first.
    pub async fn index(&self, name: &str) -> Result<IndexConnection> {
        let model = self.describe_index(name).await?;
        self.index_for(&model)
    }

    /// Open a data-plane connection from an already described index.
    pub fn index_for(&self, model: &IndexModel) -> Result<IndexConnection> {
        if model.host.trim().is_empty() {
            return Err(PineconeError::MissingHost {
                name: model.name.clone(),
            });
        }
        Ok(IndexConnection::new(
            self.http.clone(),
            model.name.clone(),
            &model.host,
        ))
    }
}
