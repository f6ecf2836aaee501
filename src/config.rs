use std::time::Duration;

use pinecone_client::{Cloud, Metric, DEFAULT_CONTROLLER_URL};

pub const API_KEY_ENV: &str = "PINECONE_API_KEY";
pub const CONTROLLER_URL_ENV: &str = "PINECONE_CONTROLLER_URL";

pub const DEFAULT_INDEX_NAME: &str = "docs-quickstart-index";
pub const DEFAULT_DIMENSION: usize = 8;
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SAMPLES: usize = 8;
pub const NAMESPACE_1: &str = "ns1";
pub const NAMESPACE_2: &str = "ns2";

/// Transport settings shared by every client a session builds.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub controller_url: String,
    /// Per-request transport timeout; `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            controller_url: DEFAULT_CONTROLLER_URL.to_string(),
            request_timeout: None,
        }
    }
}

/// How the workflow waits for a freshly created index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessWait {
    /// Poll `describe_index` until `status.ready`, giving up after `timeout`.
    Poll { timeout: Duration, interval: Duration },
    /// Sleep a fixed duration and hope the index is up.
    Fixed(Duration),
}

impl Default for ReadinessWait {
    fn default() -> Self {
        Self::Poll {
            timeout: Duration::from_secs(120),
            interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub index_name: String,
    pub metric: Metric,
    pub dimension: usize,
    pub cloud: Cloud,
    pub region: String,
    /// Number of sample vectors upserted, split between the two namespaces.
    pub samples: usize,
    pub readiness: ReadinessWait,
    /// Leave the index in place after the run.
    pub keep_index: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            metric: Metric::Cosine,
            dimension: DEFAULT_DIMENSION,
            cloud: Cloud::Aws,
            region: DEFAULT_REGION.to_string(),
            samples: DEFAULT_SAMPLES,
            readiness: ReadinessWait::default(),
            keep_index: false,
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.index_name.trim().is_empty() {
            anyhow::bail!("index name must not be empty");
        }
        if self.dimension == 0 {
            anyhow::bail!("dimension must be > 0");
        }
        // vec1 and vec2 must both land in ns1 for the fetch/update/delete step.
        if self.samples < 3 {
            anyhow::bail!("need at least 3 samples, got {}", self.samples);
        }
        Ok(())
    }
}
