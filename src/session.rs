//! Lazily built, process-shared Pinecone client.
//!
//! A [`ClientSession`] is constructed once in `main` and passed by reference
//! to every step. The first successful [`ClientSession::client`] call builds
//! the client; later calls hand out the same `Arc` until [`ClientSession::reset`].

use std::sync::Arc;

use parking_lot::Mutex;
use pinecone_client::{PineconeClient, PineconeError};

use crate::config::{ClientSettings, API_KEY_ENV};

pub struct ClientSession {
    api_key: Option<String>,
    settings: ClientSettings,
    client: Mutex<Option<Arc<PineconeClient>>>,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("has_api_key", &self.api_key.is_some())
            .field("settings", &self.settings)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl ClientSession {
    /// Blank keys count as absent.
    pub fn new(api_key: Option<String>, settings: ClientSettings) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            settings,
            client: Mutex::new(None),
        }
    }

    /// Take the API key from `PINECONE_API_KEY`.
    pub fn from_env(settings: ClientSettings) -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok(), settings)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Shared client built from the session's own key.
    pub fn client(&self) -> Result<Arc<PineconeClient>, PineconeError> {
        self.client_with_key(self.api_key.as_deref())
    }

    /// Shared client, building it from `api_key` if none exists yet.
    ///
    /// Once built, the cached client is returned whatever key is passed.
    pub fn client_with_key(
        &self,
        api_key: Option<&str>,
    ) -> Result<Arc<PineconeClient>, PineconeError> {
        let mut guard = self.client.lock();
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(PineconeError::MissingApiKey)?;
        let mut builder =
            PineconeClient::builder(api_key).controller_url(self.settings.controller_url.clone());
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = Arc::new(builder.build()?);
        tracing::debug!(controller_url = %client.controller_url(), "Pinecone client created");
        *guard = Some(client.clone());
        Ok(client)
    }

    pub fn is_initialized(&self) -> bool {
        self.client.lock().is_some()
    }

    /// Drop the cached client; the next `client()` call builds a fresh one.
    pub fn reset(&self) {
        self.client.lock().take();
    }
}
