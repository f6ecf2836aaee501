use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::{PineconeError, Result};

pub const API_KEY_HEADER: &str = "Api-Key";
pub const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";
pub const API_VERSION: &str = "2024-07";

pub(crate) fn default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut key = HeaderValue::from_str(api_key)
        .map_err(|_| PineconeError::InvalidArgument("API key contains invalid characters".into()))?;
    key.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, key);
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

/// Prefix a bare host with `https://` and drop any trailing slash.
pub(crate) fn normalize_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PineconeError::from_response(status, &body))
}

pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = check(request.send().await?).await?;
    let bytes = response.bytes().await?;
    // Some endpoints answer `200` with an empty body instead of `{}`.
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_str("{}")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) async fn send_empty(request: RequestBuilder) -> Result<()> {
    check(request.send().await?).await?;
    Ok(())
}
