use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::Transport;
use crate::error::TransportError;

pub const API_BASE_URL: &str = "https://data.bter.com";

/// `reqwest`-backed transport for the BTER REST API.
///
/// The HTTP status is not inspected; the JSON envelope decides success.
#[derive(Debug, Clone)]
pub struct BterConnection {
    client: Client,
    base_url: String,
}

impl BterConnection {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for BterConnection {
    async fn post(
        &self,
        path: &str,
        headers: &[(&str, String)],
        body: &str,
    ) -> Result<Value, TransportError> {
        let mut extra = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::Other(format!("invalid header name {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("invalid header value: {}", e)))?;
            extra.insert(name, value);
        }

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .headers(extra)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        debug!("{} -> {} ({} bytes)", url, status, response_text.len());

        Ok(serde_json::from_str(&response_text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let conn = BterConnection::new("https://data.bter.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(conn.base_url(), API_BASE_URL);
    }
}
