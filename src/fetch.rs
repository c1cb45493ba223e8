//! Network access for the cache worker
//!
//! The worker only sees the [`Fetcher`] trait. [`HttpFetcher`] is the real
//! implementation: a blocking `ureq` agent driven from tokio's blocking pool.
//! HTTP error statuses are ordinary responses here; only transport failures
//! (DNS, refused connection, broken body) are errors.

use crate::cache::request::{Request, Response};
use crate::config::schema::NetworkConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Transport-level failure of a network fetch
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("invalid request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    #[error("failed to read body from {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("fetch task aborted: {0}")]
    Aborted(String),
}

/// Abstract network interface
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request against the network
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Fetcher backed by a `ureq` agent
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher from network settings
    pub fn new(config: &NetworkConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .into();

        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &user_agent, &request))
            .await
            .map_err(|e| FetchError::Aborted(e.to_string()))?
    }
}

fn fetch_blocking(
    agent: &ureq::Agent,
    user_agent: &str,
    request: &Request,
) -> Result<Response, FetchError> {
    let url = request.url.to_string();
    debug!("{} {}", request.method, url);

    let mut builder = ureq::http::Request::builder()
        .method(request.method.as_str())
        .uri(url.as_str())
        .header("user-agent", user_agent);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let invalid = |e: ureq::http::Error| FetchError::InvalidRequest {
        url: url.clone(),
        reason: e.to_string(),
    };
    let transport = |e: ureq::Error| FetchError::Transport {
        url: url.clone(),
        reason: e.to_string(),
    };

    let result = if request.body.is_empty() {
        agent.run(builder.body(()).map_err(invalid)?)
    } else {
        agent.run(builder.body(request.body.clone()).map_err(invalid)?)
    };
    let mut response = result.map_err(transport)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|e| FetchError::Body {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    debug!("{} {} -> {}", request.method, url, status);
    Ok(Response {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let config = NetworkConfig {
            timeout_secs: 5,
            ..NetworkConfig::default()
        };
        let fetcher = HttpFetcher::new(&config);
        // Port 9 (discard) is closed on any test machine
        let request = Request::get(Url::parse("http://127.0.0.1:9/api/quote").unwrap());

        let err = fetcher.fetch(&request).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.to_string().contains("127.0.0.1:9"));
    }

    #[test]
    fn fetch_error_display() {
        let err = FetchError::Aborted("cancelled".to_string());
        assert_eq!(err.to_string(), "fetch task aborted: cancelled");
    }
}
