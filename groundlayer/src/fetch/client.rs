//! HTTP tile fetcher backed by reqwest.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::fetch::types::{FetchError, FetchResponse};
use crate::fetch::TileFetcher;

/// User agent advertised on every tile request. Public tile servers reject
/// anonymous clients, so the product name and version go on the wire.
pub const USER_AGENT: &str = concat!("groundlayer/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`ReqwestFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Per-request timeout, covering connect through body.
    pub timeout: Duration,
    /// Optional `host:port` HTTP proxy. When unset (or malformed), proxy
    /// settings from the system environment apply instead.
    pub proxy: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
        }
    }
}

impl FetcherConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// Production [`TileFetcher`] over a shared reqwest client.
///
/// Redirects are deliberately not followed here; the client reports them
/// verbatim so the loader can count hops and detect loops per tile.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Fails when the underlying client cannot be constructed, for example
    /// because the proxy URL is rejected.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none());

        if let Some(spec) = &config.proxy {
            match proxy_url(spec) {
                Some(url) => {
                    let proxy = reqwest::Proxy::all(&url)
                        .map_err(|error| FetchError::ClientBuild(error.to_string()))?;
                    builder = builder.proxy(proxy);
                }
                None => {
                    warn!(proxy = %spec, "ignoring malformed proxy, using system configuration");
                }
            }
        }

        let client = builder
            .build()
            .map_err(|error| FetchError::ClientBuild(error.to_string()))?;
        Ok(Self { client })
    }
}

impl TileFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        trace!(%url, "requesting tile");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            })?;

        let status = response.status();
        let redirect = if status.is_redirection() {
            response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        } else {
            None
        };

        let body = response
            .bytes()
            .await
            .map_err(|error| FetchError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            })?;

        debug!(%url, status = status.as_u16(), bytes = body.len(), "tile response");
        Ok(FetchResponse {
            status: status.as_u16(),
            redirect,
            body: body.to_vec(),
        })
    }
}

/// Turns a `host:port` proxy spec into a proxy URL, or `None` when the spec
/// does not parse as exactly host and port.
fn proxy_url(spec: &str) -> Option<String> {
    let (host, port) = spec.split_once(':')?;
    if host.is_empty() {
        return None;
    }
    let port: u16 = port.parse().ok()?;
    Some(format!("http://{host}:{port}"))
}
