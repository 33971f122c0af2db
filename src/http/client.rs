//! HTTP client setup and middleware configuration.
//!
//! The client carries no retry middleware: retries, backoff and resume are
//! owned by [`Transfer`](crate::Transfer), which needs to look at every
//! response itself.

use reqwest::Proxy;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout applied to every request.
    pub timeout: Option<Duration>,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Verify TLS certificates.
    pub verify: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            proxy: None,
            verify: true,
        }
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// This function sets up a reqwest client with:
/// - Tracing middleware for request/response logging
/// - Optional proxy support
/// - The configured timeout and certificate verification
///
/// # Example
///
/// ```rust
/// use steady::http::client::{create_http_client, HttpClientConfig};
///
/// let config = HttpClientConfig::default();
/// let client = create_http_client(config).unwrap();
/// ```
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let mut inner_client_builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        inner_client_builder = inner_client_builder.timeout(timeout);
    }

    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    #[cfg(any(feature = "default-tls", feature = "rustls"))]
    {
        inner_client_builder = inner_client_builder.danger_accept_invalid_certs(!config.verify);
    }

    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        .build();

    Ok(client)
}
