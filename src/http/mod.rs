//! HTTP module containing the transport the download loop talks to.
//!
//! - [`client`] - `reqwest` client creation with tracing middleware, proxy,
//!   timeout and TLS verification settings
//! - [`transport`] - the [`Transport`] seam, the per-attempt [`ResponseView`]
//!   and the default [`HttpTransport`]
//!
//! # Examples
//!
//! ```rust
//! use steady::http::{create_http_client, HttpClientConfig, HttpTransport};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig {
//!     timeout: Some(Duration::from_secs(10)),
//!     ..HttpClientConfig::default()
//! };
//! let transport = HttpTransport::new(create_http_client(config)?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod transport;

pub use client::{create_http_client, HttpClientConfig};
pub use transport::{
    BodyStream, HttpTransport, ResponseView, Transport, TransportError, TransportRequest,
};
