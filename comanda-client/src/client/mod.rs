//! HTTP transports
//!
//! The gateway is generic over [`HttpClient`]: [`NetworkHttpClient`] talks to
//! the real backend, [`OneshotHttpClient`] calls an axum `Router` in process.

pub mod http;
#[cfg(feature = "in-process")]
pub mod http_oneshot;

pub use http::{HttpClient, NetworkHttpClient, Query};
#[cfg(feature = "in-process")]
pub use http_oneshot::OneshotHttpClient;
