//! Comanda Client - table-side order management over HTTP
//!
//! - [`gateway`]: typed calls to the backend, one per operation
//! - [`controller`]: the view-state machine driving the workflow
//!   (tables → table → open/show tab → items → pay and close)
//! - [`client`]: the HTTP transports the gateway runs on

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod gateway;

pub use client::{HttpClient, NetworkHttpClient};
#[cfg(feature = "in-process")]
pub use client::OneshotHttpClient;
pub use config::ClientConfig;
pub use controller::{
    BusyGuard, ControllerSnapshot, ControllerState, TabController, TabPresence, ViewState,
};
pub use error::{
    ConfigError, ControllerError, ControllerResult, GatewayError, GatewayErrorKind, GatewayResult,
    ValidationError,
};
pub use forms::OpenTabForm;
pub use gateway::ComandaGateway;

// Re-export shared types for convenience
pub use shared;
