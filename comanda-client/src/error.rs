//! Client error types

use http::{Method, StatusCode};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Gateway
// ============================================================================

/// What went wrong with a backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// No response: connection refused, DNS, timeout, body read failure
    Transport,
    /// Non-2xx status
    Status,
    /// 2xx status but the body could not be decoded
    Decode,
    /// Request body could not be built
    Encode,
}

/// Uniform failure of a backend call
///
/// Every transport failure is normalized into this shape; callers never see a
/// raw `reqwest` error.
#[derive(Debug, Clone, Error)]
#[error("[api] {method} {path} -> {} {body}", status_label(.status))]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub method: Method,
    pub path: String,
    /// `None` when no response was received
    pub status: Option<StatusCode>,
    /// Response body, or the underlying failure when there is none
    pub body: String,
}

fn status_label(status: &Option<StatusCode>) -> String {
    match status {
        Some(s) => s.as_u16().to_string(),
        None => "ERR".to_string(),
    }
}

impl GatewayError {
    pub fn transport(method: Method, path: &str, cause: impl fmt::Display) -> Self {
        Self {
            kind: GatewayErrorKind::Transport,
            method,
            path: path.to_string(),
            status: None,
            body: cause.to_string(),
        }
    }

    pub fn status(method: Method, path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Status,
            method,
            path: path.to_string(),
            status: Some(status),
            body: body.into(),
        }
    }

    pub fn decode(method: Method, path: &str, status: StatusCode, cause: impl fmt::Display) -> Self {
        Self {
            kind: GatewayErrorKind::Decode,
            method,
            path: path.to_string(),
            status: Some(status),
            body: format!("invalid response: {}", cause),
        }
    }

    pub fn encode(method: Method, path: &str, cause: impl fmt::Display) -> Self {
        Self {
            kind: GatewayErrorKind::Encode,
            method,
            path: path.to_string(),
            status: None,
            body: format!("invalid request: {}", cause),
        }
    }

    /// True when the backend never answered
    pub fn is_no_response(&self) -> bool {
        self.status.is_none() && self.kind == GatewayErrorKind::Transport
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

// ============================================================================
// Configuration
// ============================================================================

/// Startup configuration error, fatal
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingBaseUrl(&'static str),

    #[error("invalid backend base URL {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

// ============================================================================
// Controller
// ============================================================================

/// Input rejected before any request is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Selecione uma forma de pagamento")]
    MissingPaymentMethod,

    #[error("Adicione ao menos um produto para abrir a comanda")]
    EmptyCart,

    #[error("A comanda não tem itens")]
    EmptyTab,

    #[error("Quantidade inválida: {0}")]
    InvalidQuantity(i64),

    #[error("Pagamento já registrado, conclua o fechamento da comanda")]
    AwaitingClose,

    #[error("Mesa {0} não encontrada")]
    UnknownTable(i64),

    #[error("Mesa {0} já tem comanda aberta")]
    TableOccupied(i64),
}

/// Controller action failure
#[derive(Debug, Clone, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Selecione uma mesa primeiro")]
    NoTableSelected,

    #[error("Nenhuma comanda aberta para esta mesa")]
    NoOpenTab,
}

/// Result type for controller actions
pub type ControllerResult<T> = Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::status(
            Method::POST,
            "/item_comanda",
            StatusCode::INTERNAL_SERVER_ERROR,
            "{\"message\":\"boom\"}",
        );
        assert_eq!(
            err.to_string(),
            "[api] POST /item_comanda -> 500 {\"message\":\"boom\"}"
        );
        assert!(!err.is_no_response());

        let err = GatewayError::transport(Method::GET, "/mesa", "connection refused");
        assert_eq!(err.to_string(), "[api] GET /mesa -> ERR connection refused");
        assert!(err.is_no_response());
    }

    #[test]
    fn test_controller_error_is_transparent() {
        let err: ControllerError =
            GatewayError::transport(Method::GET, "/produto", "timeout").into();
        assert_eq!(err.to_string(), "[api] GET /produto -> ERR timeout");

        let err: ControllerError = ValidationError::MissingPaymentMethod.into();
        assert_eq!(err.to_string(), "Selecione uma forma de pagamento");
    }
}
