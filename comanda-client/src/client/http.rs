//! Network HTTP client

use crate::error::{ConfigError, GatewayError, GatewayResult};
use async_trait::async_trait;
use http::{Method, StatusCode};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Query string pairs
pub type Query<'a> = &'a [(&'a str, String)];

/// HTTP client trait
///
/// Each call is a single attempt: no retries happen at this layer. Every
/// failure comes back as a [`GatewayError`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T>;
    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> GatewayResult<T>;
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T>;
    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T>;
    async fn delete<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T>;
}

/// Turn a raw response into the caller's type.
///
/// Non-2xx statuses become [`GatewayError`] with the body attached. An empty
/// 2xx body decodes as JSON `null`, so `()` and `Option<T>` work for
/// endpoints that answer with nothing.
pub(crate) fn decode_response<T: DeserializeOwned>(
    method: Method,
    path: &str,
    status: StatusCode,
    body: &[u8],
) -> GatewayResult<T> {
    if !status.is_success() {
        return Err(GatewayError::status(
            method,
            path,
            status,
            String::from_utf8_lossy(body).into_owned(),
        ));
    }

    let trimmed = body.trim_ascii();
    let decoded = if trimmed.is_empty() {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(trimmed)
    };
    decoded.map_err(|e| GatewayError::decode(method, path, status, e))
}

/// Network HTTP client (reqwest)
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
}

impl NetworkHttpClient {
    /// `timeout: None` keeps reqwest's default (no timeout)
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> GatewayResult<T> {
        tracing::debug!(%method, path, "backend request");

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(method.clone(), path, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::transport(method.clone(), path, e))?;

        tracing::debug!(%method, path, status = status.as_u16(), "backend response");
        decode_response(method, path, status, &body)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let req = self.client.get(self.url(path));
        self.execute(Method::GET, path, req).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> GatewayResult<T> {
        let req = self.client.get(self.url(path)).query(query);
        self.execute(Method::GET, path, req).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let req = self.client.post(self.url(path)).json(body);
        self.execute(Method::POST, path, req).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let req = self.client.patch(self.url(path)).json(body);
        self.execute(Method::PATCH, path, req).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let req = self.client.delete(self.url(path));
        self.execute(Method::DELETE, path, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayErrorKind;

    #[test]
    fn test_url_join() {
        let client = NetworkHttpClient::new("http://localhost:8080/api/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/mesa"), "http://localhost:8080/api/mesa");
        assert_eq!(client.url("produto"), "http://localhost:8080/api/produto");
    }

    #[test]
    fn test_decode_empty_body() {
        decode_response::<()>(Method::DELETE, "/item_comanda/1", StatusCode::OK, b"").unwrap();

        let none: Option<u32> =
            decode_response(Method::GET, "/x", StatusCode::NO_CONTENT, b"  ").unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_decode_error_status_keeps_body() {
        let err = decode_response::<serde_json::Value>(
            Method::POST,
            "/pagamento",
            StatusCode::UNPROCESSABLE_ENTITY,
            b"{\"message\":\"bad\"}",
        )
        .unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::Status);
        assert_eq!(err.status, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.body, "{\"message\":\"bad\"}");
        assert_eq!(err.path, "/pagamento");
    }

    #[test]
    fn test_decode_garbage_on_success() {
        let err =
            decode_response::<Vec<u32>>(Method::GET, "/mesa", StatusCode::OK, b"<html>").unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::Decode);
        assert_eq!(err.status, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_no_response() {
        // nothing listens on the discard port
        let client = NetworkHttpClient::new("http://127.0.0.1:9", None).unwrap();
        let err = client.get::<serde_json::Value>("/mesa").await.unwrap_err();
        assert!(err.is_no_response());
        assert_eq!(err.method, Method::GET);
        assert_eq!(err.path, "/mesa");
    }
}
