//! Oneshot HTTP client - in-process calls
//!
//! Requires the "in-process" feature.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use url::form_urlencoded;

use super::http::{HttpClient, Query, decode_response};
use crate::error::{GatewayError, GatewayResult};

/// Oneshot HTTP client (in-memory)
///
/// Drives an axum `Router` through Tower's `oneshot`, with the same response
/// handling as the network client. Useful for embedding a backend in process
/// and for exercising the gateway against a fake backend.
///
/// # Example
///
/// ```ignore
/// use comanda_client::{ComandaGateway, OneshotHttpClient};
///
/// let router: axum::Router = fake_backend();
/// let gateway = ComandaGateway::new(OneshotHttpClient::new(router));
/// let tables = gateway.list_tables().await?;
/// ```
#[derive(Debug, Clone)]
pub struct OneshotHttpClient {
    router: Router,
}

impl OneshotHttpClient {
    /// `router` must already have its state attached
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    fn build_request(
        method: Method,
        uri: &str,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> GatewayResult<Request<Body>> {
        let builder = Request::builder().method(method.clone()).uri(uri);
        let request = match body {
            Some(bytes) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(bytes)),
            None => builder.body(Body::empty()),
        };
        request.map_err(|e| GatewayError::encode(method, path, e))
    }

    fn encode_body<B: Serialize>(method: &Method, path: &str, body: &B) -> GatewayResult<Vec<u8>> {
        serde_json::to_vec(body).map_err(|e| GatewayError::encode(method.clone(), path, e))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: Request<Body>,
    ) -> GatewayResult<T> {
        tracing::debug!(%method, path, "in-process request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| GatewayError::transport(method.clone(), path, e))?;

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| GatewayError::transport(method.clone(), path, e))?;

        decode_response(method, path, status, &body)
    }
}

#[async_trait]
impl HttpClient for OneshotHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let request = Self::build_request(Method::GET, path, path, None)?;
        self.execute(Method::GET, path, request).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> GatewayResult<T> {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        let uri = format!("{}?{}", path, encoded);
        let request = Self::build_request(Method::GET, &uri, path, None)?;
        self.execute(Method::GET, path, request).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let bytes = Self::encode_body(&Method::POST, path, body)?;
        let request = Self::build_request(Method::POST, path, path, Some(bytes))?;
        self.execute(Method::POST, path, request).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let bytes = Self::encode_body(&Method::PATCH, path, body)?;
        let request = Self::build_request(Method::PATCH, path, path, Some(bytes))?;
        self.execute(Method::PATCH, path, request).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let request = Self::build_request(Method::DELETE, path, path, None)?;
        self.execute(Method::DELETE, path, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::extract::Query as AxumQuery;
    use axum::routing::get;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_query_string_reaches_router() {
        let router = Router::new().route(
            "/echo",
            get(|AxumQuery(params): AxumQuery<HashMap<String, String>>| async move {
                Json(params)
            }),
        );
        let client = OneshotHttpClient::new(router);

        let params: HashMap<String, String> = client
            .get_with_query(
                "/echo",
                &[("mesa_id", "7".to_string()), ("fechada", "false".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(params.get("mesa_id").map(String::as_str), Some("7"));
        assert_eq!(params.get("fechada").map(String::as_str), Some("false"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_status_error() {
        let client = OneshotHttpClient::new(Router::new());
        let err = client.get::<serde_json::Value>("/nope").await.unwrap_err();
        assert_eq!(err.status, Some(http::StatusCode::NOT_FOUND));
    }
}
