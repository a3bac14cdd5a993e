//! Common test utilities and helpers
//!
//! A tiny axum server that records every request and answers through a
//! test-supplied responder. It stands in for ARM, the token endpoint and the
//! RP admin API.

#![allow(dead_code)]

use aro_e2e::azure::{ArmClient, Credential, LroPolicy};
use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";
pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Absolute URL on this server for `path`
    pub fn url_for(&self, path: &str) -> String {
        format!("http://{}{}", self.header("host").unwrap_or("localhost"), path)
    }
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Response + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder = Arc::new(responder);

        let recorded = requests.clone();
        let app = Router::new().fallback(move |request: Request| {
            let recorded = recorded.clone();
            let responder = responder.clone();
            async move {
                let (parts, body) = request.into_parts();
                let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
                let req = RecordedRequest {
                    method: parts.method,
                    path: parts.uri.path().to_string(),
                    query: parts.uri.query().unwrap_or_default().to_string(),
                    headers: parts.headers,
                    body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
                };

                let response = responder(&req);
                recorded.lock().unwrap().push(req);
                response
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path_suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(path_suffix))
            .count()
    }
}

pub fn json(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// 201 that points the client at an async operation monitor
pub fn accepted_with_operation(req: &RecordedRequest, body: Value, operation_path: &str) -> Response {
    let mut response = json(StatusCode::CREATED, body);
    let headers = response.headers_mut();
    headers.insert(
        "azure-asyncoperation",
        HeaderValue::from_str(&req.url_for(operation_path)).expect("valid header"),
    );
    headers.insert(header::RETRY_AFTER, HeaderValue::from_static("0"));
    response
}

/// ARM client with a static token and a fast LRO policy
pub fn arm_client(server: &MockServer) -> ArmClient {
    ArmClient::with_credential(
        &server.base_url,
        SUBSCRIPTION,
        Credential::Static(TOKEN.into()),
        reqwest::Client::new(),
    )
    .expect("Failed to build ARM client")
    .with_lro_policy(fast_lro())
}

pub fn fast_lro() -> LroPolicy {
    LroPolicy {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
    }
}

pub fn subnet_path(subnet: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/vnet-rg/providers/Microsoft.Network/virtualNetworks/dev-vnet/subnets/{}",
        SUBSCRIPTION, subnet
    )
}
