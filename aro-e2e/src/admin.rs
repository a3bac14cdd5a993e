//! RP admin API client
//!
//! The admin API lives under `{rp}/admin/...`, always uses
//! `api-version=admin` and authenticates with a client certificate rather
//! than a bearer token. Development RPs serve a self-signed certificate, so
//! TLS verification can be switched off.

use aro_e2e_common::AdminOpenShiftCluster;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::AdminConfig;

const ADMIN_API_VERSION: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to load client certificate {path}: {reason}")]
    ClientCert { path: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response has fields {type_name} does not know about: {}", fields.join(", "))]
    UnknownFields {
        type_name: &'static str,
        fields: Vec<String>,
    },

    #[error("Admin API returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

/// Status and decoded body of an admin API call
///
/// Only 2xx bodies are decoded into `T`; anything else is kept as text in
/// `error` so the caller can assert on the status.
#[derive(Debug, Clone)]
pub struct AdminResponse<T> {
    pub status: StatusCode,
    pub body: Option<T>,
    pub error: Option<String>,
}

impl<T> AdminResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: Url,
    http: reqwest::Client,
}

impl AdminClient {
    pub fn new(config: &AdminConfig) -> AdminResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.insecure_skip_verify);

        if let Some(path) = &config.client_cert {
            let pem = std::fs::read(path).map_err(|e| AdminError::ClientCert {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let identity =
                reqwest::Identity::from_pem(&pem).map_err(|e| AdminError::ClientCert {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            builder = builder.identity(identity);
        }

        Self::with_http(&config.rp_endpoint, builder.build()?)
    }

    pub fn with_http(rp_endpoint: &str, http: reqwest::Client) -> AdminResult<Self> {
        let base_url = Url::parse(rp_endpoint)
            .map_err(|e| AdminError::InvalidUrl(format!("{}: {}", rp_endpoint, e)))?;
        Ok(Self { base_url, http })
    }

    fn url(&self, resource_path: &str, query: &[(&str, &str)]) -> AdminResult<Url> {
        let path = format!("/admin/{}", resource_path.trim_start_matches('/'));
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| AdminError::InvalidUrl(format!("{}: {}", path, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", ADMIN_API_VERSION);
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send an admin request and decode the response
    ///
    /// With `strict` set, any non-null field in the response that `T` does
    /// not model is an error.
    pub async fn request<T>(
        &self,
        method: Method,
        resource_path: &str,
        query: &[(&str, &str)],
        strict: bool,
        body: Option<&Value>,
    ) -> AdminResult<AdminResponse<T>>
    where
        T: DeserializeOwned + Serialize,
    {
        let url = self.url(resource_path, query)?;
        tracing::debug!(method = %method, url = %url, "Admin request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let error = String::from_utf8_lossy(&bytes).into_owned();
            tracing::debug!(status = %status, body = %error, "Admin request failed");
            return Ok(AdminResponse {
                status,
                body: None,
                error: Some(error),
            });
        }

        if bytes.is_empty() {
            return Ok(AdminResponse {
                status,
                body: None,
                error: None,
            });
        }

        let raw: Value = serde_json::from_slice(&bytes)?;
        let decoded: T = serde_json::from_value(raw.clone())?;

        if strict {
            let reencoded = serde_json::to_value(&decoded)?;
            let mut fields = Vec::new();
            unknown_fields(&raw, &reencoded, "", &mut fields);
            if !fields.is_empty() {
                return Err(AdminError::UnknownFields {
                    type_name: std::any::type_name::<T>(),
                    fields,
                });
            }
        }

        Ok(AdminResponse {
            status,
            body: Some(decoded),
            error: None,
        })
    }

    /// GET the admin view of a cluster
    pub async fn get_cluster(&self, resource_id: &str) -> AdminResult<AdminOpenShiftCluster> {
        let response = self
            .request::<AdminOpenShiftCluster>(Method::GET, resource_id, &[], true, None)
            .await?;

        match response.body {
            Some(cluster) if response.status == StatusCode::OK => Ok(cluster),
            _ => Err(AdminError::UnexpectedStatus {
                status: response.status.as_u16(),
                body: response.error.unwrap_or_default(),
            }),
        }
    }

    /// Trigger a PUCM (empty-body admin PATCH) on a cluster
    pub async fn pucm(&self, resource_id: &str) -> AdminResult<AdminResponse<AdminOpenShiftCluster>> {
        tracing::info!(resource_id, "Requesting PUCM");
        self.request(
            Method::PATCH,
            resource_id,
            &[],
            true,
            Some(&Value::Object(Default::default())),
        )
        .await
    }
}

/// Collect dotted paths present in `original` but lost when re-encoding
fn unknown_fields(original: &Value, reencoded: &Value, prefix: &str, out: &mut Vec<String>) {
    match (original, reencoded) {
        (Value::Object(original), Value::Object(reencoded)) => {
            for (key, value) in original {
                if value.is_null() {
                    continue;
                }
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                match reencoded.get(key) {
                    Some(other) => unknown_fields(value, other, &path, out),
                    None => out.push(path),
                }
            }
        }
        (Value::Array(original), Value::Array(reencoded)) if original.len() == reencoded.len() => {
            for (i, (a, b)) in original.iter().zip(reencoded).enumerate() {
                unknown_fields(a, b, &format!("{}[{}]", prefix, i), out);
            }
        }
        _ => {}
    }
}
