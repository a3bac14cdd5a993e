//! Minimal Azure Resource Manager REST client
//!
//! Only what the suite needs: authenticated GET, and PUT that waits for the
//! long-running operation ARM starts behind it.

use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use super::credential::{Credential, TokenProvider};
use super::error::{ArmError, ArmResult, ErrorEnvelope};
use crate::config::AzureConfig;

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// How long-running operations are polled
#[derive(Debug, Clone, Copy)]
pub struct LroPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for LroPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(1800),
        }
    }
}

/// Body of an `Azure-AsyncOperation` status resource
#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<super::error::ErrorBody>,
}

/// Minimal view of any resource with a provisioning state
#[derive(Debug, Default, Deserialize)]
struct ProvisionedResource {
    #[serde(default)]
    properties: Option<ProvisionedProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProvisionedProperties {
    #[serde(default)]
    provisioning_state: Option<String>,
}

fn is_terminal(status: &str) -> bool {
    ["succeeded", "failed", "canceled", "cancelled"]
        .iter()
        .any(|s| status.eq_ignore_ascii_case(s))
}

fn is_success(status: &str) -> bool {
    status.eq_ignore_ascii_case("succeeded")
}

/// Azure Resource Manager client scoped to one subscription
#[derive(Debug, Clone)]
pub struct ArmClient {
    base_url: Url,
    subscription_id: String,
    http: reqwest::Client,
    tokens: TokenProvider,
    lro: LroPolicy,
}

impl ArmClient {
    pub fn new(config: &AzureConfig, subscription_id: &str) -> ArmResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let credential = Credential::from_config(config)?;

        Self::with_credential(
            &config.resource_manager_endpoint,
            subscription_id,
            credential,
            http,
        )
    }

    pub fn with_credential(
        endpoint: &str,
        subscription_id: &str,
        credential: Credential,
        http: reqwest::Client,
    ) -> ArmResult<Self> {
        let base_url =
            Url::parse(endpoint).map_err(|e| ArmError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        Ok(Self {
            base_url,
            subscription_id: subscription_id.to_string(),
            tokens: TokenProvider::new(credential, http.clone()),
            http,
            lro: LroPolicy::default(),
        })
    }

    pub fn with_lro_policy(mut self, lro: LroPolicy) -> Self {
        self.lro = lro;
        self
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider_path}`
    pub fn resource_path(&self, resource_group: &str, provider_path: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}",
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(resource_group),
            provider_path.trim_start_matches('/')
        )
    }

    fn url(&self, path: &str, api_version: &str) -> ArmResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ArmError::InvalidUrl(format!("{}: {}", path, e)))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ArmResult<Response> {
        tracing::debug!(method = %method, url = %url, "ARM request");

        let token = self.tokens.token().await?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        Err(ErrorEnvelope::into_error(&text, status))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ArmResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET a resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> ArmResult<T> {
        let url = self.url(path, api_version)?;
        let response = self.send::<()>(Method::GET, url, None).await?;
        Self::decode(response).await
    }

    /// PUT a resource without waiting for any operation ARM starts
    pub async fn put<B, T>(&self, path: &str, api_version: &str, body: &B) -> ArmResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, api_version)?;
        let response = self.send(Method::PUT, url, Some(body)).await?;
        Self::decode(response).await
    }

    /// PUT a resource and wait for the resulting operation to finish
    ///
    /// Returns the resource as it reads after the operation completed.
    pub async fn put_and_wait<B, T>(&self, path: &str, api_version: &str, body: &B) -> ArmResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, api_version)?;
        let response = self.send(Method::PUT, url, Some(body)).await?;

        let headers = response.headers().clone();
        let initial: serde_json::Value = match response.bytes().await? {
            bytes if bytes.is_empty() => serde_json::Value::Null,
            bytes => serde_json::from_slice(&bytes)?,
        };

        if let Some(operation_url) = operation_url(&headers) {
            self.wait_for_operation(path, operation_url, retry_after(&headers))
                .await?;
        } else {
            let state = serde_json::from_value::<ProvisionedResource>(initial)
                .unwrap_or_default()
                .properties
                .and_then(|p| p.provisioning_state);

            match state {
                Some(s) if is_success(&s) => {}
                Some(s) if is_terminal(&s) => {
                    return Err(ArmError::OperationFailed {
                        resource: path.to_string(),
                        status: s,
                        message: String::new(),
                    })
                }
                _ => self.wait_for_provisioning(path, api_version).await?,
            }
        }

        self.get(path, api_version).await
    }

    /// Poll an `Azure-AsyncOperation` / `Location` URL until it is terminal
    async fn wait_for_operation(
        &self,
        resource: &str,
        operation_url: Url,
        mut delay: Option<Duration>,
    ) -> ArmResult<()> {
        let deadline = Instant::now() + self.lro.timeout;

        loop {
            tokio::time::sleep(delay.unwrap_or(self.lro.interval)).await;
            if Instant::now() > deadline {
                return Err(ArmError::Timeout(resource.to_string()));
            }

            let response = self
                .send::<()>(Method::GET, operation_url.clone(), None)
                .await?;
            delay = retry_after(response.headers());

            // Location-style monitors answer 202 until done and then return
            // the final resource (or nothing) with 200/204.
            if response.status() == reqwest::StatusCode::ACCEPTED {
                continue;
            }

            let bytes = response.bytes().await?;
            let status = match serde_json::from_slice::<OperationStatus>(&bytes) {
                Ok(op) if !op.status.is_empty() => op,
                _ => return Ok(()),
            };

            tracing::debug!(resource, status = %status.status, "Operation status");

            if is_success(&status.status) {
                return Ok(());
            }
            if is_terminal(&status.status) {
                return Err(ArmError::OperationFailed {
                    resource: resource.to_string(),
                    status: status.status,
                    message: status.error.map(|e| e.message).unwrap_or_default(),
                });
            }
        }
    }

    /// Poll the resource itself until its provisioning state is terminal
    async fn wait_for_provisioning(&self, path: &str, api_version: &str) -> ArmResult<()> {
        let deadline = Instant::now() + self.lro.timeout;

        loop {
            tokio::time::sleep(self.lro.interval).await;
            if Instant::now() > deadline {
                return Err(ArmError::Timeout(path.to_string()));
            }

            let resource: ProvisionedResource = self.get(path, api_version).await?;
            let state = resource
                .properties
                .and_then(|p| p.provisioning_state)
                .unwrap_or_default();

            if is_success(&state) {
                return Ok(());
            }
            if is_terminal(&state) {
                return Err(ArmError::OperationFailed {
                    resource: path.to_string(),
                    status: state,
                    message: String::new(),
                });
            }
        }
    }
}

fn operation_url(headers: &HeaderMap) -> Option<Url> {
    headers
        .get(AZURE_ASYNC_OPERATION)
        .or_else(|| headers.get(LOCATION))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
