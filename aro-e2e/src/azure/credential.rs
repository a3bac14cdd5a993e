//! Bearer tokens for Azure Resource Manager

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::error::{ArmError, ArmResult};
use crate::config::AzureConfig;

/// Refresh this long before the token actually expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Where bearer tokens come from
#[derive(Clone)]
pub enum Credential {
    /// Token acquired out of band (e.g. `az account get-access-token`)
    Static(String),
    /// Service principal client credentials flow
    ClientSecret {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
        scope: String,
    },
}

impl Credential {
    /// Pick a credential from configuration, preferring a static token
    pub fn from_config(config: &AzureConfig) -> ArmResult<Self> {
        if let Some(token) = &config.access_token {
            return Ok(Self::Static(token.clone()));
        }

        match (&config.tenant_id, &config.client_id, &config.client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Ok(Self::ClientSecret {
                authority_host: config.authority_host.trim_end_matches('/').to_string(),
                tenant_id: tenant_id.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                scope: format!(
                    "{}/.default",
                    config.resource_manager_endpoint.trim_end_matches('/')
                ),
            }),
            _ => Err(ArmError::Auth(
                "no access token and incomplete service principal configuration".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Credential::Static"),
            Self::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("Credential::ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    /// `expires_in` is a number on v2 endpoints and a string on some others
    fn lifetime(&self) -> Duration {
        let secs = match &self.expires_in {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        };
        Duration::from_secs(secs.unwrap_or(3600))
    }
}

/// Hands out bearer tokens, caching them until shortly before expiry
#[derive(Debug, Clone)]
pub struct TokenProvider {
    credential: Credential,
    http: reqwest::Client,
    cache: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenProvider {
    pub fn new(credential: Credential, http: reqwest::Client) -> Self {
        Self {
            credential,
            http,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid bearer token
    pub async fn token(&self) -> ArmResult<String> {
        let (authority_host, tenant_id, client_id, client_secret, scope) = match &self.credential
        {
            Credential::Static(token) => return Ok(token.clone()),
            Credential::ClientSecret {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
                scope,
            } => (authority_host, tenant_id, client_id, client_secret, scope),
        };

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if Instant::now() + EXPIRY_MARGIN < cached.expires_at {
                    return Ok(cached.token.clone());
                }
            }
        }

        let url = format!("{}/{}/oauth2/v2.0/token", authority_host, tenant_id);
        tracing::debug!(url = %url, client_id = %client_id, "Requesting ARM token");

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArmError::Auth(format!(
                "token request failed: {} - {}",
                status, error_text
            )));
        }

        let body: TokenResponse = response.json().await?;
        let cached = CachedToken {
            expires_at: Instant::now() + body.lifetime(),
            token: body.access_token,
        };

        let token = cached.token.clone();
        *self.cache.write().await = Some(cached);

        Ok(token)
    }
}
