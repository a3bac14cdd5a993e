//! Configuration management for the e2e suite
//!
//! Settings are loaded from:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogRotation;
use std::time::Duration;

/// Main configuration struct for a suite run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Cluster under test
    pub cluster: ClusterConfig,
    /// Kubernetes API access
    pub kubernetes: KubernetesConfig,
    /// Azure Resource Manager access
    pub azure: AzureConfig,
    /// RP admin API access
    pub admin: AdminConfig,
    /// Eventually-style polling defaults
    pub poll: PollSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Cluster under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub subscription_id: String,
    pub location: String,
    /// Resource group holding the cluster resource and its virtual network
    pub resource_group: String,
    pub name: String,
}

/// Kubernetes API access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Explicit kubeconfig; falls back to KUBECONFIG / in-cluster when unset
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

/// Azure Resource Manager access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub resource_manager_endpoint: String,
    pub authority_host: String,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Pre-acquired bearer token, used instead of the client credentials flow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// api-version used for Microsoft.RedHatOpenShift calls
    pub openshift_api_version: String,
    pub request_timeout_secs: u64,
}

/// RP admin API access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub rp_endpoint: String,
    /// PEM bundle with the client certificate and key presented to the RP
    pub client_cert: Option<PathBuf>,
    pub insecure_skip_verify: bool,
    pub request_timeout_secs: u64,
}

/// Eventually-style polling defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub timeout_secs: u64,
    pub interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for JSON log files; console only when unset
    pub log_dir: Option<PathBuf>,
    /// File rotation (hourly, daily, never)
    pub rotation: LogRotation,
    pub json: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            subscription_id: String::new(),
            location: "eastus".to_string(),
            resource_group: String::new(),
            name: String::new(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
        }
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            resource_manager_endpoint: "https://management.azure.com".to_string(),
            authority_host: "https://login.microsoftonline.com".to_string(),
            tenant_id: None,
            client_id: None,
            client_secret: None,
            access_token: None,
            openshift_api_version: "2022-09-04".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            rp_endpoint: "https://localhost:8443".to_string(),
            client_cert: None,
            insecure_skip_verify: false,
            request_timeout_secs: 60,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            interval_secs: 10,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            rotation: LogRotation::default(),
            json: false,
        }
    }
}

impl SuiteConfig {
    /// Load configuration from the first config file found, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.clone(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("ARO_E2E_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("./aro-e2e.toml")),
            Some(PathBuf::from("/etc/aro-e2e/config.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_env_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Cluster
        if let Some(v) = var("AZURE_SUBSCRIPTION_ID") {
            self.cluster.subscription_id = v;
        }
        if let Some(v) = var("LOCATION") {
            self.cluster.location = v;
        }
        if let Some(v) = var("RESOURCEGROUP") {
            self.cluster.resource_group = v;
        }
        if let Some(v) = var("CLUSTER") {
            self.cluster.name = v;
        }

        // Kubernetes
        if let Some(v) = var("KUBECONFIG") {
            self.kubernetes.kubeconfig = Some(PathBuf::from(v));
        }

        // Azure
        if let Some(v) = var("AZURE_TENANT_ID") {
            self.azure.tenant_id = Some(v);
        }
        if let Some(v) = var("AZURE_CLIENT_ID") {
            self.azure.client_id = Some(v);
        }
        if let Some(v) = var("AZURE_CLIENT_SECRET") {
            self.azure.client_secret = Some(v);
        }
        if let Some(v) = var("AZURE_ACCESS_TOKEN") {
            self.azure.access_token = Some(v);
        }
        if let Some(v) = var("AZURE_RESOURCE_MANAGER_ENDPOINT") {
            self.azure.resource_manager_endpoint = v;
        }

        // Admin
        if let Some(v) = var("RP_ENDPOINT") {
            self.admin.rp_endpoint = v;
        }
        if let Some(v) = var("ADMIN_CLIENT_CERT") {
            self.admin.client_cert = Some(PathBuf::from(v));
        }
        if let Some(v) = var("ADMIN_INSECURE_SKIP_VERIFY") {
            self.admin.insecure_skip_verify = v.parse().unwrap_or(false);
        }

        // Poll
        if let Some(v) = var("E2E_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.poll.timeout_secs = v;
        }
        if let Some(v) = var("E2E_POLL_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.poll.interval_secs = v;
        }

        // Logging
        if let Some(v) = var("ARO_E2E_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("ARO_E2E_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = var("ARO_E2E_LOG_ROTATION").and_then(|v| v.parse().ok()) {
            self.logging.rotation = v;
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Render this configuration with secrets masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.azure.client_secret.is_some() {
            config.azure.client_secret = Some("********".to_string());
        }
        if config.azure.access_token.is_some() {
            config.azure.access_token = Some("********".to_string());
        }
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster.subscription_id.is_empty() {
            return Err(ConfigError::Validation(
                "Subscription ID cannot be empty".to_string(),
            ));
        }
        if self.cluster.resource_group.is_empty() {
            return Err(ConfigError::Validation(
                "Resource group cannot be empty".to_string(),
            ));
        }
        if self.cluster.name.is_empty() {
            return Err(ConfigError::Validation(
                "Cluster name cannot be empty".to_string(),
            ));
        }
        if self.poll.timeout_secs == 0 || self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Poll timeout and interval must be non-zero".to_string(),
            ));
        }
        if self.poll.interval_secs > self.poll.timeout_secs {
            return Err(ConfigError::Validation(
                "Poll interval cannot exceed the poll timeout".to_string(),
            ));
        }

        Ok(())
    }

    /// Resource ID of the cluster under test
    pub fn cluster_resource_id(&self) -> String {
        aro_e2e_common::resource_id::cluster_resource_id(
            &self.cluster.subscription_id,
            &self.cluster.resource_group,
            &self.cluster.name,
        )
    }
}

impl PollSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}
