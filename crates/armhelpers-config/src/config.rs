//! Configuration schema

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENVIRONMENT: &str = "AzurePublicCloud";
pub const CUSTOM_ENVIRONMENT: &str = "custom";
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 20 * 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

/// Endpoints of a `custom` environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub resource_manager: String,
    pub active_directory: String,
    pub token_audience: String,
}

/// How to authenticate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthConfig {
    ClientSecret {
        client_id: String,
        client_secret: String,
    },
    ClientCertificate {
        client_id: String,
        certificate_path: PathBuf,
        private_key_path: PathBuf,
    },
    Token {
        access_token: String,
    },
}

impl AuthConfig {
    pub fn method(&self) -> &'static str {
        match self {
            AuthConfig::ClientSecret { .. } => "client_secret",
            AuthConfig::ClientCertificate { .. } => "client_certificate",
            AuthConfig::Token { .. } => "token",
        }
    }
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_operation_timeout_secs() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_required_providers() -> Vec<String> {
    ["Microsoft.Compute", "Microsoft.Storage", "Microsoft.Network"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Cloud name, or `custom` together with `endpoints`
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Endpoints>,

    #[serde(default)]
    pub subscription_id: String,

    /// Skips tenant discovery when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_required_providers")]
    pub required_providers: Vec<String>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            endpoints: None,
            subscription_id: String::new(),
            tenant_id: None,
            auth: None,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            required_providers: default_required_providers(),
        }
    }
}

impl ArmConfig {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn is_custom_environment(&self) -> bool {
        self.environment.eq_ignore_ascii_case(CUSTOM_ENVIRONMENT)
    }

    /// Apply `AZURE_*` environment variables on top of the file values
    ///
    /// `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET` replace the matching fields
    /// of the configured auth method. With no auth configured, both
    /// together select client-secret auth.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(subscription_id) = var(ENV_SUBSCRIPTION_ID) {
            self.subscription_id = subscription_id;
        }
        if let Some(tenant_id) = var(ENV_TENANT_ID) {
            self.tenant_id = Some(tenant_id);
        }

        let env_client_id = var(ENV_CLIENT_ID);
        let env_secret = var(ENV_CLIENT_SECRET);
        match &mut self.auth {
            Some(AuthConfig::ClientSecret {
                client_id,
                client_secret,
            }) => {
                if let Some(id) = env_client_id {
                    *client_id = id;
                }
                if let Some(secret) = env_secret {
                    *client_secret = secret;
                }
            }
            Some(AuthConfig::ClientCertificate { client_id, .. }) => {
                if let Some(id) = env_client_id {
                    *client_id = id;
                }
            }
            Some(AuthConfig::Token { .. }) => {}
            None => {
                if let (Some(client_id), Some(client_secret)) = (env_client_id, env_secret) {
                    self.auth = Some(AuthConfig::ClientSecret {
                        client_id,
                        client_secret,
                    });
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        fn require(value: &str, field: &str) -> Result<()> {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
            Ok(())
        }

        require(&self.subscription_id, "subscription_id")?;
        if let Some(tenant_id) = &self.tenant_id {
            require(tenant_id, "tenant_id")?;
        }

        if self.is_custom_environment() {
            let endpoints = self.endpoints.as_ref().ok_or_else(|| {
                ConfigError::Invalid("environment `custom` requires an endpoints block".to_string())
            })?;
            require(&endpoints.resource_manager, "endpoints.resource_manager")?;
            require(&endpoints.active_directory, "endpoints.active_directory")?;
            require(&endpoints.token_audience, "endpoints.token_audience")?;
        }

        match &self.auth {
            None => {
                return Err(ConfigError::Invalid(
                    "no auth method configured (set auth in the config file or AZURE_CLIENT_ID and AZURE_CLIENT_SECRET)"
                        .to_string(),
                ));
            }
            Some(AuthConfig::ClientSecret {
                client_id,
                client_secret,
            }) => {
                require(client_id, "auth.client_id")?;
                require(client_secret, "auth.client_secret")?;
            }
            Some(AuthConfig::ClientCertificate {
                client_id,
                certificate_path,
                private_key_path,
            }) => {
                require(client_id, "auth.client_id")?;
                require(&certificate_path.to_string_lossy(), "auth.certificate_path")?;
                require(&private_key_path.to_string_lossy(), "auth.private_key_path")?;
            }
            Some(AuthConfig::Token { access_token }) => {
                require(access_token, "auth.access_token")?;
            }
        }

        if self.operation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "operation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
