//! Facade construction from the loaded configuration

use anyhow::Context;
use armhelpers::{AzureClient, CallContext};
use armhelpers_config::{ArmConfig, AuthConfig};
use armhelpers_rest::{ClientOptions, CloudEnvironment, StaticTokenCredential};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// An authenticated facade plus the context every command runs under
pub struct Session {
    pub client: AzureClient,
    pub ctx: CallContext,
}

impl Session {
    pub async fn connect(config: &ArmConfig, timeout_secs: Option<u64>) -> anyhow::Result<Self> {
        let options = ClientOptions {
            poll_frequency: config.poll_interval(),
            required_providers: config.required_providers.clone(),
            ..ClientOptions::with_environment(environment(config)?)
        };
        tracing::debug!(
            environment = %options.environment.name,
            subscription = %config.subscription_id,
            "Connecting to Resource Manager"
        );

        let client = connect_client(config, &options)
            .await
            .context("failed to create Azure client")?;

        let timeout = timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.operation_timeout());
        let cancel = CancellationToken::new();
        spawn_interrupt_handler(cancel.clone());

        Ok(Self {
            client,
            ctx: CallContext::with_timeout(timeout).with_cancellation(cancel),
        })
    }
}

fn environment(config: &ArmConfig) -> anyhow::Result<CloudEnvironment> {
    if config.is_custom_environment() {
        let endpoints = config
            .endpoints
            .as_ref()
            .context("environment `custom` requires an endpoints block")?;
        return Ok(CloudEnvironment::custom(
            "custom",
            endpoints.resource_manager.as_str(),
            endpoints.active_directory.as_str(),
            endpoints.token_audience.as_str(),
        ));
    }
    Ok(CloudEnvironment::from_name(&config.environment)?)
}

async fn connect_client(config: &ArmConfig, options: &ClientOptions) -> armhelpers::Result<AzureClient> {
    let subscription_id = config.subscription_id.as_str();
    let tenant_id = config.tenant_id.as_deref();

    match config.auth.as_ref() {
        Some(AuthConfig::ClientSecret {
            client_id,
            client_secret,
        }) => match tenant_id {
            Some(tenant_id) => {
                armhelpers_rest::new_azure_client_with_client_secret_external_tenant(
                    options,
                    subscription_id,
                    tenant_id,
                    client_id,
                    client_secret,
                )
                .await
            }
            None => {
                armhelpers_rest::new_azure_client_with_client_secret(
                    options,
                    subscription_id,
                    client_id,
                    client_secret,
                )
                .await
            }
        },
        Some(AuthConfig::ClientCertificate {
            client_id,
            certificate_path,
            private_key_path,
        }) => match tenant_id {
            Some(tenant_id) => {
                armhelpers_rest::new_azure_client_with_client_certificate_file_external_tenant(
                    options,
                    subscription_id,
                    tenant_id,
                    client_id,
                    certificate_path,
                    private_key_path,
                )
                .await
            }
            None => {
                armhelpers_rest::new_azure_client_with_client_certificate_file(
                    options,
                    subscription_id,
                    client_id,
                    certificate_path,
                    private_key_path,
                )
                .await
            }
        },
        Some(AuthConfig::Token { access_token }) => {
            armhelpers_rest::new_azure_client_with_token_credential(
                options,
                subscription_id,
                Arc::new(StaticTokenCredential::new(access_token.as_str())),
            )
            .await
        }
        None => Err(armhelpers::ArmError::Configuration(
            "no auth method configured".to_string(),
        )),
    }
}

/// Ctrl-C cancels the running command instead of killing the process
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, abandoning the running operation");
            cancel.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use armhelpers_config::Endpoints;

    #[test]
    fn test_named_environment() {
        let config = ArmConfig {
            environment: "AzureUSGovernmentCloud".to_string(),
            ..Default::default()
        };
        let env = environment(&config).unwrap();
        assert_eq!(env.resource_manager_endpoint, "https://management.usgovcloudapi.net/");
    }

    #[test]
    fn test_custom_environment() {
        let config = ArmConfig {
            environment: "custom".to_string(),
            endpoints: Some(Endpoints {
                resource_manager: "https://management.local.azurestack.external".to_string(),
                active_directory: "https://adfs.local.azurestack.external/adfs".to_string(),
                token_audience: "https://management.adfs.azurestack.local/abc".to_string(),
            }),
            ..Default::default()
        };
        let env = environment(&config).unwrap();
        assert_eq!(
            env.resource_manager_endpoint,
            "https://management.local.azurestack.external/"
        );
        assert_eq!(env.scope(), "https://management.adfs.azurestack.local/abc/.default");
    }

    #[test]
    fn test_unknown_environment() {
        let config = ArmConfig {
            environment: "MarsCloud".to_string(),
            ..Default::default()
        };
        assert!(environment(&config).is_err());
    }
}
