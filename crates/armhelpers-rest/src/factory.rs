//! Facade constructors
//!
//! Each constructor resolves the tenant when it is not given, builds the
//! credential, checks that it can obtain a token and wires an
//! [`ArmRestClient`] into every category of the facade.

use crate::certificate::ClientCertificate;
use crate::client::{ApiVersions, ArmRestClient, RetryConfig};
use crate::credential::{ServicePrincipalCredential, TokenCredential};
use crate::environment::CloudEnvironment;
use crate::tenant::get_tenant_id;
use armhelpers::{ArmError, AzureClient, DEFAULT_POLL_FREQUENCY, REQUIRED_RESOURCE_PROVIDERS, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Per-request HTTP timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Knobs shared by every constructor
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub environment: CloudEnvironment,
    pub retry: RetryConfig,
    pub api_versions: ApiVersions,
    /// Fallback poll interval for long-running operations
    pub poll_frequency: Duration,
    pub required_providers: Vec<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            environment: CloudEnvironment::default(),
            retry: RetryConfig::default(),
            api_versions: ApiVersions::default(),
            poll_frequency: DEFAULT_POLL_FREQUENCY,
            required_providers: REQUIRED_RESOURCE_PROVIDERS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl ClientOptions {
    pub fn with_environment(environment: CloudEnvironment) -> Self {
        Self {
            environment,
            ..Default::default()
        }
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("armhelpers/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| ArmError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Facade authenticated with a client secret; the tenant is discovered
/// from the subscription
pub async fn new_azure_client_with_client_secret(
    options: &ClientOptions,
    subscription_id: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<AzureClient> {
    let http = http_client()?;
    let tenant_id = get_tenant_id(&http, &options.environment, subscription_id).await?;
    client_secret_client(http, options, subscription_id, &tenant_id, client_id, client_secret).await
}

/// Facade authenticated with a client secret issued by `tenant_id`
pub async fn new_azure_client_with_client_secret_external_tenant(
    options: &ClientOptions,
    subscription_id: &str,
    tenant_id: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<AzureClient> {
    let http = http_client()?;
    client_secret_client(http, options, subscription_id, tenant_id, client_id, client_secret).await
}

/// Facade authenticated with a PEM certificate and its RSA private key;
/// the tenant is discovered from the subscription
pub async fn new_azure_client_with_client_certificate_file(
    options: &ClientOptions,
    subscription_id: &str,
    client_id: &str,
    certificate_path: impl AsRef<Path>,
    private_key_path: impl AsRef<Path>,
) -> Result<AzureClient> {
    let certificate = ClientCertificate::from_files(certificate_path, private_key_path)?;
    let http = http_client()?;
    let tenant_id = get_tenant_id(&http, &options.environment, subscription_id).await?;
    client_certificate_client(http, options, subscription_id, &tenant_id, client_id, certificate)
        .await
}

pub async fn new_azure_client_with_client_certificate_file_external_tenant(
    options: &ClientOptions,
    subscription_id: &str,
    tenant_id: &str,
    client_id: &str,
    certificate_path: impl AsRef<Path>,
    private_key_path: impl AsRef<Path>,
) -> Result<AzureClient> {
    let certificate = ClientCertificate::from_files(certificate_path, private_key_path)?;
    let http = http_client()?;
    client_certificate_client(http, options, subscription_id, tenant_id, client_id, certificate)
        .await
}

/// Facade over a caller-supplied token source
pub async fn new_azure_client_with_token_credential(
    options: &ClientOptions,
    subscription_id: &str,
    credential: Arc<dyn TokenCredential>,
) -> Result<AzureClient> {
    build(http_client()?, options, subscription_id, credential).await
}

async fn client_secret_client(
    http: reqwest::Client,
    options: &ClientOptions,
    subscription_id: &str,
    tenant_id: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<AzureClient> {
    let credential = ServicePrincipalCredential::with_client_secret(
        http.clone(),
        &options.environment,
        tenant_id,
        client_id,
        client_secret,
    )?;
    build(http, options, subscription_id, Arc::new(credential)).await
}

async fn client_certificate_client(
    http: reqwest::Client,
    options: &ClientOptions,
    subscription_id: &str,
    tenant_id: &str,
    client_id: &str,
    certificate: ClientCertificate,
) -> Result<AzureClient> {
    let credential = ServicePrincipalCredential::with_client_certificate(
        http.clone(),
        &options.environment,
        tenant_id,
        client_id,
        certificate,
    )?;
    build(http, options, subscription_id, Arc::new(credential)).await
}

async fn build(
    http: reqwest::Client,
    options: &ClientOptions,
    subscription_id: &str,
    credential: Arc<dyn TokenCredential>,
) -> Result<AzureClient> {
    credential
        .get_token(&options.environment.scope())
        .await
        .map_err(|e| match e {
            ArmError::Configuration(_) => e,
            other => ArmError::Configuration(format!("failed to validate credential: {}", other)),
        })?;

    let rest = ArmRestClient::with_options(
        http,
        &options.environment,
        subscription_id,
        credential,
        options.retry.clone(),
        options.api_versions.clone(),
    )?;

    tracing::debug!(
        environment = %options.environment.name,
        subscription = %subscription_id,
        "Created Resource Manager client"
    );

    AzureClient::builder(subscription_id)
        .backend(Arc::new(rest))
        .required_providers(options.required_providers.iter().cloned())
        .poll_frequency(options.poll_frequency)
        .build()
}
