//! Resource Manager REST backend for armhelpers
//!
//! This crate implements every `armhelpers` capability trait over the Azure
//! Resource Manager REST API and provides the constructors that turn a
//! credential into an [`armhelpers::AzureClient`].
//!
//! # Features
//!
//! - Client secret, client certificate (PKCS#1 or PKCS#8 RSA key) and
//!   caller-supplied token credentials
//! - Tenant discovery from a subscription id
//! - Long-running operations over `Azure-AsyncOperation` and `Location`
//! - `nextLink` pagination
//! - Retry with backoff on throttling and transient server errors
//!
//! # Example
//!
//! ```ignore
//! use armhelpers::CallContext;
//! use armhelpers_rest::{ClientOptions, new_azure_client_with_client_secret};
//!
//! let client = new_azure_client_with_client_secret(
//!     &ClientOptions::default(),
//!     "00000000-0000-0000-0000-000000000000",
//!     "app-id",
//!     "app-secret",
//! )
//! .await?;
//!
//! let ctx = CallContext::with_timeout(std::time::Duration::from_secs(600));
//! client.ensure_resource_group(&ctx, "my-cluster", "westus2", None).await?;
//! ```

pub mod authorization;
pub mod certificate;
pub mod client;
pub mod compute;
pub mod credential;
pub mod environment;
pub mod factory;
pub mod lro;
pub mod network;
pub mod pager;
pub mod resources;
pub mod tenant;

pub use certificate::ClientCertificate;
pub use client::{ApiVersions, ArmRestClient, RetryConfig};
pub use credential::{AccessToken, ServicePrincipalCredential, StaticTokenCredential, TokenCredential};
pub use environment::CloudEnvironment;
pub use factory::{
    ClientOptions, new_azure_client_with_client_certificate_file,
    new_azure_client_with_client_certificate_file_external_tenant,
    new_azure_client_with_client_secret, new_azure_client_with_client_secret_external_tenant,
    new_azure_client_with_token_credential,
};
pub use lro::{ArmPoller, FinalState};
pub use pager::{ArmList, NextLinkPager};
pub use tenant::get_tenant_id;
