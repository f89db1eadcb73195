//! The resource-management facade

use crate::api::{
    ArmBackend, DeploymentsApi, DisksApi, NetworkInterfacesApi, ProvidersApi, ResourceGroupsApi,
    RoleAssignmentsApi, VirtualMachineImagesApi, VirtualMachinesApi,
};
use crate::error::{ArmError, Result};
use crate::poller::DEFAULT_POLL_FREQUENCY;
use std::sync::Arc;
use std::time::Duration;

/// Resource providers a subscription must be registered with
pub const REQUIRED_RESOURCE_PROVIDERS: [&str; 3] =
    ["Microsoft.Compute", "Microsoft.Storage", "Microsoft.Network"];

/// Upper bound for operations whose caller supplied no deadline
pub const DEFAULT_ARM_OPERATION_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Facade over one sub-client per resource category
///
/// All sub-clients share the same credential and subscription. The facade
/// holds no mutable state and can be shared across tasks.
#[derive(Clone)]
pub struct AzureClient {
    pub(crate) subscription_id: String,
    pub(crate) deployments: Arc<dyn DeploymentsApi>,
    pub(crate) groups: Arc<dyn ResourceGroupsApi>,
    pub(crate) virtual_machines: Arc<dyn VirtualMachinesApi>,
    pub(crate) images: Arc<dyn VirtualMachineImagesApi>,
    pub(crate) disks: Arc<dyn DisksApi>,
    pub(crate) interfaces: Arc<dyn NetworkInterfacesApi>,
    pub(crate) role_assignments: Arc<dyn RoleAssignmentsApi>,
    pub(crate) providers: Arc<dyn ProvidersApi>,
    pub(crate) required_providers: Vec<String>,
    pub(crate) poll_frequency: Duration,
}

impl std::fmt::Debug for AzureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureClient")
            .field("subscription_id", &self.subscription_id)
            .field("required_providers", &self.required_providers)
            .field("poll_frequency", &self.poll_frequency)
            .finish_non_exhaustive()
    }
}

impl AzureClient {
    pub fn builder(subscription_id: impl Into<String>) -> AzureClientBuilder {
        AzureClientBuilder::new(subscription_id)
    }

    /// Facade whose every category is served by `backend`
    pub fn from_backend<B>(subscription_id: impl Into<String>, backend: Arc<B>) -> Result<Self>
    where
        B: ArmBackend + 'static,
    {
        Self::builder(subscription_id).backend(backend).build()
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn required_providers(&self) -> &[String] {
        &self.required_providers
    }

    pub fn poll_frequency(&self) -> Duration {
        self.poll_frequency
    }
}

/// Builder for [`AzureClient`]
pub struct AzureClientBuilder {
    subscription_id: String,
    deployments: Option<Arc<dyn DeploymentsApi>>,
    groups: Option<Arc<dyn ResourceGroupsApi>>,
    virtual_machines: Option<Arc<dyn VirtualMachinesApi>>,
    images: Option<Arc<dyn VirtualMachineImagesApi>>,
    disks: Option<Arc<dyn DisksApi>>,
    interfaces: Option<Arc<dyn NetworkInterfacesApi>>,
    role_assignments: Option<Arc<dyn RoleAssignmentsApi>>,
    providers: Option<Arc<dyn ProvidersApi>>,
    required_providers: Vec<String>,
    poll_frequency: Duration,
}

impl AzureClientBuilder {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            deployments: None,
            groups: None,
            virtual_machines: None,
            images: None,
            disks: None,
            interfaces: None,
            role_assignments: None,
            providers: None,
            required_providers: REQUIRED_RESOURCE_PROVIDERS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            poll_frequency: DEFAULT_POLL_FREQUENCY,
        }
    }

    /// Use `backend` for every category not set explicitly afterwards
    pub fn backend<B>(mut self, backend: Arc<B>) -> Self
    where
        B: ArmBackend + 'static,
    {
        self.deployments = Some(backend.clone());
        self.groups = Some(backend.clone());
        self.virtual_machines = Some(backend.clone());
        self.images = Some(backend.clone());
        self.disks = Some(backend.clone());
        self.interfaces = Some(backend.clone());
        self.role_assignments = Some(backend.clone());
        self.providers = Some(backend);
        self
    }

    pub fn deployments(mut self, client: Arc<dyn DeploymentsApi>) -> Self {
        self.deployments = Some(client);
        self
    }

    pub fn resource_groups(mut self, client: Arc<dyn ResourceGroupsApi>) -> Self {
        self.groups = Some(client);
        self
    }

    pub fn virtual_machines(mut self, client: Arc<dyn VirtualMachinesApi>) -> Self {
        self.virtual_machines = Some(client);
        self
    }

    pub fn virtual_machine_images(mut self, client: Arc<dyn VirtualMachineImagesApi>) -> Self {
        self.images = Some(client);
        self
    }

    pub fn disks(mut self, client: Arc<dyn DisksApi>) -> Self {
        self.disks = Some(client);
        self
    }

    pub fn network_interfaces(mut self, client: Arc<dyn NetworkInterfacesApi>) -> Self {
        self.interfaces = Some(client);
        self
    }

    pub fn role_assignments(mut self, client: Arc<dyn RoleAssignmentsApi>) -> Self {
        self.role_assignments = Some(client);
        self
    }

    pub fn providers(mut self, client: Arc<dyn ProvidersApi>) -> Self {
        self.providers = Some(client);
        self
    }

    /// Replace the provider namespaces `ensure_providers_registered` checks
    pub fn required_providers<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_providers = namespaces.into_iter().map(Into::into).collect();
        self
    }

    /// Fallback poll interval when the service gives no `Retry-After`
    pub fn poll_frequency(mut self, frequency: Duration) -> Self {
        self.poll_frequency = frequency;
        self
    }

    pub fn build(self) -> Result<AzureClient> {
        if self.subscription_id.trim().is_empty() {
            return Err(ArmError::Configuration(
                "subscription id must not be empty".to_string(),
            ));
        }
        if self.poll_frequency.is_zero() {
            return Err(ArmError::Configuration(
                "poll frequency must be greater than zero".to_string(),
            ));
        }

        fn require<T: ?Sized>(client: Option<Arc<T>>, category: &str) -> Result<Arc<T>> {
            client.ok_or_else(|| {
                ArmError::Configuration(format!("no {} client configured", category))
            })
        }

        Ok(AzureClient {
            subscription_id: self.subscription_id,
            deployments: require(self.deployments, "deployments")?,
            groups: require(self.groups, "resource groups")?,
            virtual_machines: require(self.virtual_machines, "virtual machines")?,
            images: require(self.images, "virtual machine images")?,
            disks: require(self.disks, "disks")?,
            interfaces: require(self.interfaces, "network interfaces")?,
            role_assignments: require(self.role_assignments, "role assignments")?,
            providers: require(self.providers, "providers")?,
            required_providers: self.required_providers,
            poll_frequency: self.poll_frequency,
        })
    }
}

/// Treat not-found as success for idempotent deletes
pub(crate) fn ignore_not_found(result: Result<()>, what: &str) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => {
            tracing::debug!("{}: resource already gone", what);
            Ok(())
        }
        other => other,
    }
}
