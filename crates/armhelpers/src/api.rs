//! Capability traits for each resource category
//!
//! The facade talks only to these traits. `armhelpers-rest` implements them
//! over the Resource Manager REST API; tests implement them in memory.

use crate::error::Result;
use crate::models::{
    Deployment, DeploymentExtended, DeploymentOperation, DeploymentValidateResult, Disk,
    NetworkInterface, Provider, ResourceGroup, RoleAssignment, VirtualMachine,
    VirtualMachineImage, VirtualMachineImageResource,
};
use crate::pager::BoxPager;
use crate::poller::BoxPoller;
use async_trait::async_trait;

#[async_trait]
pub trait DeploymentsApi: Send + Sync {
    async fn begin_create_or_update(
        &self,
        resource_group: &str,
        deployment_name: &str,
        deployment: Deployment,
    ) -> Result<BoxPoller<DeploymentExtended>>;

    async fn begin_validate(
        &self,
        resource_group: &str,
        deployment_name: &str,
        deployment: Deployment,
    ) -> Result<BoxPoller<DeploymentValidateResult>>;

    async fn get(&self, resource_group: &str, deployment_name: &str) -> Result<DeploymentExtended>;

    async fn check_existence(&self, resource_group: &str, deployment_name: &str) -> Result<bool>;

    fn list_operations(
        &self,
        resource_group: &str,
        deployment_name: &str,
    ) -> BoxPager<DeploymentOperation>;
}

#[async_trait]
pub trait ResourceGroupsApi: Send + Sync {
    async fn get(&self, name: &str) -> Result<ResourceGroup>;

    async fn create_or_update(&self, name: &str, group: ResourceGroup) -> Result<ResourceGroup>;

    async fn check_existence(&self, name: &str) -> Result<bool>;

    async fn begin_delete(&self, name: &str) -> Result<BoxPoller<()>>;
}

#[async_trait]
pub trait VirtualMachinesApi: Send + Sync {
    /// Fetch a VM; `instance_view` expands the runtime status list
    async fn get(
        &self,
        resource_group: &str,
        name: &str,
        instance_view: bool,
    ) -> Result<VirtualMachine>;

    fn list(&self, resource_group: &str) -> BoxPager<VirtualMachine>;

    async fn begin_restart(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>>;

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>>;
}

#[async_trait]
pub trait VirtualMachineImagesApi: Send + Sync {
    async fn list(
        &self,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
    ) -> Result<Vec<VirtualMachineImageResource>>;

    async fn get(
        &self,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
        version: &str,
    ) -> Result<VirtualMachineImage>;
}

#[async_trait]
pub trait DisksApi: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Disk>;

    fn list_by_resource_group(&self, resource_group: &str) -> BoxPager<Disk>;

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>>;
}

#[async_trait]
pub trait NetworkInterfacesApi: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface>;

    fn list(&self, resource_group: &str) -> BoxPager<NetworkInterface>;

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>>;
}

#[async_trait]
pub trait RoleAssignmentsApi: Send + Sync {
    /// List assignments at `scope`, optionally narrowed by an OData filter
    fn list_for_scope(&self, scope: &str, filter: Option<String>) -> BoxPager<RoleAssignment>;

    async fn delete_by_id(&self, role_assignment_id: &str) -> Result<RoleAssignment>;
}

#[async_trait]
pub trait ProvidersApi: Send + Sync {
    fn list(&self) -> BoxPager<Provider>;

    /// Request registration; does not wait for it to finish
    async fn register(&self, namespace: &str) -> Result<Provider>;
}

/// A backend serving every category
pub trait ArmBackend:
    DeploymentsApi
    + ResourceGroupsApi
    + VirtualMachinesApi
    + VirtualMachineImagesApi
    + DisksApi
    + NetworkInterfacesApi
    + RoleAssignmentsApi
    + ProvidersApi
{
}

impl<T> ArmBackend for T where
    T: DeploymentsApi
        + ResourceGroupsApi
        + VirtualMachinesApi
        + VirtualMachineImagesApi
        + DisksApi
        + NetworkInterfacesApi
        + RoleAssignmentsApi
        + ProvidersApi
{
}
