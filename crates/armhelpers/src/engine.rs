//! Caller-facing interfaces
//!
//! Cluster lifecycle code depends on [`AksEngineClient`] rather than on
//! [`AzureClient`] so it can be exercised against a fake.

use crate::client::AzureClient;
use crate::context::CallContext;
use crate::error::Result;
use crate::models::{
    DeploymentExtended, DeploymentOperation, Disk, Provider, ResourceGroup, RoleAssignment,
    VirtualMachine, VirtualMachineImage, VirtualMachineImageResource,
};
use async_trait::async_trait;

/// Marketplace image lookups
#[async_trait]
pub trait VmImageFetcher: Send + Sync {
    async fn list_virtual_machine_images(
        &self,
        ctx: &CallContext,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
    ) -> Result<Vec<VirtualMachineImageResource>>;

    async fn get_virtual_machine_image(
        &self,
        ctx: &CallContext,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
        version: &str,
    ) -> Result<VirtualMachineImage>;
}

/// Resource-management operations needed to create, upgrade, scale and
/// tear down a cluster
#[async_trait]
pub trait AksEngineClient: VmImageFetcher {
    // Deployments

    async fn deploy_template(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
        template: serde_json::Value,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<DeploymentExtended>;

    async fn list_deployment_operations(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
    ) -> Result<Vec<DeploymentOperation>>;

    // Resource groups

    async fn ensure_resource_group(
        &self,
        ctx: &CallContext,
        name: &str,
        location: &str,
        managed_by: Option<&str>,
    ) -> Result<ResourceGroup>;

    async fn delete_resource_group(&self, ctx: &CallContext, name: &str) -> Result<()>;

    // Virtual machines

    async fn list_virtual_machines(
        &self,
        ctx: &CallContext,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachine>>;

    async fn get_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<VirtualMachine>;

    async fn restart_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<()>;

    async fn delete_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<()>;

    async fn get_virtual_machine_power_state(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<String>;

    // Disks and network

    async fn delete_managed_disk(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        disk_name: &str,
    ) -> Result<()>;

    async fn list_managed_disks_by_resource_group(
        &self,
        ctx: &CallContext,
        resource_group: &str,
    ) -> Result<Vec<Disk>>;

    async fn delete_network_interface(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        nic_name: &str,
    ) -> Result<()>;

    // Authorization and providers

    async fn delete_role_assignment_by_id(
        &self,
        ctx: &CallContext,
        role_assignment_id: &str,
    ) -> Result<RoleAssignment>;

    async fn list_role_assignments_for_principal(
        &self,
        ctx: &CallContext,
        scope: &str,
        principal_id: &str,
    ) -> Result<Vec<RoleAssignment>>;

    async fn list_providers(&self, ctx: &CallContext) -> Result<Vec<Provider>>;

    async fn ensure_providers_registered(
        &self,
        ctx: &CallContext,
        subscription_id: &str,
    ) -> Result<()>;
}

#[async_trait]
impl VmImageFetcher for AzureClient {
    async fn list_virtual_machine_images(
        &self,
        ctx: &CallContext,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
    ) -> Result<Vec<VirtualMachineImageResource>> {
        AzureClient::list_virtual_machine_images(self, ctx, location, publisher, offer, skus).await
    }

    async fn get_virtual_machine_image(
        &self,
        ctx: &CallContext,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
        version: &str,
    ) -> Result<VirtualMachineImage> {
        AzureClient::get_virtual_machine_image(self, ctx, location, publisher, offer, skus, version)
            .await
    }
}

#[async_trait]
impl AksEngineClient for AzureClient {
    async fn deploy_template(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
        template: serde_json::Value,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<DeploymentExtended> {
        AzureClient::deploy_template(self, ctx, resource_group, deployment_name, template, parameters)
            .await
    }

    async fn list_deployment_operations(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
    ) -> Result<Vec<DeploymentOperation>> {
        AzureClient::list_deployment_operations(self, ctx, resource_group, deployment_name).await
    }

    async fn ensure_resource_group(
        &self,
        ctx: &CallContext,
        name: &str,
        location: &str,
        managed_by: Option<&str>,
    ) -> Result<ResourceGroup> {
        AzureClient::ensure_resource_group(self, ctx, name, location, managed_by).await
    }

    async fn delete_resource_group(&self, ctx: &CallContext, name: &str) -> Result<()> {
        AzureClient::delete_resource_group(self, ctx, name).await
    }

    async fn list_virtual_machines(
        &self,
        ctx: &CallContext,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachine>> {
        AzureClient::list_virtual_machines(self, ctx, resource_group).await
    }

    async fn get_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<VirtualMachine> {
        AzureClient::get_virtual_machine(self, ctx, resource_group, name).await
    }

    async fn restart_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<()> {
        AzureClient::restart_virtual_machine(self, ctx, resource_group, name).await
    }

    async fn delete_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<()> {
        AzureClient::delete_virtual_machine(self, ctx, resource_group, name).await
    }

    async fn get_virtual_machine_power_state(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<String> {
        AzureClient::get_virtual_machine_power_state(self, ctx, resource_group, name).await
    }

    async fn delete_managed_disk(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        disk_name: &str,
    ) -> Result<()> {
        AzureClient::delete_managed_disk(self, ctx, resource_group, disk_name).await
    }

    async fn list_managed_disks_by_resource_group(
        &self,
        ctx: &CallContext,
        resource_group: &str,
    ) -> Result<Vec<Disk>> {
        AzureClient::list_managed_disks_by_resource_group(self, ctx, resource_group).await
    }

    async fn delete_network_interface(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        nic_name: &str,
    ) -> Result<()> {
        AzureClient::delete_network_interface(self, ctx, resource_group, nic_name).await
    }

    async fn delete_role_assignment_by_id(
        &self,
        ctx: &CallContext,
        role_assignment_id: &str,
    ) -> Result<RoleAssignment> {
        AzureClient::delete_role_assignment_by_id(self, ctx, role_assignment_id).await
    }

    async fn list_role_assignments_for_principal(
        &self,
        ctx: &CallContext,
        scope: &str,
        principal_id: &str,
    ) -> Result<Vec<RoleAssignment>> {
        AzureClient::list_role_assignments_for_principal(self, ctx, scope, principal_id).await
    }

    async fn list_providers(&self, ctx: &CallContext) -> Result<Vec<Provider>> {
        AzureClient::list_providers(self, ctx).await
    }

    async fn ensure_providers_registered(
        &self,
        ctx: &CallContext,
        subscription_id: &str,
    ) -> Result<()> {
        AzureClient::ensure_providers_registered(self, ctx, subscription_id).await
    }
}
