//! Virtual machines and marketplace images

use crate::client::{AzureClient, ignore_not_found};
use crate::context::CallContext;
use crate::error::{Result, ResultExt};
use crate::models::{VirtualMachine, VirtualMachineImage, VirtualMachineImageResource};
use crate::pager::collect_all;
use crate::poller::poll_until_done;

impl AzureClient {
    pub async fn get_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<VirtualMachine> {
        ctx.run(
            "getting virtual machine",
            self.virtual_machines.get(resource_group, name, false),
        )
        .await
        .with_context(|| {
            format!(
                "getting virtual machine {} in resource group {}",
                name, resource_group
            )
        })
    }

    pub async fn list_virtual_machines(
        &self,
        ctx: &CallContext,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachine>> {
        let what = format!("listing virtual machines in resource group {}", resource_group);
        collect_all(ctx, &what, self.virtual_machines.list(resource_group))
            .await
            .context(what)
    }

    pub async fn restart_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<()> {
        let what = format!(
            "restarting virtual machine {} in resource group {}",
            name, resource_group
        );
        async {
            let poller = ctx
                .run(&what, self.virtual_machines.begin_restart(resource_group, name))
                .await?;
            poll_until_done(ctx, &what, poller, self.poll_frequency).await
        }
        .await
        .context(what)
    }

    /// Delete a VM and wait; a VM that is already gone counts as deleted
    pub async fn delete_virtual_machine(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<()> {
        let what = format!(
            "deleting virtual machine {} in resource group {}",
            name, resource_group
        );
        let result = async {
            let poller = ctx
                .run(&what, self.virtual_machines.begin_delete(resource_group, name))
                .await?;
            poll_until_done(ctx, &what, poller, self.poll_frequency).await
        }
        .await;
        ignore_not_found(result, &what).context(what)
    }

    /// Power state of a VM, e.g. `running` or `deallocated`
    ///
    /// Returns [`crate::POWER_STATE_UNKNOWN`] when the instance view reports none.
    pub async fn get_virtual_machine_power_state(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        name: &str,
    ) -> Result<String> {
        let vm = ctx
            .run(
                "fetching virtual machine resource",
                self.virtual_machines.get(resource_group, name, true),
            )
            .await
            .with_context(|| {
                format!(
                    "fetching virtual machine resource {} in resource group {}",
                    name, resource_group
                )
            })?;
        Ok(vm.power_state())
    }

    pub async fn list_virtual_machine_images(
        &self,
        ctx: &CallContext,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
    ) -> Result<Vec<VirtualMachineImageResource>> {
        ctx.run(
            "listing virtual machine images",
            self.images.list(location, publisher, offer, skus),
        )
        .await
        .context("listing virtual machine images")
    }

    pub async fn get_virtual_machine_image(
        &self,
        ctx: &CallContext,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
        version: &str,
    ) -> Result<VirtualMachineImage> {
        ctx.run(
            "fetching virtual machine image",
            self.images.get(location, publisher, offer, skus, version),
        )
        .await
        .context("fetching virtual machine image")
    }
}
