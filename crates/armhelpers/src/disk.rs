//! Managed disks

use crate::client::{AzureClient, ignore_not_found};
use crate::context::CallContext;
use crate::error::{Result, ResultExt};
use crate::models::Disk;
use crate::pager::collect_all;
use crate::poller::poll_until_done;

impl AzureClient {
    pub async fn get_managed_disk(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        disk_name: &str,
    ) -> Result<Disk> {
        ctx.run("getting managed disk", self.disks.get(resource_group, disk_name))
            .await
            .with_context(|| {
                format!(
                    "getting managed disk {} in resource group {}",
                    disk_name, resource_group
                )
            })
    }

    pub async fn list_managed_disks_by_resource_group(
        &self,
        ctx: &CallContext,
        resource_group: &str,
    ) -> Result<Vec<Disk>> {
        let what = format!("listing managed disks in resource group {}", resource_group);
        collect_all(ctx, &what, self.disks.list_by_resource_group(resource_group))
            .await
            .context(what)
    }

    pub async fn delete_managed_disk(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        disk_name: &str,
    ) -> Result<()> {
        let what = format!(
            "deleting managed disk {} in resource group {}",
            disk_name, resource_group
        );
        let result = async {
            let poller = ctx
                .run(&what, self.disks.begin_delete(resource_group, disk_name))
                .await?;
            poll_until_done(ctx, &what, poller, self.poll_frequency).await
        }
        .await;
        ignore_not_found(result, &what).context(what)
    }
}
