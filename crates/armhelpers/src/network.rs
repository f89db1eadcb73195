//! Network interfaces

use crate::client::{AzureClient, ignore_not_found};
use crate::context::CallContext;
use crate::error::{Result, ResultExt};
use crate::models::NetworkInterface;
use crate::pager::collect_all;
use crate::poller::poll_until_done;

impl AzureClient {
    pub async fn get_network_interface(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        nic_name: &str,
    ) -> Result<NetworkInterface> {
        ctx.run(
            "getting network interface",
            self.interfaces.get(resource_group, nic_name),
        )
        .await
        .with_context(|| {
            format!(
                "getting network interface {} in resource group {}",
                nic_name, resource_group
            )
        })
    }

    pub async fn list_network_interfaces(
        &self,
        ctx: &CallContext,
        resource_group: &str,
    ) -> Result<Vec<NetworkInterface>> {
        let what = format!("listing network interfaces in resource group {}", resource_group);
        collect_all(ctx, &what, self.interfaces.list(resource_group))
            .await
            .context(what)
    }

    pub async fn delete_network_interface(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        nic_name: &str,
    ) -> Result<()> {
        let what = format!(
            "deleting network interface {} in resource group {}",
            nic_name, resource_group
        );
        let result = async {
            let poller = ctx
                .run(&what, self.interfaces.begin_delete(resource_group, nic_name))
                .await?;
            poll_until_done(ctx, &what, poller, self.poll_frequency).await
        }
        .await;
        ignore_not_found(result, &what).context(what)
    }
}
