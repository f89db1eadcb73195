//! `Microsoft.Network` network interfaces

use crate::client::ArmRestClient;
use armhelpers::api::NetworkInterfacesApi;
use armhelpers::models::NetworkInterface;
use armhelpers::{BoxPager, BoxPoller, Result};
use async_trait::async_trait;

impl ArmRestClient {
    fn network_interfaces_path(&self, resource_group: &str) -> String {
        format!(
            "{}/providers/Microsoft.Network/networkInterfaces",
            self.resource_group_path(resource_group)
        )
    }
}

#[async_trait]
impl NetworkInterfacesApi for ArmRestClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<NetworkInterface> {
        let path = format!("{}/{}", self.network_interfaces_path(resource_group), name);
        self.get_json(self.url(&path, &self.api_versions().network)?)
            .await
    }

    fn list(&self, resource_group: &str) -> BoxPager<NetworkInterface> {
        let path = self.network_interfaces_path(resource_group);
        self.pager(self.url(&path, &self.api_versions().network))
    }

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        let path = format!("{}/{}", self.network_interfaces_path(resource_group), name);
        self.start_delete(self.url(&path, &self.api_versions().network)?)
            .await
    }
}
