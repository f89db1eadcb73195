//! `Microsoft.Compute`: virtual machines, marketplace images and managed disks

use crate::client::ArmRestClient;
use crate::lro::FinalState;
use armhelpers::api::{DisksApi, VirtualMachineImagesApi, VirtualMachinesApi};
use armhelpers::models::{Disk, VirtualMachine, VirtualMachineImage, VirtualMachineImageResource};
use armhelpers::{BoxPager, BoxPoller, Result};
use async_trait::async_trait;
use reqwest::Method;
use url::Url;

impl ArmRestClient {
    fn virtual_machine_path(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}/providers/Microsoft.Compute/virtualMachines/{}",
            self.resource_group_path(resource_group),
            name
        )
    }

    fn disk_path(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}/providers/Microsoft.Compute/disks/{}",
            self.resource_group_path(resource_group),
            name
        )
    }

    fn image_versions_path(&self, location: &str, publisher: &str, offer: &str, skus: &str) -> String {
        format!(
            "{}/providers/Microsoft.Compute/locations/{}/publishers/{}/artifacttypes/vmimage/offers/{}/skus/{}/versions",
            self.subscription_path(),
            location,
            publisher,
            offer,
            skus
        )
    }

    fn compute_url(&self, path: &str) -> Result<Url> {
        self.url(path, &self.api_versions().compute)
    }

    fn disks_url(&self, path: &str) -> Result<Url> {
        self.url(path, &self.api_versions().disks)
    }
}

#[async_trait]
impl VirtualMachinesApi for ArmRestClient {
    async fn get(
        &self,
        resource_group: &str,
        name: &str,
        instance_view: bool,
    ) -> Result<VirtualMachine> {
        let mut url = self.compute_url(&self.virtual_machine_path(resource_group, name))?;
        if instance_view {
            url.query_pairs_mut().append_pair("$expand", "instanceView");
        }
        self.get_json(url).await
    }

    fn list(&self, resource_group: &str) -> BoxPager<VirtualMachine> {
        let path = format!(
            "{}/providers/Microsoft.Compute/virtualMachines",
            self.resource_group_path(resource_group)
        );
        self.pager(self.compute_url(&path))
    }

    async fn begin_restart(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        let path = format!("{}/restart", self.virtual_machine_path(resource_group, name));
        let url = self.compute_url(&path)?;
        self.begin(Method::POST, url, None, FinalState::None).await
    }

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        let url = self.compute_url(&self.virtual_machine_path(resource_group, name))?;
        self.start_delete(url).await
    }
}

#[async_trait]
impl VirtualMachineImagesApi for ArmRestClient {
    /// The service answers with a bare JSON array, not a paged list
    async fn list(
        &self,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
    ) -> Result<Vec<VirtualMachineImageResource>> {
        let url = self.compute_url(&self.image_versions_path(location, publisher, offer, skus))?;
        self.get_json(url).await
    }

    async fn get(
        &self,
        location: &str,
        publisher: &str,
        offer: &str,
        skus: &str,
        version: &str,
    ) -> Result<VirtualMachineImage> {
        let path = format!(
            "{}/{}",
            self.image_versions_path(location, publisher, offer, skus),
            version
        );
        self.get_json(self.compute_url(&path)?).await
    }
}

#[async_trait]
impl DisksApi for ArmRestClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Disk> {
        let url = self.disks_url(&self.disk_path(resource_group, name))?;
        self.get_json(url).await
    }

    fn list_by_resource_group(&self, resource_group: &str) -> BoxPager<Disk> {
        let path = format!(
            "{}/providers/Microsoft.Compute/disks",
            self.resource_group_path(resource_group)
        );
        self.pager(self.disks_url(&path))
    }

    async fn begin_delete(&self, resource_group: &str, name: &str) -> Result<BoxPoller<()>> {
        let url = self.disks_url(&self.disk_path(resource_group, name))?;
        self.start_delete(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiVersions, RetryConfig};
    use crate::credential::StaticTokenCredential;
    use crate::environment::CloudEnvironment;
    use armhelpers::{CallContext, collect_all, poll_until_done};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RG: &str = "/subscriptions/sub-1/resourceGroups/rg";

    fn client(server: &MockServer) -> ArmRestClient {
        let env = CloudEnvironment::custom("Test", server.uri(), server.uri(), server.uri());
        ArmRestClient::with_options(
            reqwest::Client::new(),
            &env,
            "sub-1",
            Arc::new(StaticTokenCredential::new("t")),
            RetryConfig::disabled(),
            ApiVersions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_vm_with_instance_view() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/providers/Microsoft.Compute/virtualMachines/k8s-master-0", RG)))
            .and(query_param("$expand", "instanceView"))
            .and(query_param("api-version", "2020-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "k8s-master-0",
                "location": "westus2",
                "properties": {
                    "instanceView": {
                        "statuses": [
                            {"code": "ProvisioningState/succeeded"},
                            {"code": "PowerState/running"}
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let vm = VirtualMachinesApi::get(&client, "rg", "k8s-master-0", true)
            .await
            .unwrap();
        assert_eq!(vm.power_state(), "running");
    }

    #[tokio::test]
    async fn test_restart_waits_for_async_operation() {
        let server = MockServer::start().await;
        let status_url = format!("{}/operations/restart-1", server.uri());
        Mock::given(method("POST"))
            .and(path(format!(
                "{}/providers/Microsoft.Compute/virtualMachines/vm-0/restart",
                RG
            )))
            .respond_with(
                ResponseTemplate::new(202).insert_header("Azure-AsyncOperation", status_url.as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/restart-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "Succeeded",
                "startTime": "2020-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let poller = client.begin_restart("rg", "vm-0").await.unwrap();
        poll_until_done(&CallContext::background(), "restart", poller, Duration::from_millis(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_images_returns_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/subscriptions/sub-1/providers/Microsoft.Compute/locations/westus2/publishers/Canonical/artifacttypes/vmimage/offers/UbuntuServer/skus/18.04-LTS/versions",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "18.04.202001010", "location": "westus2"},
                {"name": "18.04.202002020", "location": "westus2"}
            ])))
            .mount(&server)
            .await;

        let client = client(&server);
        let images = VirtualMachineImagesApi::list(&client, "westus2", "Canonical", "UbuntuServer", "18.04-LTS")
            .await
            .unwrap();
        let versions: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(versions, vec!["18.04.202001010", "18.04.202002020"]);
    }

    #[tokio::test]
    async fn test_disks_use_disk_api_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/providers/Microsoft.Compute/disks", RG)))
            .and(query_param("api-version", "2019-07-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"name": "k8s-master-0_OsDisk", "location": "westus2"}]
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let disks = collect_all(
            &CallContext::background(),
            "disks",
            client.list_by_resource_group("rg"),
        )
        .await
        .unwrap();
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].name.as_deref(), Some("k8s-master-0_OsDisk"));
    }

    #[tokio::test]
    async fn test_delete_disk_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/providers/Microsoft.Compute/disks/data-0", RG)))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let poller = DisksApi::begin_delete(&client, "rg", "data-0").await.unwrap();
        poll_until_done(&CallContext::background(), "delete disk", poller, Duration::from_millis(1))
            .await
            .unwrap();
    }
}
