//! `Microsoft.Resources`: deployments, resource groups and providers

use crate::client::ArmRestClient;
use crate::lro::FinalState;
use armhelpers::api::{DeploymentsApi, ProvidersApi, ResourceGroupsApi};
use armhelpers::models::{
    Deployment, DeploymentExtended, DeploymentOperation, DeploymentValidateResult, Provider,
    ResourceGroup,
};
use armhelpers::{BoxPager, BoxPoller, Result};
use async_trait::async_trait;
use reqwest::Method;

impl ArmRestClient {
    fn deployment_path(&self, resource_group: &str, deployment_name: &str) -> String {
        format!(
            "{}/providers/Microsoft.Resources/deployments/{}",
            self.resource_group_path(resource_group),
            deployment_name
        )
    }

    fn resources_url(&self, path: &str) -> Result<url::Url> {
        self.url(path, &self.api_versions().resources)
    }
}

#[async_trait]
impl DeploymentsApi for ArmRestClient {
    async fn begin_create_or_update(
        &self,
        resource_group: &str,
        deployment_name: &str,
        deployment: Deployment,
    ) -> Result<BoxPoller<DeploymentExtended>> {
        let url = self.resources_url(&self.deployment_path(resource_group, deployment_name))?;
        let body = serde_json::to_value(&deployment)?;
        self.begin(Method::PUT, url, Some(&body), FinalState::OriginalUri)
            .await
    }

    async fn begin_validate(
        &self,
        resource_group: &str,
        deployment_name: &str,
        deployment: Deployment,
    ) -> Result<BoxPoller<DeploymentValidateResult>> {
        let path = format!(
            "{}/validate",
            self.deployment_path(resource_group, deployment_name)
        );
        let url = self.resources_url(&path)?;
        let body = serde_json::to_value(&deployment)?;
        self.begin(Method::POST, url, Some(&body), FinalState::Location)
            .await
    }

    async fn get(&self, resource_group: &str, deployment_name: &str) -> Result<DeploymentExtended> {
        let url = self.resources_url(&self.deployment_path(resource_group, deployment_name))?;
        self.get_json(url).await
    }

    async fn check_existence(&self, resource_group: &str, deployment_name: &str) -> Result<bool> {
        let url = self.resources_url(&self.deployment_path(resource_group, deployment_name))?;
        self.head_exists(url).await
    }

    fn list_operations(
        &self,
        resource_group: &str,
        deployment_name: &str,
    ) -> BoxPager<DeploymentOperation> {
        let path = format!(
            "{}/operations",
            self.deployment_path(resource_group, deployment_name)
        );
        self.pager(self.resources_url(&path))
    }
}

#[async_trait]
impl ResourceGroupsApi for ArmRestClient {
    async fn get(&self, name: &str) -> Result<ResourceGroup> {
        let url = self.resources_url(&self.resource_group_path(name))?;
        self.get_json(url).await
    }

    async fn create_or_update(&self, name: &str, group: ResourceGroup) -> Result<ResourceGroup> {
        let url = self.resources_url(&self.resource_group_path(name))?;
        let body = serde_json::to_value(&group)?;
        self.put_json(url, &body).await
    }

    async fn check_existence(&self, name: &str) -> Result<bool> {
        let url = self.resources_url(&self.resource_group_path(name))?;
        self.head_exists(url).await
    }

    async fn begin_delete(&self, name: &str) -> Result<BoxPoller<()>> {
        let url = self.resources_url(&self.resource_group_path(name))?;
        self.start_delete(url).await
    }
}

#[async_trait]
impl ProvidersApi for ArmRestClient {
    fn list(&self) -> BoxPager<Provider> {
        let path = format!("{}/providers", self.subscription_path());
        self.pager(self.resources_url(&path))
    }

    async fn register(&self, namespace: &str) -> Result<Provider> {
        let path = format!(
            "{}/providers/{}/register",
            self.subscription_path(),
            namespace
        );
        let url = self.resources_url(&path)?;
        self.post_json(url).await
    }
}
