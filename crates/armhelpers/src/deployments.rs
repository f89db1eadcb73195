//! Template deployment

use crate::client::AzureClient;
use crate::context::CallContext;
use crate::error::{Result, ResultExt};
use crate::models::{Deployment, DeploymentExtended, DeploymentOperation, DeploymentValidateResult};
use crate::pager::collect_all;
use crate::poller::poll_until_done;

impl AzureClient {
    /// Deploy `template` into `resource_group` and wait for the outcome
    ///
    /// Always incremental: resources absent from the template are left alone.
    pub async fn deploy_template(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
        template: serde_json::Value,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<DeploymentExtended> {
        let deployment = Deployment::incremental(template, parameters);
        let what = format!(
            "deploying template {} in resource group {}",
            deployment_name, resource_group
        );

        tracing::info!(
            "Starting ARM Deployment {} in resource group {}. This will take some time...",
            deployment_name,
            resource_group
        );

        let result = async {
            let poller = ctx
                .run(
                    &what,
                    self.deployments
                        .begin_create_or_update(resource_group, deployment_name, deployment),
                )
                .await?;
            poll_until_done(ctx, &what, poller, self.poll_frequency).await
        }
        .await;

        match result {
            Ok(deployment) => {
                tracing::info!("Finished ARM Deployment ({}). Succeeded", deployment_name);
                Ok(deployment)
            }
            Err(e) => {
                tracing::info!("Finished ARM Deployment ({}). Error: {}", deployment_name, e);
                Err(e.context(what))
            }
        }
    }

    /// Dry-run `template` against the service's validation endpoint
    pub async fn validate_template(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
        template: serde_json::Value,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<DeploymentValidateResult> {
        let deployment = Deployment::incremental(template, parameters);
        let what = format!(
            "validating template {} in resource group {}",
            deployment_name, resource_group
        );

        async {
            let poller = ctx
                .run(
                    &what,
                    self.deployments
                        .begin_validate(resource_group, deployment_name, deployment),
                )
                .await?;
            poll_until_done(ctx, &what, poller, self.poll_frequency).await
        }
        .await
        .context(what)
    }

    pub async fn get_deployment(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
    ) -> Result<DeploymentExtended> {
        ctx.run(
            "getting deployment",
            self.deployments.get(resource_group, deployment_name),
        )
        .await
        .with_context(|| {
            format!(
                "getting deployment {} in resource group {}",
                deployment_name, resource_group
            )
        })
    }

    pub async fn check_deployment_existence(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
    ) -> Result<bool> {
        ctx.run(
            "checking deployment",
            self.deployments
                .check_existence(resource_group, deployment_name),
        )
        .await
        .with_context(|| {
            format!(
                "checking existence of deployment {} in resource group {}",
                deployment_name, resource_group
            )
        })
    }

    /// Full operation history of a deployment, every page drained
    pub async fn list_deployment_operations(
        &self,
        ctx: &CallContext,
        resource_group: &str,
        deployment_name: &str,
    ) -> Result<Vec<DeploymentOperation>> {
        let what = format!(
            "listing operations of deployment {} in resource group {}",
            deployment_name, resource_group
        );
        let pager = self
            .deployments
            .list_operations(resource_group, deployment_name);
        collect_all(ctx, &what, pager).await.context(what)
    }
}
