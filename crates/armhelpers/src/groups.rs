//! Resource-group lifecycle

use crate::client::{AzureClient, ignore_not_found};
use crate::context::CallContext;
use crate::error::{Result, ResultExt};
use crate::models::ResourceGroup;
use crate::poller::poll_until_done;
use std::collections::HashMap;

impl AzureClient {
    /// Create or update `name` in `location`, keeping its current tags
    pub async fn ensure_resource_group(
        &self,
        ctx: &CallContext,
        name: &str,
        location: &str,
        managed_by: Option<&str>,
    ) -> Result<ResourceGroup> {
        self.ensure_resource_group_with_tags(ctx, name, location, managed_by, HashMap::new())
            .await
    }

    /// Like [`AzureClient::ensure_resource_group`]; `tags` are merged over
    /// the group's existing tags, overwriting matching keys
    pub async fn ensure_resource_group_with_tags(
        &self,
        ctx: &CallContext,
        name: &str,
        location: &str,
        managed_by: Option<&str>,
        tags: HashMap<String, String>,
    ) -> Result<ResourceGroup> {
        let mut merged = match ctx.run("reading resource group", self.groups.get(name)).await {
            Ok(existing) => existing.tags.unwrap_or_default(),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Resource group {} does not exist yet", name);
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read resource group {} before update, existing tags are not preserved: {}",
                    name,
                    e
                );
                HashMap::new()
            }
        };
        merged.extend(tags);

        let group = ResourceGroup {
            name: Some(name.to_string()),
            location: location.to_string(),
            managed_by: managed_by.map(str::to_string),
            tags: if merged.is_empty() { None } else { Some(merged) },
            ..Default::default()
        };

        ctx.run(
            "creating resource group",
            self.groups.create_or_update(name, group),
        )
        .await
        .with_context(|| format!("ensuring resource group {} in {}", name, location))
    }

    pub async fn check_resource_group_existence(&self, ctx: &CallContext, name: &str) -> Result<bool> {
        ctx.run("checking resource group", self.groups.check_existence(name))
            .await
            .with_context(|| format!("checking existence of resource group {}", name))
    }

    /// Delete `name` and wait for the operation to finish
    ///
    /// A group that is already gone counts as deleted.
    pub async fn delete_resource_group(&self, ctx: &CallContext, name: &str) -> Result<()> {
        let what = format!("deleting resource group {}", name);
        let result = async {
            let poller = ctx.run(&what, self.groups.begin_delete(name)).await?;
            poll_until_done(ctx, &what, poller, self.poll_frequency).await
        }
        .await;

        ignore_not_found(result, &what).context(what)
    }
}
