//! Resource provider registration

use crate::client::{AzureClient, DEFAULT_ARM_OPERATION_TIMEOUT};
use crate::context::CallContext;
use crate::error::{ArmError, Result, ResultExt};
use crate::models::Provider;
use crate::pager::collect_all;
use std::collections::HashMap;

impl AzureClient {
    /// Every resource provider visible to the subscription
    pub async fn list_providers(&self, ctx: &CallContext) -> Result<Vec<Provider>> {
        collect_all(ctx, "listing providers", self.providers.list())
            .await
            .context("listing providers")
    }

    /// Make sure each required provider is registered with the subscription
    ///
    /// Registration is requested but not awaited. A required namespace the
    /// subscription does not know about fails with
    /// [`ArmError::UnknownProvider`] before any registration is requested.
    pub async fn ensure_providers_registered(
        &self,
        ctx: &CallContext,
        subscription_id: &str,
    ) -> Result<()> {
        let bounded;
        let ctx = match ctx.deadline() {
            Some(_) => ctx,
            None => {
                bounded = ctx.child_with_timeout(DEFAULT_ARM_OPERATION_TIMEOUT);
                &bounded
            }
        };

        let registered: HashMap<String, bool> = self
            .list_providers(ctx)
            .await
            .with_context(|| {
                format!(
                    "Error listing registered providers for subscription {}",
                    subscription_id
                )
            })?
            .into_iter()
            .filter_map(|p| {
                let registered = p.is_registered();
                p.namespace.map(|ns| (ns.to_lowercase(), registered))
            })
            .collect();

        if let Some(missing) = self
            .required_providers
            .iter()
            .find(|ns| !registered.contains_key(&ns.to_lowercase()))
        {
            return Err(ArmError::UnknownProvider(missing.clone()));
        }

        for namespace in &self.required_providers {
            if registered.get(&namespace.to_lowercase()) == Some(&true) {
                tracing::debug!("Already registered for {:?}", namespace);
                continue;
            }
            tracing::info!(
                provider = %namespace,
                subscription = %subscription_id,
                "Registering subscription to resource provider"
            );
            ctx.run("registering provider", self.providers.register(namespace))
                .await
                .with_context(|| {
                    format!(
                        "registering provider {} for subscription {}",
                        namespace, subscription_id
                    )
                })?;
        }
        Ok(())
    }
}
