use crate::client::Session;
use crate::output;
use colored::Colorize;

pub async fn list(session: &Session) -> anyhow::Result<()> {
    let mut providers = session.client.list_providers(&session.ctx).await?;
    providers.sort_by(|a, b| a.namespace.cmp(&b.namespace));

    for provider in &providers {
        let state = provider
            .registration_state
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let state = if provider.is_registered() {
            state.green()
        } else {
            state.dimmed()
        };
        println!(
            "{:<48} {}",
            output::or_dash(provider.namespace.as_deref()),
            state
        );
    }
    Ok(())
}

pub async fn ensure(session: &Session) -> anyhow::Result<()> {
    let subscription_id = session.client.subscription_id().to_string();
    output::progress(format!(
        "Registering {} with {}...",
        subscription_id,
        session.client.required_providers().join(", ")
    ));
    session
        .client
        .ensure_providers_registered(&session.ctx, &subscription_id)
        .await?;
    output::success("Required resource providers are registered");
    Ok(())
}
