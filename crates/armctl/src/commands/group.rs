use crate::client::Session;
use crate::output;
use colored::Colorize;
use std::collections::HashMap;

pub async fn ensure(
    session: &Session,
    name: &str,
    location: &str,
    managed_by: Option<&str>,
    tags: HashMap<String, String>,
) -> anyhow::Result<()> {
    output::progress(format!("Ensuring resource group {} in {}...", name, location));

    let group = if tags.is_empty() {
        session
            .client
            .ensure_resource_group(&session.ctx, name, location, managed_by)
            .await?
    } else {
        session
            .client
            .ensure_resource_group_with_tags(&session.ctx, name, location, managed_by, tags)
            .await?
    };

    output::success(format!("Resource group {} is ready", name));
    if let Some(tags) = group.tags.as_ref().filter(|t| !t.is_empty()) {
        let mut keys: Vec<_> = tags.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {} = {}", key.cyan(), tags[key]);
        }
    }
    Ok(())
}

pub async fn delete(session: &Session, name: &str) -> anyhow::Result<()> {
    output::progress(format!("Deleting resource group {}...", name));
    session.client.delete_resource_group(&session.ctx, name).await?;
    output::success(format!("Resource group {} deleted", name));
    Ok(())
}

pub async fn exists(session: &Session, name: &str) -> anyhow::Result<()> {
    let exists = session
        .client
        .check_resource_group_existence(&session.ctx, name)
        .await?;
    println!("{}", exists);
    Ok(())
}
