use crate::client::Session;
use crate::output;
use colored::Colorize;

pub async fn list(session: &Session, resource_group: &str) -> anyhow::Result<()> {
    let disks = session
        .client
        .list_managed_disks_by_resource_group(&session.ctx, resource_group)
        .await?;

    if disks.is_empty() {
        output::print_empty("managed disks");
        return Ok(());
    }

    println!(
        "{:<48} {:>8} {:<12} {}",
        "NAME".bold(),
        "SIZE_GB".bold(),
        "STATE".bold(),
        "ATTACHED_TO".bold()
    );
    for disk in &disks {
        let properties = disk.properties.as_ref();
        let size = properties
            .and_then(|p| p.disk_size_gb)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let attached = disk
            .managed_by
            .as_deref()
            .and_then(|id| id.rsplit('/').next())
            .unwrap_or("-");
        println!(
            "{:<48} {:>8} {:<12} {}",
            output::or_dash(disk.name.as_deref()).cyan(),
            size,
            output::or_dash(properties.and_then(|p| p.disk_state.as_deref())),
            attached,
        );
    }
    Ok(())
}

pub async fn show(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let disk = session
        .client
        .get_managed_disk(&session.ctx, resource_group, name)
        .await?;
    output::print_json(&disk)
}

pub async fn delete(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    output::progress(format!("Deleting disk {}...", name));
    session
        .client
        .delete_managed_disk(&session.ctx, resource_group, name)
        .await?;
    output::success(format!("Disk {} deleted", name));
    Ok(())
}
