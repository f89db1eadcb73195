use crate::client::Session;
use crate::output;
use colored::Colorize;

pub async fn list(session: &Session, resource_group: &str) -> anyhow::Result<()> {
    let nics = session
        .client
        .list_network_interfaces(&session.ctx, resource_group)
        .await?;

    if nics.is_empty() {
        output::print_empty("network interfaces");
        return Ok(());
    }

    println!(
        "{:<40} {:<20} {:<8} {}",
        "NAME".bold(),
        "MAC".bold(),
        "PRIMARY".bold(),
        "VIRTUAL_MACHINE".bold()
    );
    for nic in &nics {
        let properties = nic.properties.as_ref();
        let primary = match properties.and_then(|p| p.primary) {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        let vm = properties
            .and_then(|p| p.virtual_machine.as_ref())
            .and_then(|vm| vm.id.as_deref())
            .and_then(|id| id.rsplit('/').next());
        println!(
            "{:<40} {:<20} {:<8} {}",
            output::or_dash(nic.name.as_deref()).cyan(),
            output::or_dash(properties.and_then(|p| p.mac_address.as_deref())),
            primary,
            output::or_dash(vm),
        );
    }
    Ok(())
}

pub async fn show(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let nic = session
        .client
        .get_network_interface(&session.ctx, resource_group, name)
        .await?;
    output::print_json(&nic)
}

pub async fn delete(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    output::progress(format!("Deleting network interface {}...", name));
    session
        .client
        .delete_network_interface(&session.ctx, resource_group, name)
        .await?;
    output::success(format!("Network interface {} deleted", name));
    Ok(())
}
