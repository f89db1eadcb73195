use crate::client::Session;
use crate::output;
use colored::Colorize;

fn colored_power_state(state: &str) -> String {
    match state {
        "running" => state.green().to_string(),
        "deallocated" | "stopped" => state.red().to_string(),
        _ => state.yellow().to_string(),
    }
}

pub async fn list(session: &Session, resource_group: &str) -> anyhow::Result<()> {
    let vms = session
        .client
        .list_virtual_machines(&session.ctx, resource_group)
        .await?;

    if vms.is_empty() {
        output::print_empty("virtual machines");
        return Ok(());
    }

    println!(
        "{:<32} {:<16} {:<20} {}",
        "NAME".bold(),
        "LOCATION".bold(),
        "SIZE".bold(),
        "PROVISIONING".bold()
    );
    for vm in &vms {
        let properties = vm.properties.as_ref();
        println!(
            "{:<32} {:<16} {:<20} {}",
            output::or_dash(vm.name.as_deref()).cyan(),
            output::or_dash(vm.location.as_deref()),
            output::or_dash(
                properties
                    .and_then(|p| p.hardware_profile.as_ref())
                    .and_then(|h| h.vm_size.as_deref())
            ),
            output::or_dash(properties.and_then(|p| p.provisioning_state.as_deref())),
        );
    }
    Ok(())
}

pub async fn show(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let vm = session
        .client
        .get_virtual_machine(&session.ctx, resource_group, name)
        .await?;
    output::print_json(&vm)
}

pub async fn restart(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    output::progress(format!("Restarting {}...", name));
    session
        .client
        .restart_virtual_machine(&session.ctx, resource_group, name)
        .await?;
    output::success(format!("{} restarted", name));
    Ok(())
}

pub async fn delete(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    output::progress(format!("Deleting {}...", name));
    session
        .client
        .delete_virtual_machine(&session.ctx, resource_group, name)
        .await?;
    output::success(format!("{} deleted", name));
    Ok(())
}

pub async fn power_state(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let state = session
        .client
        .get_virtual_machine_power_state(&session.ctx, resource_group, name)
        .await?;
    println!("{}", colored_power_state(&state));
    Ok(())
}
