use crate::client::Session;
use crate::output;

pub async fn list(
    session: &Session,
    location: &str,
    publisher: &str,
    offer: &str,
    sku: &str,
) -> anyhow::Result<()> {
    let images = session
        .client
        .list_virtual_machine_images(&session.ctx, location, publisher, offer, sku)
        .await?;

    if images.is_empty() {
        output::print_empty("image versions");
        return Ok(());
    }
    for image in &images {
        println!("{}", image.name);
    }
    Ok(())
}

pub async fn show(
    session: &Session,
    location: &str,
    publisher: &str,
    offer: &str,
    sku: &str,
    version: &str,
) -> anyhow::Result<()> {
    let image = session
        .client
        .get_virtual_machine_image(&session.ctx, location, publisher, offer, sku, version)
        .await?;
    output::print_json(&image)
}
