use crate::client::Session;
use crate::output;
use colored::Colorize;

pub async fn list(session: &Session, principal_id: &str) -> anyhow::Result<()> {
    let scope = format!("/subscriptions/{}", session.client.subscription_id());
    let assignments = session
        .client
        .list_role_assignments_for_principal(&session.ctx, &scope, principal_id)
        .await?;

    if assignments.is_empty() {
        output::print_empty("role assignments");
        return Ok(());
    }

    for assignment in &assignments {
        let properties = assignment.properties.as_ref();
        println!("{}", output::or_dash(assignment.id.as_deref()).cyan());
        println!(
            "  scope: {}",
            output::or_dash(properties.and_then(|p| p.scope.as_deref()))
        );
        println!(
            "  role:  {}",
            output::or_dash(properties.and_then(|p| p.role_definition_id.as_deref()))
        );
    }
    Ok(())
}

pub async fn delete(session: &Session, id: &str) -> anyhow::Result<()> {
    let assignment = session
        .client
        .delete_role_assignment_by_id(&session.ctx, id)
        .await?;
    output::success(format!(
        "Role assignment {} deleted",
        assignment.name.as_deref().unwrap_or(id)
    ));
    Ok(())
}
