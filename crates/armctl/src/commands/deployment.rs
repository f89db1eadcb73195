use crate::client::Session;
use crate::output;
use anyhow::Context;
use colored::Colorize;
use serde_json::{Map, Value};
use std::path::Path;

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Deployment parameters from either a bare `{name: {value}}` object or a
/// full parameters file with `$schema` and `parameters`
fn parameters_from(value: Value) -> anyhow::Result<Map<String, Value>> {
    let Value::Object(mut object) = value else {
        anyhow::bail!("deployment parameters must be a JSON object");
    };
    if object.contains_key("$schema") || object.contains_key("contentVersion") {
        return match object.remove("parameters") {
            Some(Value::Object(parameters)) => Ok(parameters),
            Some(_) => anyhow::bail!("`parameters` must be a JSON object"),
            None => Ok(Map::new()),
        };
    }
    Ok(object)
}

fn load_inputs(template: &Path, parameters: Option<&Path>) -> anyhow::Result<(Value, Map<String, Value>)> {
    let template = read_json(template)?;
    let parameters = match parameters {
        Some(path) => parameters_from(read_json(path)?)
            .with_context(|| format!("invalid parameters file {}", path.display()))?,
        None => Map::new(),
    };
    Ok((template, parameters))
}

pub async fn create(
    session: &Session,
    resource_group: &str,
    name: &str,
    template: &Path,
    parameters: Option<&Path>,
) -> anyhow::Result<()> {
    let (template, parameters) = load_inputs(template, parameters)?;

    output::progress(format!("Deploying {} to {}...", name, resource_group));
    let deployment = session
        .client
        .deploy_template(&session.ctx, resource_group, name, template, parameters)
        .await?;

    output::success(format!(
        "Deployment {} finished: {}",
        name,
        deployment.provisioning_state().unwrap_or("unknown")
    ));
    if let Some(outputs) = deployment.properties.as_ref().and_then(|p| p.outputs.as_ref()) {
        println!("{}", "Outputs:".bold());
        output::print_json(outputs)?;
    }
    Ok(())
}

pub async fn validate(
    session: &Session,
    resource_group: &str,
    name: &str,
    template: &Path,
    parameters: Option<&Path>,
) -> anyhow::Result<()> {
    let (template, parameters) = load_inputs(template, parameters)?;

    let result = session
        .client
        .validate_template(&session.ctx, resource_group, name, template, parameters)
        .await?;

    match result.error.as_ref() {
        None => {
            output::success(format!("Template for {} is valid", name));
            Ok(())
        }
        Some(error) => anyhow::bail!("template is not valid: {}", error.full_message()),
    }
}

pub async fn show(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let deployment = session
        .client
        .get_deployment(&session.ctx, resource_group, name)
        .await?;
    output::print_json(&deployment)
}

pub async fn exists(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let exists = session
        .client
        .check_deployment_existence(&session.ctx, resource_group, name)
        .await?;
    println!("{}", exists);
    Ok(())
}

pub async fn operations(session: &Session, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let operations = session
        .client
        .list_deployment_operations(&session.ctx, resource_group, name)
        .await?;

    if operations.is_empty() {
        output::print_empty("deployment operations");
        return Ok(());
    }

    println!(
        "{:<40} {:<45} {:<12} {}",
        "RESOURCE".bold(),
        "TYPE".bold(),
        "STATE".bold(),
        "STATUS".bold()
    );
    for operation in &operations {
        let Some(properties) = operation.properties.as_ref() else {
            continue;
        };
        let target = properties.target_resource.as_ref();
        let state = output::or_dash(properties.provisioning_state.as_deref());
        let state = if state.eq_ignore_ascii_case("failed") {
            state.red().to_string()
        } else {
            state.to_string()
        };
        println!(
            "{:<40} {:<45} {:<12} {}",
            output::or_dash(target.and_then(|t| t.resource_name.as_deref())),
            output::or_dash(target.and_then(|t| t.resource_type.as_deref())),
            state,
            output::or_dash(properties.status_code.as_deref()),
        );
    }
    Ok(())
}
