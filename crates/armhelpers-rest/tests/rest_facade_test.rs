//! The facade driven end to end through the REST backend

use armhelpers::{AzureClient, CallContext, ErrorKind};
use armhelpers_rest::{
    ClientOptions, CloudEnvironment, RetryConfig, StaticTokenCredential,
    new_azure_client_with_token_credential,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUB: &str = "/subscriptions/sub-1";
const RG: &str = "/subscriptions/sub-1/resourceGroups/rg";

async fn client(server: &MockServer) -> AzureClient {
    let options = ClientOptions {
        retry: RetryConfig::disabled(),
        poll_frequency: Duration::from_millis(1),
        ..ClientOptions::with_environment(CloudEnvironment::custom(
            "Test",
            server.uri(),
            server.uri(),
            server.uri(),
        ))
    };
    new_azure_client_with_token_credential(
        &options,
        "sub-1",
        Arc::new(StaticTokenCredential::new("token")),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_deploy_template_waits_for_async_operation() {
    let server = MockServer::start().await;
    let deployment = format!("{}/providers/Microsoft.Resources/deployments/kube", RG);
    let status_url = format!("{}/operations/deploy-1", server.uri());

    Mock::given(method("PUT"))
        .and(path(deployment.as_str()))
        .and(body_partial_json(json!({"properties": {"mode": "Incremental", "parameters": {"count": {"value": 3}}}})))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Azure-AsyncOperation", status_url.as_str())
                .set_body_json(json!({"name": "kube", "properties": {"provisioningState": "Accepted"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/deploy-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Retry-After", "0")
                .set_body_json(json!({"status": "Running"})),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/deploy-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(deployment.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "kube",
            "properties": {"provisioningState": "Succeeded", "outputs": {"fqdn": {"value": "kube.westus2.cloudapp.azure.com"}}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let mut parameters = serde_json::Map::new();
    parameters.insert("count".to_string(), json!({"value": 3}));

    let result = client
        .deploy_template(
            &CallContext::with_timeout(Duration::from_secs(30)),
            "rg",
            "kube",
            json!({"$schema": "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#", "resources": []}),
            parameters,
        )
        .await
        .unwrap();
    assert_eq!(result.provisioning_state(), Some("Succeeded"));
}

#[tokio::test]
async fn test_failed_deployment_names_the_cause() {
    let server = MockServer::start().await;
    let status_url = format!("{}/operations/deploy-2", server.uri());

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201).insert_header("Azure-AsyncOperation", status_url.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/deploy-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Failed",
            "error": {"code": "InvalidTemplateDeployment", "message": "The template deployment is not valid."}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let err = client
        .deploy_template(&CallContext::background(), "rg", "kube", json!({}), Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderOperation);
    let message = err.to_string();
    assert!(message.contains("kube"), "{}", message);
    assert!(message.contains("rg"), "{}", message);
    assert!(message.contains("InvalidTemplateDeployment"), "{}", message);
}

#[tokio::test]
async fn test_ensure_providers_registers_only_unregistered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/providers", SUB)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"namespace": "Microsoft.Compute", "registrationState": "Registered"},
                {"namespace": "Microsoft.Network", "registrationState": "Registered"}
            ],
            "nextLink": format!("{}{}/providers?page=2", server.uri(), SUB)
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/providers", SUB)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"namespace": "Microsoft.Storage", "registrationState": "NotRegistered"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/providers/Microsoft.Storage/register", SUB)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "namespace": "Microsoft.Storage",
            "registrationState": "Registering"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    client
        .ensure_providers_registered(&CallContext::background(), "sub-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_resource_group_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/subscriptions/sub-1/resourceGroups/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceGroupNotFound", "message": "Resource group 'gone' could not be found."}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    client
        .delete_resource_group(&CallContext::background(), "gone")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_power_state_of_stopped_vm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/providers/Microsoft.Compute/virtualMachines/agent-0", RG)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "agent-0",
            "properties": {"instanceView": {"statuses": [
                {"code": "ProvisioningState/succeeded"},
                {"code": "PowerState/deallocated"}
            ]}}
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let state = client
        .get_virtual_machine_power_state(&CallContext::background(), "rg", "agent-0")
        .await
        .unwrap();
    assert_eq!(state, "deallocated");
}
