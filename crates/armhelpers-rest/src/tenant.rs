//! Tenant discovery from a subscription id

use crate::environment::CloudEnvironment;
use armhelpers::{ArmError, Result};
use reqwest::StatusCode;
use reqwest::header::WWW_AUTHENTICATE;

const SUBSCRIPTIONS_API_VERSION: &str = "2016-06-01";

/// Resolve the tenant that owns `subscription_id`
///
/// Sends an unauthenticated request for the subscription and reads the
/// tenant from the `authorization_uri` of the bearer challenge.
pub async fn get_tenant_id(
    http: &reqwest::Client,
    environment: &CloudEnvironment,
    subscription_id: &str,
) -> Result<String> {
    tracing::debug!("Resolving tenant ID for SubscriptionID: {}", subscription_id);

    let url = format!(
        "{}subscriptions/{}?api-version={}",
        environment.resource_manager_endpoint, subscription_id, SUBSCRIPTIONS_API_VERSION
    );
    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| ArmError::Transport(format!("requesting subscription {}: {}", subscription_id, e)))?;

    if response.status() != StatusCode::UNAUTHORIZED {
        return Err(ArmError::Configuration(format!(
            "unexpected response resolving tenant of subscription {}: HTTP {}",
            subscription_id,
            response.status().as_u16()
        )));
    }

    let challenge = response
        .headers()
        .get(WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ArmError::Configuration(format!(
                "no WWW-Authenticate challenge resolving tenant of subscription {}",
                subscription_id
            ))
        })?;

    let tenant_id = tenant_from_challenge(challenge)?;
    tracing::debug!("Resolved TenantID: {}", tenant_id);
    Ok(tenant_id)
}

/// Extract the tenant from a bearer challenge such as
/// `Bearer authorization_uri="https://login.windows.net/<tenant>", error="invalid_token"`
pub fn tenant_from_challenge(challenge: &str) -> Result<String> {
    let malformed = || {
        ArmError::Configuration(format!(
            "could not find a tenant in WWW-Authenticate challenge {:?}",
            challenge
        ))
    };

    let uri = challenge
        .trim_start_matches("Bearer")
        .split(',')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim() == "authorization_uri")
        .map(|(_, value)| value.trim().trim_matches('"'))
        .ok_or_else(malformed)?;

    let parsed = url::Url::parse(uri).map_err(|_| malformed())?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.rev().find(|s| !s.is_empty()))
        .map(str::to_string)
        .ok_or_else(malformed)
}
