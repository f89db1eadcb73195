//! Token credentials
//!
//! Every credential hands out bearer tokens for a scope and caches them
//! until shortly before they expire.

use crate::certificate::ClientCertificate;
use crate::environment::CloudEnvironment;
use armhelpers::{ArmError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime of a client assertion
const ASSERTION_LIFETIME_SECS: i64 = 600;

const JWT_BEARER_ASSERTION: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_on - Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// Source of bearer tokens
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// Bearer token supplied by the caller
///
/// The token is used as is and never refreshed.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: DateTime::<Utc>::MAX_UTC,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims {
    aud: String,
    iss: String,
    sub: String,
    jti: String,
    nbf: i64,
    iat: i64,
    exp: i64,
}

enum Secret {
    Password(String),
    Certificate(ClientCertificate),
}

/// Service principal credential for the `client_credentials` grant
///
/// Authenticates with either a client secret or a signed client assertion.
pub struct ServicePrincipalCredential {
    http: reqwest::Client,
    token_endpoint: String,
    client_id: String,
    secret: Secret,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl std::fmt::Debug for ServicePrincipalCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.secret {
            Secret::Password(_) => "client_secret",
            Secret::Certificate(_) => "client_certificate",
        };
        f.debug_struct("ServicePrincipalCredential")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

impl ServicePrincipalCredential {
    pub fn with_client_secret(
        http: reqwest::Client,
        environment: &CloudEnvironment,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let client_secret = client_secret.into();
        if client_secret.is_empty() {
            return Err(ArmError::Configuration(
                "client secret must not be empty".to_string(),
            ));
        }
        Self::new(
            http,
            environment,
            tenant_id,
            client_id.into(),
            Secret::Password(client_secret),
        )
    }

    pub fn with_client_certificate(
        http: reqwest::Client,
        environment: &CloudEnvironment,
        tenant_id: &str,
        client_id: impl Into<String>,
        certificate: ClientCertificate,
    ) -> Result<Self> {
        Self::new(
            http,
            environment,
            tenant_id,
            client_id.into(),
            Secret::Certificate(certificate),
        )
    }

    fn new(
        http: reqwest::Client,
        environment: &CloudEnvironment,
        tenant_id: &str,
        client_id: String,
        secret: Secret,
    ) -> Result<Self> {
        if tenant_id.trim().is_empty() {
            return Err(ArmError::Configuration(
                "tenant id must not be empty".to_string(),
            ));
        }
        if client_id.trim().is_empty() {
            return Err(ArmError::Configuration(
                "client id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            http,
            token_endpoint: environment.token_endpoint(tenant_id),
            client_id,
            secret,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn client_assertion(&self, certificate: &ClientCertificate) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            aud: self.token_endpoint.clone(),
            iss: self.client_id.clone(),
            sub: self.client_id.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            nbf: now,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let header = Header {
            alg: Algorithm::RS256,
            x5t: Some(certificate.thumbprint()),
            ..Default::default()
        };
        jsonwebtoken::encode(&header, &claims, &certificate.encoding_key()?)
            .map_err(|e| ArmError::Certificate(format!("failed to sign client assertion: {}", e)))
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken> {
        let mut form: Vec<(&str, String)> = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.client_id.clone()),
            ("scope", scope.to_string()),
        ];
        match &self.secret {
            Secret::Password(secret) => form.push(("client_secret", secret.clone())),
            Secret::Certificate(cert) => {
                form.push(("client_assertion_type", JWT_BEARER_ASSERTION.to_string()));
                form.push(("client_assertion", self.client_assertion(cert)?));
            }
        }

        tracing::debug!(endpoint = %self.token_endpoint, client_id = %self.client_id, "Requesting access token");
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| ArmError::Transport(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ArmError::Transport(format!("reading token response: {}", e)))?;

        if !status.is_success() {
            let err: TokenErrorResponse = serde_json::from_slice(&body).unwrap_or_default();
            return Err(ArmError::Configuration(format!(
                "acquiring token for client {} failed (HTTP {}): {} {}",
                self.client_id,
                status.as_u16(),
                err.error,
                err.error_description
            )));
        }

        let token: TokenResponse = serde_json::from_slice(&body)?;
        Ok(AccessToken {
            token: token.access_token,
            expires_on: Utc::now() + Duration::seconds(token.expires_in.unwrap_or(3600)),
        })
    }
}

#[async_trait]
impl TokenCredential for ServicePrincipalCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(scope) {
            if !token.is_expired() {
                return Ok(token.clone());
            }
        }
        let token = self.request_token(scope).await?;
        cache.insert(scope.to_string(), token.clone());
        Ok(token)
    }
}
