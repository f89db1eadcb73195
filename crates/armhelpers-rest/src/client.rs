//! HTTP client for the Resource Manager REST API
//!
//! Injects bearer tokens, retries throttled and transient responses, and
//! turns the service's error envelope into [`ArmError`].

use crate::credential::TokenCredential;
use crate::environment::CloudEnvironment;
use crate::lro::{ArmPoller, FinalState};
use crate::pager::NextLinkPager;
use armhelpers::models::ErrorDetail;
use armhelpers::{ArmError, BoxPager, BoxPoller, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Retry policy for transient transport failures
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (starting at 0)
    ///
    /// Anything past `max_delay`, including an overflowing or non-finite
    /// product, is clamped to `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map(|delay| delay.min(self.max_delay))
            .unwrap_or(self.max_delay)
    }
}

/// API versions used per resource provider
#[derive(Debug, Clone)]
pub struct ApiVersions {
    pub resources: String,
    pub compute: String,
    pub disks: String,
    pub network: String,
    pub authorization: String,
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self {
            resources: "2019-10-01".to_string(),
            compute: "2020-06-01".to_string(),
            disks: "2019-07-01".to_string(),
            network: "2018-11-01".to_string(),
            authorization: "2015-07-01".to_string(),
        }
    }
}

/// Status codes worth another attempt
pub fn should_retry(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// `Retry-After` in seconds, if the response carries one
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

/// Map a failed response to an [`ArmError`]
///
/// 404 responses keep the provider's code and message; [`ArmError::kind`]
/// reports them as not-found.
pub(crate) fn error_from_body(status: StatusCode, body: &[u8]) -> ArmError {
    let detail = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error);
    match detail {
        Some(detail) => ArmError::ProviderOperation {
            code: detail.code.clone(),
            message: detail.full_message(),
            status: Some(status.as_u16()),
        },
        None => ArmError::ProviderOperation {
            code: status
                .canonical_reason()
                .unwrap_or("UnexpectedStatus")
                .replace(' ', ""),
            message: format!(
                "HTTP {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(body).trim()
            ),
            status: Some(status.as_u16()),
        },
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(body)?)
}

fn transport(e: reqwest::Error) -> ArmError {
    ArmError::Transport(e.to_string())
}

/// A response whose body has been read
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn into_result(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(error_from_body(self.status, &self.body))
        }
    }
}

struct Inner {
    http: reqwest::Client,
    endpoint: Url,
    subscription_id: String,
    scope: String,
    credential: Arc<dyn TokenCredential>,
    retry: RetryConfig,
    api_versions: ApiVersions,
}

/// Authenticated Resource Manager client bound to one subscription
///
/// Cheap to clone; clones share the connection pool and token cache.
#[derive(Clone)]
pub struct ArmRestClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ArmRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmRestClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("subscription_id", &self.inner.subscription_id)
            .finish_non_exhaustive()
    }
}

impl ArmRestClient {
    pub fn new(
        http: reqwest::Client,
        environment: &CloudEnvironment,
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self> {
        Self::with_options(
            http,
            environment,
            subscription_id,
            credential,
            RetryConfig::default(),
            ApiVersions::default(),
        )
    }

    pub fn with_options(
        http: reqwest::Client,
        environment: &CloudEnvironment,
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
        retry: RetryConfig,
        api_versions: ApiVersions,
    ) -> Result<Self> {
        let subscription_id = subscription_id.into();
        if subscription_id.trim().is_empty() {
            return Err(ArmError::Configuration(
                "subscription id must not be empty".to_string(),
            ));
        }
        let endpoint = Url::parse(&environment.resource_manager_endpoint).map_err(|e| {
            ArmError::Configuration(format!(
                "invalid resource manager endpoint {:?}: {}",
                environment.resource_manager_endpoint, e
            ))
        })?;
        if retry.max_attempts == 0 {
            return Err(ArmError::Configuration(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
            return Err(ArmError::Configuration(format!(
                "retry backoff_multiplier must be a finite number >= 1.0, got {}",
                retry.backoff_multiplier
            )));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                endpoint,
                subscription_id,
                scope: environment.scope(),
                credential,
                retry,
                api_versions,
            }),
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.inner.subscription_id
    }

    pub fn api_versions(&self) -> &ApiVersions {
        &self.inner.api_versions
    }

    /// Absolute URL for `path` (relative to the endpoint) with `api-version`
    pub fn url(&self, path: &str, api_version: &str) -> Result<Url> {
        let mut url = self
            .inner
            .endpoint
            .join(path.trim_start_matches('/'))
            .map_err(|e| ArmError::Configuration(format!("invalid request path {:?}: {}", path, e)))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    /// Path prefix of the bound subscription
    pub fn subscription_path(&self) -> String {
        format!("/subscriptions/{}", self.inner.subscription_id)
    }

    pub fn resource_group_path(&self, resource_group: &str) -> String {
        format!(
            "{}/resourceGroups/{}",
            self.subscription_path(),
            resource_group
        )
    }

    /// Send a request, retrying throttled and transient failures
    ///
    /// Returns the response whatever its final status.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse> {
        let retry = &self.inner.retry;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let token = self.inner.credential.get_token(&self.inner.scope).await?;

            tracing::debug!("{} {}", method, url);
            let mut request = self
                .inner
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&token.token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let outcome = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    let body = response.bytes().await.map_err(transport)?.to_vec();
                    Ok(RawResponse {
                        status,
                        headers,
                        body,
                    })
                }
                Err(e) => Err(e),
            };

            let wait = match &outcome {
                Ok(raw) if should_retry(raw.status) => Some(
                    retry_after(&raw.headers).unwrap_or_else(|| retry.delay_for(attempt - 1)),
                ),
                Err(e) if e.is_connect() || e.is_timeout() => Some(retry.delay_for(attempt - 1)),
                _ => None,
            };
            let wait = match wait {
                Some(wait) if attempt < retry.max_attempts => wait,
                _ => return outcome.map_err(transport),
            };

            match &outcome {
                Ok(raw) => tracing::warn!(
                    "{} {} returned {}, retrying in {:?} (attempt {}/{})",
                    method,
                    url,
                    raw.status.as_u16(),
                    wait,
                    attempt,
                    retry.max_attempts
                ),
                Err(e) => tracing::warn!(
                    "{} {} failed: {}, retrying in {:?} (attempt {}/{})",
                    method,
                    url,
                    e,
                    wait,
                    attempt,
                    retry.max_attempts
                ),
            }
            tokio::time::sleep(wait).await;
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let raw = self.send(Method::GET, url, None).await?.into_result()?;
        decode(&raw.body)
    }

    pub(crate) async fn put_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T> {
        let raw = self.send(Method::PUT, url, Some(body)).await?.into_result()?;
        decode(&raw.body)
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let raw = self.send(Method::POST, url, None).await?.into_result()?;
        decode(&raw.body)
    }

    /// `HEAD` existence check: 204 means present, 404 absent
    pub(crate) async fn head_exists(&self, url: Url) -> Result<bool> {
        let raw = self.send(Method::HEAD, url, None).await?;
        match raw.status {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(error_from_body(s, &raw.body)),
        }
    }

    /// Start a long-running operation and return its poller
    pub(crate) async fn begin<T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
        final_state: FinalState,
    ) -> Result<BoxPoller<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let raw = self
            .send(method, url.clone(), body)
            .await?
            .into_result()?;
        Ok(Box::new(ArmPoller::start(self.clone(), url, raw, final_state)?))
    }

    /// Start a delete; a resource that does not exist completes immediately
    pub(crate) async fn start_delete(&self, url: Url) -> Result<BoxPoller<()>> {
        let raw = self.send(Method::DELETE, url.clone(), None).await?;
        if raw.status == StatusCode::NO_CONTENT || raw.status == StatusCode::NOT_FOUND {
            return Ok(armhelpers::Completed::boxed(()));
        }
        let raw = raw.into_result()?;
        Ok(Box::new(ArmPoller::start(
            self.clone(),
            url,
            raw,
            FinalState::None,
        )?))
    }

    pub(crate) fn pager<T>(&self, url: Result<Url>) -> BoxPager<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Box::new(NextLinkPager::new(self.clone(), url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticTokenCredential;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer, retry: RetryConfig) -> ArmRestClient {
        let env = CloudEnvironment::custom("Test", server.uri(), server.uri(), server.uri());
        ArmRestClient::with_options(
            reqwest::Client::new(),
            &env,
            "sub-1",
            Arc::new(StaticTokenCredential::new("token-1")),
            retry,
            ApiVersions::default(),
        )
        .unwrap()
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn test_delay_for_is_capped() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for(0), Duration::from_secs(1));
        assert_eq!(retry.delay_for(2), Duration::from_secs(4));
        assert_eq!(retry.delay_for(10), Duration::from_secs(30));
    }

    #[test]
    fn test_delay_for_many_retries_does_not_overflow() {
        let retry = RetryConfig {
            max_attempts: 100,
            ..Default::default()
        };
        assert_eq!(retry.delay_for(70), Duration::from_secs(30));
        assert_eq!(retry.delay_for(u32::MAX), Duration::from_secs(30));

        let negative = RetryConfig {
            backoff_multiplier: -2.0,
            ..Default::default()
        };
        assert_eq!(negative.delay_for(1), negative.max_delay);
    }

    #[test]
    fn test_invalid_backoff_multiplier_rejected() {
        let env = CloudEnvironment::custom("Test", "http://localhost", "http://localhost", "http://localhost");
        for multiplier in [0.5, -1.0, f64::NAN, f64::INFINITY] {
            let Err(err) = ArmRestClient::with_options(
                reqwest::Client::new(),
                &env,
                "sub-1",
                Arc::new(StaticTokenCredential::new("token-1")),
                RetryConfig {
                    backoff_multiplier: multiplier,
                    ..Default::default()
                },
                ApiVersions::default(),
            ) else {
                panic!("multiplier {} accepted", multiplier);
            };
            assert_eq!(err.kind(), armhelpers::ErrorKind::Configuration, "{}", multiplier);
        }
    }

    #[test]
    fn test_error_from_envelope() {
        let body = br#"{"error":{"code":"ResourceGroupNotFound","message":"Resource group 'rg' could not be found."}}"#;
        let err = error_from_body(StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "ResourceGroupNotFound: Resource group 'rg' could not be found."
        );
    }

    #[test]
    fn test_error_without_envelope() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.kind(), armhelpers::ErrorKind::ProviderOperation);
        assert!(err.to_string().contains("HTTP 502: upstream down"));
    }

    #[test]
    fn test_decode_empty_body_as_unit() {
        let _unit: () = decode(b"").unwrap();
        let none: Option<u8> = decode(b"  ").unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn test_url_carries_api_version() {
        let server = MockServer::start().await;
        let client = client(&server, RetryConfig::default()).await;
        let url = client
            .url(&client.resource_group_path("rg"), "2019-10-01")
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("{}/subscriptions/sub-1/resourceGroups/rg?api-version=2019-10-01", server.uri())
        );
    }

    #[tokio::test]
    async fn test_send_retries_throttling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub-1"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub-1"))
            .and(header("Authorization", "Bearer token-1"))
            .and(query_param("api-version", "2016-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
            .mount(&server)
            .await;

        let client = client(&server, fast_retry()).await;
        let url = client.url("/subscriptions/sub-1", "2016-06-01").unwrap();
        let value: serde_json::Value = client.get_json(url).await.unwrap();
        assert_eq!(value["id"], "x");
    }

    #[tokio::test]
    async fn test_send_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = client(&server, fast_retry()).await;
        let url = client.url("/subscriptions/sub-1", "2016-06-01").unwrap();
        let err = client
            .get_json::<serde_json::Value>(url)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_business_failure_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "error": {"code": "Conflict", "message": "quota exceeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, fast_retry()).await;
        let url = client.url("/subscriptions/sub-1/resourceGroups/rg", "2019-10-01").unwrap();
        let err = client
            .put_json::<serde_json::Value>(url, &serde_json::json!({"location": "westus"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Conflict: quota exceeded");
    }

    #[tokio::test]
    async fn test_head_exists() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/subscriptions/sub-1/resourceGroups/present"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/subscriptions/sub-1/resourceGroups/absent"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client(&server, RetryConfig::default()).await;
        let present = client.url(&client.resource_group_path("present"), "2019-10-01").unwrap();
        let absent = client.url(&client.resource_group_path("absent"), "2019-10-01").unwrap();
        assert!(client.head_exists(present).await.unwrap());
        assert!(!client.head_exists(absent).await.unwrap());
    }
}
