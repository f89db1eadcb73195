//! Long-running operations over `Azure-AsyncOperation` and `Location`

use crate::client::{ArmRestClient, RawResponse, decode, error_from_body, retry_after};
use armhelpers::models::ErrorDetail;
use armhelpers::{ArmError, PollStatus, Poller, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use url::Url;

const AZURE_ASYNC_OPERATION: &str = "Azure-AsyncOperation";

/// Where the result of a finished operation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalState {
    /// `GET` the resource that was created or updated
    OriginalUri,
    /// The body behind the `Location` header
    Location,
    /// The operation has no result
    None,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

enum State {
    /// Result already known
    Ready(Vec<u8>),
    /// Poll the operation-status resource
    AsyncOperation { status_url: Url, location: Option<Url> },
    /// Poll the `Location` URL until it stops answering 202
    Location { url: Url },
    Finished,
}

/// Poller for one Resource Manager operation
pub struct ArmPoller<T> {
    client: ArmRestClient,
    resource_url: Url,
    final_state: FinalState,
    state: State,
    _result: PhantomData<fn() -> T>,
}

fn header_url(headers: &HeaderMap, name: impl reqwest::header::AsHeaderName) -> Result<Option<Url>> {
    match headers.get(name).and_then(|v| v.to_str().ok()) {
        Some(value) => Url::parse(value)
            .map(Some)
            .map_err(|e| ArmError::Transport(format!("invalid polling URL {:?}: {}", value, e))),
        None => Ok(None),
    }
}

/// Result of an operation that answered with no body
///
/// `()` and `Option` take `null`; models with all-optional fields come out
/// empty.
fn empty_result<T: DeserializeOwned>() -> Result<T> {
    serde_json::from_value(serde_json::Value::Null)
        .or_else(|_| serde_json::from_value(serde_json::json!({})))
        .map_err(ArmError::from)
}

/// Decode a final body, treating an empty one as [`empty_result`]
fn decode_final<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return empty_result();
    }
    decode(body)
}

fn is_terminal(status: &str) -> bool {
    matches!(
        status.to_ascii_lowercase().as_str(),
        "succeeded" | "failed" | "canceled" | "cancelled"
    )
}

impl<T: DeserializeOwned + Send + 'static> ArmPoller<T> {
    /// Poller for the operation started by the request to `resource_url`
    /// that produced `initial`
    pub(crate) fn start(
        client: ArmRestClient,
        resource_url: Url,
        initial: RawResponse,
        final_state: FinalState,
    ) -> Result<Self> {
        let async_operation = header_url(&initial.headers, AZURE_ASYNC_OPERATION)?;
        let location = header_url(&initial.headers, LOCATION)?;

        let state = match (async_operation, location) {
            (Some(status_url), location) => State::AsyncOperation {
                status_url,
                location,
            },
            (None, Some(url)) if initial.status == StatusCode::ACCEPTED => State::Location { url },
            _ => State::Ready(initial.body),
        };

        Ok(Self {
            client,
            resource_url,
            final_state,
            state,
            _result: PhantomData,
        })
    }

    fn finish(&self, body: &[u8]) -> Result<T> {
        match self.final_state {
            FinalState::None => empty_result(),
            _ => decode_final(body),
        }
    }

    async fn fetch_result(&self, location: Option<Url>) -> Result<T> {
        match self.final_state {
            FinalState::None => empty_result(),
            FinalState::OriginalUri => self.client.get_json(self.resource_url.clone()).await,
            FinalState::Location => match location {
                Some(url) => self.client.get_json(url).await,
                None => empty_result(),
            },
        }
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> Poller<T> for ArmPoller<T> {
    async fn poll(&mut self) -> Result<PollStatus<T>> {
        match std::mem::replace(&mut self.state, State::Finished) {
            State::Ready(body) => Ok(PollStatus::Done(self.finish(&body)?)),

            State::AsyncOperation {
                status_url,
                location,
            } => {
                let raw = self
                    .client
                    .send(Method::GET, status_url.clone(), None)
                    .await?
                    .into_result()?;
                let op: OperationStatus = decode(&raw.body)?;

                if !is_terminal(&op.status) {
                    let wait = retry_after(&raw.headers);
                    self.state = State::AsyncOperation {
                        status_url,
                        location,
                    };
                    return Ok(PollStatus::InProgress { retry_after: wait });
                }

                if op.status.eq_ignore_ascii_case("succeeded") {
                    return Ok(PollStatus::Done(self.fetch_result(location).await?));
                }

                let detail = op.error.unwrap_or_default();
                let code = if detail.code.is_empty() {
                    op.status.clone()
                } else {
                    detail.code.clone()
                };
                let message = if detail.message.is_empty() {
                    format!("operation finished with status {}", op.status)
                } else {
                    detail.full_message()
                };
                Err(ArmError::provider(code, message))
            }

            State::Location { url } => {
                let raw = self.client.send(Method::GET, url.clone(), None).await?;
                match raw.status {
                    StatusCode::ACCEPTED => {
                        let next = header_url(&raw.headers, LOCATION)?.unwrap_or(url);
                        self.state = State::Location { url: next };
                        Ok(PollStatus::InProgress {
                            retry_after: retry_after(&raw.headers),
                        })
                    }
                    s if s.is_success() => Ok(PollStatus::Done(self.finish(&raw.body)?)),
                    s => Err(error_from_body(s, &raw.body)),
                }
            }

            State::Finished => Err(ArmError::Transport(
                "operation result already consumed".to_string(),
            )),
        }
    }
}
