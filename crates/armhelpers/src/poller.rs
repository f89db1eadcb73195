//! Long-running operation polling
//!
//! A mutating call returns a [`Poller`]; [`poll_until_done`] drives it to a
//! terminal state, suspending the calling task between status queries.

use crate::context::CallContext;
use crate::error::{ArmError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Poll interval used when the service does not recommend one
pub const DEFAULT_POLL_FREQUENCY: Duration = Duration::from_secs(30);

/// Outcome of a single status query
#[derive(Debug)]
pub enum PollStatus<T> {
    /// Still running; `retry_after` is the service's recommended wait
    InProgress { retry_after: Option<Duration> },
    /// Terminal success
    Done(T),
}

/// Handle to an asynchronous operation on the service
///
/// A terminal failure is reported as `Err`, typically
/// [`ArmError::ProviderOperation`].
#[async_trait]
pub trait Poller<T: Send>: Send {
    /// Query the operation status once
    async fn poll(&mut self) -> Result<PollStatus<T>>;
}

pub type BoxPoller<T> = Box<dyn Poller<T>>;

/// Poller for an operation the service completed synchronously
pub struct Completed<T> {
    value: Option<T>,
}

impl<T> Completed<T> {
    pub fn new(value: T) -> Self {
        Self { value: Some(value) }
    }
}

impl<T: Send + 'static> Completed<T> {
    pub fn boxed(value: T) -> BoxPoller<T> {
        Box::new(Self::new(value))
    }
}

#[async_trait]
impl<T: Send> Poller<T> for Completed<T> {
    async fn poll(&mut self) -> Result<PollStatus<T>> {
        self.value
            .take()
            .map(PollStatus::Done)
            .ok_or_else(|| ArmError::Transport("operation result already consumed".to_string()))
    }
}

/// Poll until the operation succeeds, fails, or `ctx` expires
pub async fn poll_until_done<T: Send>(
    ctx: &CallContext,
    what: &str,
    mut poller: BoxPoller<T>,
    frequency: Duration,
) -> Result<T> {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        match ctx.run(what, poller.poll()).await? {
            PollStatus::Done(value) => {
                tracing::debug!("{} finished after {} status queries", what, attempts);
                return Ok(value);
            }
            PollStatus::InProgress { retry_after } => {
                let wait = retry_after.unwrap_or(frequency);
                tracing::debug!("{} in progress, next status query in {:?}", what, wait);
                ctx.sleep(what, wait).await?;
            }
        }
    }
}
