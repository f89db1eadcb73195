//! Deadline and cancellation carried by every facade call

use crate::error::{ArmError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call deadline and cancellation token
///
/// Expiry abandons the in-flight request or poll loop and surfaces as
/// [`ArmError::OperationTimeout`]. The remote operation is not cancelled
/// server-side.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// Context without a deadline
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Same cancellation, with a deadline no later than `timeout` from now
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.remaining() == Some(Duration::ZERO)
    }

    /// Run `fut` until it completes, the deadline passes or the token fires
    pub async fn run<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            res = fut => res,
            _ = deadline => Err(ArmError::OperationTimeout(format!("{} exceeded its deadline", what))),
            _ = self.cancel.cancelled() => Err(ArmError::OperationTimeout(format!("{} was cancelled", what))),
        }
    }

    /// Suspend for `duration`, failing early on deadline or cancellation
    pub async fn sleep(&self, what: &str, duration: Duration) -> Result<()> {
        self.run(what, async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let res: Result<()> = ctx
            .run("slow call", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;
        let err = res.unwrap_err();
        assert!(matches!(err, ArmError::OperationTimeout(_)));
        assert!(err.to_string().contains("slow call"));
    }

    #[tokio::test]
    async fn test_run_cancelled() {
        let token = CancellationToken::new();
        let ctx = CallContext::background().with_cancellation(token.clone());
        token.cancel();
        let res: Result<()> = ctx.run("poll", std::future::pending()).await;
        assert!(res.unwrap_err().to_string().contains("cancelled"));
        assert!(ctx.is_done());
    }

    #[tokio::test]
    async fn test_run_completes() {
        let ctx = CallContext::background();
        let res = ctx.run("quick", async { Ok(7) }).await.unwrap();
        assert_eq!(res, 7);
        assert!(ctx.remaining().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_keeps_earlier_deadline() {
        let parent = CallContext::with_timeout(Duration::from_secs(10));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let child = parent.child_with_timeout(Duration::from_secs(1));
        assert!(child.deadline() < parent.deadline());
    }
}
