//! Cancellation and deadline propagation for in-flight calls.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tollbooth_error::{CancelledError, CancelledErrorKind};
use tracing::trace;

/// Carries a cancellation signal and an optional deadline through a call.
///
/// Every suspension point in the pipeline (permit waits, network round trips,
/// backoff sleeps) races against the context and returns promptly once it is
/// cancelled or its deadline passes.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tollbooth_core::CallContext;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ctx = CallContext::new();
/// ctx.cancel();
/// assert!(ctx.sleep(Duration::from_secs(10)).await.is_err());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Context with no deadline that is cancelled only through [`CallContext::cancel`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing cancellation token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set a deadline relative to now.
    ///
    /// A timeout too large to represent as an instant sets no deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Set an absolute deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Child context cancelled together with this one but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context is already cancelled or past its deadline.
    #[track_caller]
    pub fn check(&self) -> Result<(), CancelledError> {
        if self.token.is_cancelled() {
            return Err(CancelledError::new(CancelledErrorKind::Cancelled));
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(CancelledError::new(CancelledErrorKind::DeadlineExceeded));
        }
        Ok(())
    }

    /// Sleep for `duration` unless the context ends first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), CancelledError> {
        self.check()?;
        if duration.is_zero() {
            return Ok(());
        }
        trace!(?duration, "Sleeping under call context");
        self.run(tokio::time::sleep(duration)).await
    }

    /// Drive `future` to completion unless the context ends first.
    ///
    /// The future is dropped when cancellation wins the race.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, CancelledError>
    where
        F: Future,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                Err(CancelledError::new(CancelledErrorKind::Cancelled))
            }
            _ = deadline => {
                Err(CancelledError::new(CancelledErrorKind::DeadlineExceeded))
            }
            output = future => Ok(output),
        }
    }
}
