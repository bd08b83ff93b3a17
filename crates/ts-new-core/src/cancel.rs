//! Cancellation-aware futures
//!
//! The binary cancels a shared [`CancellationToken`] from its Ctrl+C handler;
//! every suspension point in a run races against that token.

use crate::error::{Cancellation, Error, Result};
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Extension trait for making fallible futures cancellable.
#[async_trait]
pub trait OrCancelExt: Sized {
    type Output;

    /// Race this future against the token.
    ///
    /// Resolves to the future's own result if it completes first, or to
    /// `Error::Cancelled(Interrupted)` once the token is cancelled. The losing
    /// future is dropped, which kills any child process it owns.
    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output>;
}

#[async_trait]
impl<F, T> OrCancelExt for F
where
    F: Future<Output = Result<T>> + Send,
    T: Send,
{
    type Output = T;

    async fn or_cancel(self, token: &CancellationToken) -> Result<T> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled(Cancellation::Interrupted)),
            res = self => res,
        }
    }
}

/// Fail fast if the token has already fired
pub fn check(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(Error::Cancelled(Cancellation::Interrupted))
    } else {
        Ok(())
    }
}
