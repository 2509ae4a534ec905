// View Scope - Ties outstanding fetches to the lifetime of the view that issued them
// Cancelling the scope (or dropping it) makes every token report cancellation

use std::future::Future;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Owned by a view; cancelled on teardown
#[derive(Debug)]
pub struct ViewScope {
    sender: watch::Sender<bool>,
}

/// Handed to work started on behalf of a view
#[derive(Debug, Clone)]
pub struct ScopeToken {
    receiver: watch::Receiver<bool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl ScopeToken {
    /// True once the scope was cancelled or dropped
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    /// Resolves when the scope is cancelled or dropped
    pub async fn cancelled(&mut self) {
        loop {
            if *self.receiver.borrow_and_update() {
                return;
            }
            if self.receiver.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run `work` unless the scope goes away first
    pub async fn run<F>(mut self, work: F) -> AppResult<F::Output>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(AppError::Cancelled("view scope already closed".to_string()));
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => {
                debug!("Discarding work for a closed view scope");
                Err(AppError::Cancelled("view scope closed".to_string()))
            }
            output = work => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_completes_while_scope_alive() {
        let scope = ViewScope::new();
        let out = scope.token().run(async { 7 }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_work() {
        let scope = ViewScope::new();
        let token = scope.token();
        let handle = tokio::spawn(token.run(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }));
        tokio::time::sleep(Duration::from_millis(10)).await;
        scope.cancel();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AppError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_dropping_scope_cancels_tokens() {
        let scope = ViewScope::new();
        let token = scope.token();
        drop(scope);
        assert!(token.is_cancelled());
        assert!(token.run(async { 1 }).await.is_err());
    }
}
