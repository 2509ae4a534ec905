// View-Model Store - Per-page state holding projected records
//
// Each refresh is stamped with a generation; results from a superseded refresh
// or from a torn-down page are discarded instead of overwriting newer state.

use std::future::Future;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::scope::{ScopeToken, ViewScope};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Handle for one in-flight refresh
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    generation: u64,
    token: ScopeToken,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> ScopeToken {
        self.token.clone()
    }

    /// Run `load` under the owning page's scope without borrowing the store
    ///
    /// Returns `Cancelled` if the page is torn down before `load` finishes.
    pub async fn load<T, F>(&self, load: F) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<Vec<T>>>,
    {
        self.token().run(load).await.and_then(|inner| inner)
    }
}

/// Owned by exactly one page; never shared
#[derive(Debug)]
pub struct ViewModelStore<T> {
    records: Vec<T>,
    status: LoadStatus,
    generation: u64,
    scope: ViewScope,
}

impl<T> Default for ViewModelStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewModelStore<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            status: LoadStatus::Idle,
            generation: 0,
            scope: ViewScope::new(),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn is_torn_down(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Start a refresh; any earlier outstanding refresh becomes stale
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        RefreshTicket {
            generation: self.generation,
            token: self.scope.token(),
        }
    }

    /// Apply a refresh result; returns whether it was accepted
    ///
    /// Failures keep the previous records in place.
    pub fn apply(&mut self, ticket: &RefreshTicket, result: AppResult<Vec<T>>) -> bool {
        if ticket.token.is_cancelled() {
            debug!("Discarding refresh {} for a torn-down view", ticket.generation);
            return false;
        }
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale refresh {} (current {})",
                ticket.generation, self.generation
            );
            return false;
        }

        match result {
            Ok(records) => {
                debug!("Refresh {} produced {} records", ticket.generation, records.len());
                self.records = records;
                self.status = LoadStatus::Ready;
            }
            Err(AppError::Cancelled(_)) => {
                self.status = LoadStatus::Idle;
            }
            Err(err) => {
                warn!("Refresh {} failed: {}", ticket.generation, err);
                self.status = LoadStatus::Failed(err.to_string());
            }
        }
        true
    }

    /// Run one refresh and apply its result
    ///
    /// The store stays borrowed until the load finishes. Pages that must be able
    /// to tear down mid-load use `begin_refresh`, `RefreshTicket::load` and `apply`.
    pub async fn refresh<F>(&mut self, load: F) -> bool
    where
        F: Future<Output = AppResult<Vec<T>>>,
    {
        let ticket = self.begin_refresh();
        let result = ticket.load(load).await;
        self.apply(&ticket, result)
    }

    /// Cancel outstanding work; later results are discarded
    pub fn teardown(&mut self) {
        self.scope.cancel();
        if self.status == LoadStatus::Loading {
            self.status = LoadStatus::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_refresh_is_discarded() {
        let mut store: ViewModelStore<u32> = ViewModelStore::new();
        let first = store.begin_refresh();
        let second = store.begin_refresh();

        assert!(store.apply(&second, Ok(vec![2])));
        assert!(!store.apply(&first, Ok(vec![1])));
        assert_eq!(store.records(), &[2]);
        assert_eq!(store.status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_failure_keeps_previous_records() {
        let mut store: ViewModelStore<u32> = ViewModelStore::new();
        let t1 = store.begin_refresh();
        store.apply(&t1, Ok(vec![1, 2]));

        let t2 = store.begin_refresh();
        assert!(store.apply(&t2, Err(AppError::Network("down".into()))));
        assert_eq!(store.records(), &[1, 2]);
        assert!(matches!(store.status(), LoadStatus::Failed(_)));
    }

    #[test]
    fn test_results_after_teardown_are_discarded() {
        let mut store: ViewModelStore<u32> = ViewModelStore::new();
        let ticket = store.begin_refresh();
        store.teardown();
        assert!(store.is_torn_down());
        assert!(!store.apply(&ticket, Ok(vec![9])));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_interrupts_in_flight_load() {
        use std::time::Duration;

        let mut store: ViewModelStore<u32> = ViewModelStore::new();
        let ticket = store.begin_refresh();
        let loading = ticket.clone();
        let pending = tokio::spawn(async move {
            loading
                .load(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(vec![1])
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        store.teardown();
        let result = pending.await.unwrap();
        assert!(matches!(result, Err(AppError::Cancelled(_))));
        assert!(!store.apply(&ticket, result));
        assert_eq!(store.status(), &LoadStatus::Idle);
    }

    #[tokio::test]
    async fn test_refresh_applies_loaded_records() {
        let mut store: ViewModelStore<&str> = ViewModelStore::new();
        assert!(store.refresh(async { Ok(vec!["a", "b"]) }).await);
        assert_eq!(store.records(), &["a", "b"]);
        assert!(!store.is_loading());
    }
}
