//! Async wrapper around [`Stockbook`] for use in Tokio runtimes.
//!
//! Every operation runs on the blocking thread pool via
//! [`tokio::task::spawn_blocking`]. Provider calls are blocking HTTP, so
//! [`AsyncStockbook::run_with_timeout`] lets callers bound how long they
//! wait for one.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use stockbook::{AsyncStockbook, ChartMode, ChartRange};
//!
//! #[tokio::main]
//! async fn main() {
//!     let book = AsyncStockbook::builder().build().await.unwrap();
//!
//!     let page = book.run(|b| b.transactions().list(1, 20)).await.unwrap();
//!
//!     let chart = book
//!         .run_with_timeout(Duration::from_secs(10), |b| {
//!             b.charts().chart("AAPL", ChartRange::Max, ChartMode::Adjusted)
//!         })
//!         .await
//!         .unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config;
use crate::error::{Result, StockbookError};
use crate::provider::PriceProvider;
use crate::Stockbook;

// ---------------------------------------------------------------------------
// AsyncStockbookBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`AsyncStockbook`]. Mirrors [`StockbookBuilder`](crate::StockbookBuilder).
pub struct AsyncStockbookBuilder {
    database_path: Option<PathBuf>,
    in_memory: bool,
    offline: bool,
    timeout: Duration,
    provider: Option<Box<dyn PriceProvider + Send>>,
}

impl Default for AsyncStockbookBuilder {
    fn default() -> Self {
        Self {
            database_path: None,
            in_memory: false,
            offline: false,
            timeout: config::DEFAULT_TIMEOUT,
            provider: None,
        }
    }
}

impl AsyncStockbookBuilder {
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for the default provider.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(mut self, provider: Box<dyn PriceProvider + Send>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build on the blocking pool; opening the store touches the filesystem.
    pub async fn build(self) -> Result<AsyncStockbook> {
        tokio::task::spawn_blocking(move || {
            let mut builder = Stockbook::builder()
                .in_memory(self.in_memory)
                .offline(self.offline)
                .timeout(self.timeout);
            if let Some(path) = self.database_path {
                builder = builder.database_path(path);
            }
            if let Some(provider) = self.provider {
                builder = builder.provider(provider);
            }
            let book = builder.build()?;
            Ok(AsyncStockbook {
                inner: Arc::new(Mutex::new(book)),
            })
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncStockbook
// ---------------------------------------------------------------------------

/// Async handle to a [`Stockbook`] guarded by a [`Mutex`].
///
/// Clones share the same store and caches.
#[derive(Clone)]
pub struct AsyncStockbook {
    inner: Arc<Mutex<Stockbook>>,
}

impl AsyncStockbook {
    pub fn builder() -> AsyncStockbookBuilder {
        AsyncStockbookBuilder::default()
    }

    /// Run a sync operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Stockbook) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let book = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = book
                .lock()
                .map_err(|_| StockbookError::InvalidArgument("Stockbook lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(join_error)?
    }

    /// Like [`run()`](Self::run) but gives up after `limit`.
    ///
    /// The blocking work is not cancelled; it finishes in the background and
    /// its result is discarded.
    pub async fn run_with_timeout<F, T>(&self, limit: Duration, f: F) -> Result<T>
    where
        F: FnOnce(&Stockbook) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(limit, self.run(f)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("Operation timed out after {:?}", limit);
                Err(StockbookError::Timeout(limit))
            }
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> StockbookError {
    StockbookError::InvalidArgument(format!("Task join error: {e}"))
}
