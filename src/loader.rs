//! Asynchronous feed loading.
//!
//! [`FeedLoader::load`] hides the menu, resolves the registry entry at call
//! time and spawns the fetch. The returned [`LoadHandle`] settles exactly once
//! with a [`LoadReport`]; a successful fetch replaces the shared
//! [`RenderTarget`] wholesale, any failure leaves it untouched.
//!
//! # Example
//!
//! ```ignore
//! let report = loader.load(0).await;
//! if report.is_rendered() {
//!     println!("{}", render.title());
//! }
//!
//! loader.load_then(1, |report| tracing::info!(ok = report.result.is_ok(), "settled"));
//! ```

use crate::feed::{FeedDescriptor, FeedFetcher, FeedRegistry, FetchError, RegistryError};
use crate::state::{MenuController, RenderState, RenderTarget};
use crate::util::catch_task_panic;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

/// Which result wins when loads overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Whatever fetch settles last is rendered, regardless of call order.
    #[default]
    CompletionOrder,
    /// A success is only rendered if no newer load has been started since.
    LatestRequest,
}

/// Why a load did not render.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Load timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Load task panicked: {0}")]
    Panicked(String),
    /// The load task was cancelled before it could settle (session shutdown).
    #[error("Load was aborted")]
    Aborted,
}

/// Successful settlement of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The feed was fetched and is now on display.
    Rendered { entries: usize },
    /// The feed was fetched but a newer load had started
    /// (only under [`StalePolicy::LatestRequest`]).
    Superseded,
}

/// Outcome of one `load` call.
#[derive(Debug)]
pub struct LoadReport {
    /// Registry index that was requested
    pub index: usize,
    /// Loader generation stamped when the load started
    pub generation: u64,
    pub result: Result<Settlement, LoadError>,
}

impl LoadReport {
    pub fn is_rendered(&self) -> bool {
        matches!(self.result, Ok(Settlement::Rendered { .. }))
    }
}

/// Completion signal for a single load.
///
/// Resolves once with the [`LoadReport`]. Dropping the handle does not cancel
/// the load; the render is still updated when the fetch settles.
#[derive(Debug)]
pub struct LoadHandle {
    index: usize,
    generation: u64,
    rx: oneshot::Receiver<LoadReport>,
}

impl LoadHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Future for LoadHandle {
    type Output = LoadReport;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let index = self.index;
        let generation = self.generation;
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or(LoadReport {
                index,
                generation,
                result: Err(LoadError::Aborted),
            })
        })
    }
}

struct Inner<F> {
    fetcher: F,
    registry: Arc<RwLock<FeedRegistry>>,
    render: RenderTarget,
    menu: MenuController,
    policy: StalePolicy,
    timeout: Option<Duration>,
    generation: AtomicU64,
    tasks: Mutex<Vec<AbortHandle>>,
}

/// Loads feeds by registry index into a shared [`RenderTarget`].
///
/// Cloning yields another handle to the same loader (same generation
/// counter, same in-flight task set).
pub struct FeedLoader<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for FeedLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: FeedFetcher> FeedLoader<F> {
    pub fn new(
        fetcher: F,
        registry: Arc<RwLock<FeedRegistry>>,
        render: RenderTarget,
        menu: MenuController,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                registry,
                render,
                menu,
                policy: StalePolicy::default(),
                timeout: None,
                generation: AtomicU64::new(0),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Sets the overlap policy. Must be called before the loader is cloned.
    pub fn with_policy(mut self, policy: StalePolicy) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.policy = policy;
        }
        self
    }

    /// Bounds each load (fetch included). Must be called before the loader is
    /// cloned.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.timeout = timeout;
        }
        self
    }

    pub fn policy(&self) -> StalePolicy {
        self.inner.policy
    }

    /// Generation of the most recently started load (0 before any load).
    pub fn latest_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Starts loading the feed at `index`.
    ///
    /// The menu is hidden before this returns. Registry errors are not
    /// returned here: they settle the handle like any other failure, and the
    /// handle never settles before the caller gets it back.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn load(&self, index: usize) -> LoadHandle {
        self.inner.menu.force_hidden();

        let generation = self
            .inner
            .generation
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1);

        let descriptor = self
            .inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index);

        tracing::debug!(index, generation, "Starting feed load");

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = match catch_task_panic(settle(&inner, generation, descriptor)).await {
                Ok(result) => result,
                Err(panic_msg) => {
                    tracing::error!(task = "feed_load", index, generation, error = %panic_msg, "Background task panicked");
                    Err(LoadError::Panicked(panic_msg))
                }
            };

            match &result {
                Ok(Settlement::Rendered { entries }) => {
                    tracing::info!(index, generation, entries, "Feed rendered");
                }
                Ok(Settlement::Superseded) => {
                    tracing::debug!(index, generation, "Feed loaded but superseded by a newer load");
                }
                Err(e) => {
                    tracing::warn!(index, generation, error = %e, "Feed load failed, keeping previous render");
                }
            }

            if tx
                .send(LoadReport {
                    index,
                    generation,
                    result,
                })
                .is_err()
            {
                tracing::trace!(index, generation, "Load handle dropped before settlement");
            }
        });

        let mut tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|t| !t.is_finished());
        tasks.push(task.abort_handle());

        LoadHandle {
            index,
            generation,
            rx,
        }
    }

    /// Callback form of [`load`](Self::load).
    ///
    /// `on_complete` runs exactly once, on a spawned task, after the load
    /// settles.
    pub fn load_then<C>(&self, index: usize, on_complete: C) -> u64
    where
        C: FnOnce(LoadReport) + Send + 'static,
    {
        let handle = self.load(index);
        let generation = handle.generation();
        tokio::spawn(async move {
            on_complete(handle.await);
        });
        generation
    }

    /// Number of loads that have not settled yet.
    pub fn in_flight(&self) -> usize {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| !t.is_finished())
            .count()
    }

    /// Aborts every unsettled load. Their handles resolve with
    /// [`LoadError::Aborted`] and the render is left as it is.
    pub fn abort_all(&self) {
        let tasks = std::mem::take(
            &mut *self
                .inner
                .tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let pending = tasks.iter().filter(|t| !t.is_finished()).count();
        for task in tasks {
            task.abort();
        }
        if pending > 0 {
            tracing::debug!(pending, "Aborted in-flight feed loads");
        }
    }
}

async fn settle<F: FeedFetcher>(
    inner: &Inner<F>,
    generation: u64,
    descriptor: Result<FeedDescriptor, RegistryError>,
) -> Result<Settlement, LoadError> {
    let descriptor = descriptor?;

    let fetch = inner.fetcher.fetch(&descriptor.url);
    let feed = match inner.timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .map_err(|_| LoadError::TimedOut(limit))??,
        None => fetch.await?,
    };

    if inner.policy == StalePolicy::LatestRequest
        && inner.generation.load(Ordering::Acquire) != generation
    {
        return Ok(Settlement::Superseded);
    }

    let entries = feed.entries.len();
    inner.render.replace(RenderState {
        title: descriptor.name,
        channel_title: feed.title,
        source_url: descriptor.url,
        entries: feed.entries,
    });

    Ok(Settlement::Rendered { entries })
}
