use crate::config::Config;
use crate::feed::{FeedDescriptor, FeedFetcher, FeedRegistry, FetchError, HttpFetcher, RegistryError};
use crate::loader::{FeedLoader, LoadHandle, LoadReport};
use crate::state::{MenuController, MenuState, RenderState, RenderTarget};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid feed registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] FetchError),
}

/// One reader session.
///
/// Owns the feed registry, the current render, the menu state and the loader
/// that ties them together. Created at startup, torn down with
/// [`App::shutdown`] (or on drop), which aborts loads still in flight.
pub struct App<F: FeedFetcher> {
    registry: Arc<RwLock<FeedRegistry>>,
    render: RenderTarget,
    menu: MenuController,
    loader: FeedLoader<F>,
}

impl App<HttpFetcher> {
    /// Builds a session that fetches over HTTP.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::new(config, fetcher)?)
    }
}

impl<F: FeedFetcher> App<F> {
    /// Builds a session around any fetcher.
    ///
    /// The registry is validated up front so a bad feed list is reported at
    /// startup instead of on first load.
    pub fn new(config: &Config, fetcher: F) -> Result<Self, RegistryError> {
        let registry = config.registry();
        registry.validate()?;
        tracing::debug!(feeds = registry.len(), "Feed registry ready");

        let registry = Arc::new(RwLock::new(registry));
        let render = RenderTarget::new();
        let menu = MenuController::new();
        let loader = FeedLoader::new(fetcher, Arc::clone(&registry), render.clone(), menu.clone())
            .with_policy(config.load.stale_policy)
            .with_timeout(config.load.timeout());

        Ok(Self {
            registry,
            render,
            menu,
            loader,
        })
    }

    pub fn load(&self, index: usize) -> LoadHandle {
        self.loader.load(index)
    }

    pub fn load_then<C>(&self, index: usize, on_complete: C) -> u64
    where
        C: FnOnce(LoadReport) + Send + 'static,
    {
        self.loader.load_then(index, on_complete)
    }

    pub fn toggle_menu(&self) -> MenuState {
        self.menu.toggle()
    }

    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    pub fn render(&self) -> &RenderTarget {
        &self.render
    }

    pub fn snapshot(&self) -> Arc<RenderState> {
        self.render.snapshot()
    }

    pub fn loader(&self) -> &FeedLoader<F> {
        &self.loader
    }

    /// Copy of the current registry contents.
    pub fn feeds(&self) -> Vec<FeedDescriptor> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn feed_count(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Appends a feed and returns its index.
    pub fn append_feed(&self, descriptor: FeedDescriptor) -> usize {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.append(descriptor);
        registry.len() - 1
    }

    pub fn remove_last_feed(&self) -> Option<FeedDescriptor> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_last()
    }

    /// Ends the session, aborting unsettled loads.
    pub fn shutdown(self) {
        tracing::debug!(in_flight = self.loader.in_flight(), "Shutting down reader session");
        // Drop does the work
    }
}

impl<F: FeedFetcher> Drop for App<F> {
    fn drop(&mut self) {
        self.loader.abort_all();
    }
}
