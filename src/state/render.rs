use crate::feed::FeedEntry;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// The feed currently on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Header text: the registry name of the feed.
    pub title: String,
    /// The feed's own title, when it declares one.
    pub channel_title: Option<String>,
    pub source_url: String,
    pub entries: Vec<FeedEntry>,
}

impl RenderState {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared handle to the last successfully rendered feed.
///
/// Replacement swaps the whole [`RenderState`] at once, so a reader holding a
/// snapshot never observes a title from one feed next to entries of another.
#[derive(Debug, Clone, Default)]
pub struct RenderTarget {
    current: Arc<ArcSwap<RenderState>>,
}

impl RenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<RenderState> {
        self.current.load_full()
    }

    pub fn title(&self) -> String {
        self.current.load().title.clone()
    }

    pub fn entry_count(&self) -> usize {
        self.current.load().entries.len()
    }

    /// Installs a new render, returning the one it displaced.
    pub(crate) fn replace(&self, state: RenderState) -> Arc<RenderState> {
        self.current.swap(Arc::new(state))
    }
}
