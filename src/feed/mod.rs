//! Feed sources: the registry of subscriptions and how a feed gets fetched.
//!
//! - [`registry`] - Ordered, mutable list of name + url descriptors
//! - [`fetcher`] - The [`FeedFetcher`] capability and its HTTP implementation
//! - [`parser`] - RSS/Atom/JSON Feed parsing using the `feed-rs` crate
//!
//! # Example
//!
//! ```ignore
//! use feedreader::feed::{FeedFetcher, FeedRegistry, HttpFetcher};
//!
//! let registry = FeedRegistry::default();
//! let fetcher = HttpFetcher::new(&config.fetch)?;
//! let feed = fetcher.fetch(&registry.get(0)?.url).await?;
//! ```

mod fetcher;
mod parser;
mod registry;

pub use fetcher::{FeedFetcher, FetchError, HttpFetcher};
pub use parser::{parse_feed, FeedEntry, FetchedFeed};
pub use registry::{DescriptorField, FeedDescriptor, FeedRegistry, RegistryError};
