use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors raised when the registry is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No descriptor exists at the requested position.
    #[error("Feed index {index} out of range (registry has {len} feeds)")]
    IndexOutOfRange { index: usize, len: usize },
    /// The descriptor exists but has an empty name or url.
    #[error("Feed at index {index} has an empty {field}")]
    InvalidDescriptor { index: usize, field: DescriptorField },
}

/// Which descriptor field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorField {
    Name,
    Url,
}

impl fmt::Display for DescriptorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Url => f.write_str("url"),
        }
    }
}

/// A subscribable feed: display name plus the source handed to the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedDescriptor {
    pub name: String,
    pub url: String,
}

impl FeedDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    fn check(&self, index: usize) -> Result<(), RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::InvalidDescriptor {
                index,
                field: DescriptorField::Name,
            });
        }
        if self.url.trim().is_empty() {
            return Err(RegistryError::InvalidDescriptor {
                index,
                field: DescriptorField::Url,
            });
        }
        Ok(())
    }
}

/// Ordered list of feed descriptors.
///
/// The sequence is mutable at runtime, so callers resolve indices through
/// [`FeedRegistry::get`] at the moment they need a descriptor rather than
/// holding on to positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRegistry {
    feeds: Vec<FeedDescriptor>,
}

impl Default for FeedRegistry {
    /// The stock subscription list shipped with the reader.
    fn default() -> Self {
        Self::new(vec![
            FeedDescriptor::new("Udacity Blog", "http://blog.udacity.com/feed"),
            FeedDescriptor::new("CSS Tricks", "http://feeds.feedburner.com/CssTricks"),
            FeedDescriptor::new("HTML5 Rocks", "http://feeds.feedburner.com/html5rocks"),
            FeedDescriptor::new(
                "Linear Digressions",
                "http://feeds.feedburner.com/udacity-linear-digressions",
            ),
        ])
    }
}

impl FeedRegistry {
    pub fn new(feeds: Vec<FeedDescriptor>) -> Self {
        Self { feeds }
    }

    /// Returns a copy of the descriptor at `index`, validated.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::IndexOutOfRange`] if `index >= len()`
    /// - [`RegistryError::InvalidDescriptor`] if the name or url is blank
    pub fn get(&self, index: usize) -> Result<FeedDescriptor, RegistryError> {
        let descriptor = self
            .feeds
            .get(index)
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                len: self.feeds.len(),
            })?;
        descriptor.check(index)?;
        Ok(descriptor.clone())
    }

    pub fn append(&mut self, descriptor: FeedDescriptor) {
        self.feeds.push(descriptor);
    }

    pub fn remove_last(&mut self) -> Option<FeedDescriptor> {
        self.feeds.pop()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedDescriptor> {
        self.feeds.iter()
    }

    /// Checks every descriptor, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), RegistryError> {
        self.feeds
            .iter()
            .enumerate()
            .try_for_each(|(index, descriptor)| descriptor.check(index))
    }
}
