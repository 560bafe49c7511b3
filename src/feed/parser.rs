use chrono::{DateTime, Utc};
use feed_rs::parser;
use sha2::{Digest, Sha256};

/// One parsed item from a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// A feed as produced by a fetcher: its own title (if any) plus entries in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// Parses RSS 0.9x/1.0/2.0, Atom or JSON Feed bytes.
pub fn parse_feed(bytes: &[u8]) -> Result<FetchedFeed, feed_rs::parser::ParseFeedError> {
    let feed = parser::parse(bytes)?;

    let title = feed
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty());

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry.links.first().map(|l| l.href.clone());
            let published = entry.published.or(entry.updated);
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body));
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());

            let existing_id = (!entry.id.is_empty()).then_some(entry.id.as_str());
            let id = entry_id(existing_id, link.as_deref(), &title, published);

            FeedEntry {
                id,
                title,
                link,
                published,
                summary,
            }
        })
        .collect();

    Ok(FetchedFeed { title, entries })
}

fn entry_id(
    existing: Option<&str>,
    link: Option<&str>,
    title: &str,
    published: Option<DateTime<Utc>>,
) -> String {
    if let Some(id) = existing.map(str::trim).filter(|id| !id.is_empty()) {
        return id.to_string();
    }

    let input = format!(
        "{}|{}|{}",
        link.unwrap_or(""),
        title,
        published.map(|p| p.timestamp().to_string()).unwrap_or_default()
    );
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
