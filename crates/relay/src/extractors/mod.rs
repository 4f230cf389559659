// ABOUTME: Content extraction strategies, one per site kind.
// ABOUTME: Defines the Extractor trait shared by the article, Reddit, and YouTube extractors.

//! Content extraction module.
//!
//! Each extractor turns a resolved URL into a [`Scraped`] record or a
//! [`RelayError`] whose message is ready to show to a user. Extractors never
//! panic on bad input; the dispatcher decides what to do with failures.
//!
//! Submodules:
//! - `article`: generic pages (title + main text).
//! - `reddit`: Reddit threads through the OAuth API, full comment expansion.
//! - `youtube`: video title plus caption transcript.

use async_trait::async_trait;

use crate::classify::SiteKind;
use crate::error::RelayError;
use crate::result::Scraped;

pub mod article;
pub mod reddit;
pub mod youtube;

pub use article::ArticleExtractor;
pub use reddit::RedditExtractor;
pub use youtube::YouTubeExtractor;

/// A strategy that produces a [`Scraped`] record for a resolved URL.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The site kind this extractor handles.
    fn kind(&self) -> SiteKind;

    /// Extract title and content for `url`.
    async fn extract(&self, url: &str) -> Result<Scraped, RelayError>;
}
