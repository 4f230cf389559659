// ABOUTME: Generic article extractor: downloads a page and pulls its title and main text.
// ABOUTME: Readability scoring picks the body; any fetch failure becomes an "Error scraping article" RelayError.

use async_trait::async_trait;
use dom_smoothie::{Article, Readability};
use scraper::Html;
use url::Url;

use crate::classify::SiteKind;
use crate::error::RelayError;
use crate::extractors::Extractor;
use crate::formats::{body_text, extract_title, fragment_text, normalize_whitespace};
use crate::resource::{fetch, FetchOptions};
use crate::result::Scraped;

const FAILURE_MESSAGE: &str = "Error scraping article";

/// Extracts readable text from ordinary web pages.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    http: reqwest::Client,
    fetch_opts: FetchOptions,
}

impl ArticleExtractor {
    pub fn new(http: reqwest::Client, fetch_opts: FetchOptions) -> Self {
        Self { http, fetch_opts }
    }

    /// Extract from already downloaded HTML.
    ///
    /// The body is whatever readability keeps, so navigation, sidebars and
    /// footers are dropped. Pages readability cannot handle fall back to the
    /// text of `<body>`. The title chain (`<title>`, `og:title`, ...) wins over
    /// readability's own guess.
    pub fn extract_html(html: &str, url: &str) -> Scraped {
        let doc = Html::parse_document(html);
        let article = readable(html, url);

        let title = extract_title(&doc).or_else(|| {
            article
                .as_ref()
                .map(|a| normalize_whitespace(&a.title))
                .filter(|t| !t.is_empty())
        });
        let content = article
            .map(|a| fragment_text(&a.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| body_text(&doc));

        Scraped {
            title,
            url: url.to_string(),
            content: Some(content),
        }
    }
}

fn readable(html: &str, url: &str) -> Option<Article> {
    let doc_url = Url::parse(url).ok().map(|_| url);
    let parsed = Readability::new(html, doc_url, None).and_then(|mut r| r.parse());
    match parsed {
        Ok(article) => Some(article),
        Err(e) => {
            tracing::debug!(url, error = %e, "readability found no article");
            None
        }
    }
}

#[async_trait]
impl Extractor for ArticleExtractor {
    fn kind(&self) -> SiteKind {
        SiteKind::Article
    }

    async fn extract(&self, url: &str) -> Result<Scraped, RelayError> {
        let page = fetch(&self.http, url, &self.fetch_opts)
            .await
            .map_err(|e| RelayError::extract(url, FAILURE_MESSAGE, Some(e.into())))?;

        let scraped = Self::extract_html(&page.text(), url);
        tracing::debug!(
            url,
            title = scraped.title.as_deref().unwrap_or_default(),
            chars = scraped.content.as_deref().map(str::len).unwrap_or_default(),
            "extracted article"
        );
        Ok(scraped)
    }
}
