// ABOUTME: The Relay dispatcher: validate input, resolve redirects, classify, and run one extractor.
// ABOUTME: Owns the shared HTTP client (with the SSRF redirect policy) and the three extractors.

use std::any::Any;
use std::net::ToSocketAddrs;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::classify::{classify, SiteKind};
use crate::config::RedditCredentials;
use crate::error::{ErrorCode, RelayError};
use crate::extractors::{ArticleExtractor, Extractor, RedditExtractor, YouTubeExtractor};
use crate::options::{Options, RelayBuilder};
use crate::resource::{resolve_redirects, FetchOptions};
use crate::result::{normalize, ExtractionResult, FailureKind, URL_REQUIRED};
use crate::sink::Sink;

/// Turns a user-supplied URL into an [`ExtractionResult`].
///
/// A `Relay` is immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Relay {
    opts: Options,
    http_client: reqwest::Client,
    resolve_opts: FetchOptions,
    article: ArticleExtractor,
    reddit: RedditExtractor,
    youtube: YouTubeExtractor,
}

impl Relay {
    /// Create a new RelayBuilder for configuring the relay.
    pub fn builder() -> RelayBuilder {
        RelayBuilder::new()
    }

    /// Create a new Relay with the given options and Reddit credentials.
    pub fn new(opts: Options, credentials: RedditCredentials) -> Self {
        let http_client = opts
            .http_client
            .clone()
            .unwrap_or_else(|| build_http_client(&opts));

        let page_opts = FetchOptions {
            headers: opts.headers.clone(),
            allow_private_networks: opts.allow_private_networks,
            parse_non_200: false,
            timeout: Some(opts.timeout),
        };
        let resolve_opts = FetchOptions {
            timeout: Some(opts.resolve_timeout),
            ..page_opts.clone()
        };

        let article = ArticleExtractor::new(http_client.clone(), page_opts.clone());
        let reddit = RedditExtractor::new(
            http_client.clone(),
            opts.reddit_auth_base.clone(),
            opts.reddit_api_base.clone(),
            credentials,
        );
        let youtube = YouTubeExtractor::new(
            http_client.clone(),
            opts.youtube_base.clone(),
            opts.transcript_languages.clone(),
            page_opts,
        );

        Self {
            opts,
            http_client,
            resolve_opts,
            article,
            reddit,
            youtube,
        }
    }

    /// The options this relay was built with.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Follow redirects for `url`; returns `url` itself when resolution fails.
    pub async fn resolve(&self, url: &str) -> String {
        resolve_redirects(&self.http_client, url, &self.resolve_opts).await
    }

    /// Classify a resolved URL.
    pub fn classify(&self, url: &str) -> SiteKind {
        classify(url)
    }

    /// The extractor responsible for `kind`.
    pub fn extractor_for(&self, kind: SiteKind) -> &dyn Extractor {
        match kind {
            SiteKind::Article => &self.article,
            SiteKind::Reddit => &self.reddit,
            SiteKind::YouTube => &self.youtube,
        }
    }

    /// Run one request end to end.
    ///
    /// A missing or blank URL fails with [`URL_REQUIRED`] before any network
    /// access. Extractor errors become failure records; they never escape.
    pub async fn handle(&self, raw_url: Option<&str>) -> ExtractionResult {
        let Some(url) = raw_url.map(str::trim).filter(|u| !u.is_empty()) else {
            tracing::debug!("rejected request without URL");
            return ExtractionResult::failure(FailureKind::Input, URL_REQUIRED);
        };

        let resolved = self.resolve(url).await;
        let kind = self.classify(&resolved);
        tracing::info!(url, resolved = %resolved, site = %kind, "scraping");

        run_extractor(self.extractor_for(kind), &resolved).await
    }

    /// Run [`Relay::handle`] and hand the result to `sink`.
    pub async fn handle_into<S: Sink>(&self, raw_url: Option<&str>, sink: S) -> S::Output {
        let result = self.handle(raw_url).await;
        sink.emit(&result)
    }
}

/// Run `extractor` on an already resolved URL and normalize the outcome.
///
/// Errors become extraction failures. A panic inside the extractor is caught
/// here and reported as an unexpected failure instead of unwinding further.
pub async fn run_extractor(extractor: &dyn Extractor, resolved: &str) -> ExtractionResult {
    let kind = extractor.kind();
    let outcome = AssertUnwindSafe(extractor.extract(resolved))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            let detail = panic_message(&*panic);
            tracing::error!(url = resolved, site = %kind, panic = %detail, "extractor panicked");
            Err(RelayError::unexpected(
                resolved,
                format!("Unexpected error: {}", detail),
                None,
            ))
        });

    match outcome {
        Ok(scraped) => normalize(scraped, resolved),
        Err(err) => {
            let failure = match err.code {
                ErrorCode::Unexpected => FailureKind::Unexpected,
                _ => FailureKind::Extraction,
            };
            tracing::warn!(url = resolved, site = %kind, error = %err, "extraction failed");
            ExtractionResult::failure(failure, err.to_string())
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// Build the shared HTTP client: browser user agent, cookies, compression, and
/// a redirect policy that refuses private addresses unless allowed.
pub fn build_http_client(opts: &Options) -> reqwest::Client {
    let allow_private = opts.allow_private_networks;
    let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= 10 {
            return attempt.error("too many redirects");
        }
        if allow_private {
            return attempt.follow();
        }
        let next = attempt.url().clone();
        let Some(host) = next.host_str() else {
            return attempt.follow();
        };
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<std::net::IpAddr>() {
            if crate::resource::is_private_ip(&ip) {
                return attempt.error("redirect to private IP blocked");
            }
            return attempt.follow();
        }
        // synchronous DNS resolution to avoid async in redirect policy
        let port = next.port_or_known_default().unwrap_or(80);
        match (bare, port).to_socket_addrs() {
            Ok(addrs) => {
                for sa in addrs {
                    if crate::resource::is_private_ip(&sa.ip()) {
                        return attempt.error("redirect to private IP blocked");
                    }
                }
                attempt.follow()
            }
            Err(_) => attempt.error("DNS lookup failed during redirect"),
        }
    });

    reqwest::Client::builder()
        .redirect(redirect_policy)
        .user_agent(&opts.user_agent)
        .timeout(opts.timeout)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}
