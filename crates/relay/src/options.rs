// ABOUTME: Configuration options for the relay including upstream endpoints and HTTP settings.
// ABOUTME: RelayBuilder provides a fluent API for constructing Relay instances with custom settings.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::RedditCredentials;
use crate::relay::Relay;

/// Desktop browser User-Agent; several sites serve bot walls to library defaults.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Configuration options for the relay.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub resolve_timeout: Duration,
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
    pub reddit_auth_base: String,
    pub reddit_api_base: String,
    pub youtube_base: String,
    pub transcript_languages: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            resolve_timeout: Duration::from_secs(10),
            user_agent: BROWSER_USER_AGENT.to_string(),
            allow_private_networks: false,
            http_client: None,
            headers: HashMap::new(),
            reddit_auth_base: "https://www.reddit.com".to_string(),
            reddit_api_base: "https://oauth.reddit.com".to_string(),
            youtube_base: "https://www.youtube.com".to_string(),
            transcript_languages: vec!["en".to_string()],
        }
    }
}

/// Builder for constructing Relay instances with custom configuration.
#[derive(Debug, Clone)]
pub struct RelayBuilder {
    opts: Options,
}

impl RelayBuilder {
    /// Create a new RelayBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the per-request timeout used by the extractors.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the timeout of the redirect resolver.
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.opts.resolve_timeout = timeout;
        self
    }

    /// Set the User-Agent header for page fetches.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all page fetches.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Override the Reddit OAuth token endpoint base.
    pub fn reddit_auth_base(mut self, base: impl Into<String>) -> Self {
        self.opts.reddit_auth_base = base.into();
        self
    }

    /// Override the Reddit API base.
    pub fn reddit_api_base(mut self, base: impl Into<String>) -> Self {
        self.opts.reddit_api_base = base.into();
        self
    }

    /// Override the YouTube base used for watch pages and the player API.
    pub fn youtube_base(mut self, base: impl Into<String>) -> Self {
        self.opts.youtube_base = base.into();
        self
    }

    /// Preferred transcript languages, in priority order.
    pub fn transcript_languages<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.transcript_languages = langs.into_iter().map(Into::into).collect();
        self
    }

    /// Access the options collected so far.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Build the Relay with the configured options and Reddit credentials.
    pub fn build(self, credentials: RedditCredentials) -> Relay {
        Relay::new(self.opts, credentials)
    }
}

impl Default for RelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
