// ABOUTME: Error types for the relay including the ErrorCode enum and RelayError struct.
// ABOUTME: Messages are human-readable and travel to callers verbatim; codes only drive internal branching.

use std::fmt;

/// Error codes representing different categories of relay failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    InvalidUrl,
    Fetch,
    Timeout,
    Ssrf,
    Api,
    Transcript,
    Extract,
    Config,
    Unexpected,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidInput => "invalid input",
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Ssrf => "SSRF blocked",
            ErrorCode::Api => "API error",
            ErrorCode::Transcript => "transcript error",
            ErrorCode::Extract => "extraction error",
            ErrorCode::Config => "configuration error",
            ErrorCode::Unexpected => "unexpected error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for relay operations.
///
/// `message` is the human-facing context ("Error scraping article"); the
/// optional `source` carries the underlying cause and is appended on display.
#[derive(Debug, thiserror::Error)]
pub struct RelayError {
    pub code: ErrorCode,
    pub url: String,
    pub message: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl RelayError {
    fn with_code(
        code: ErrorCode,
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an InvalidInput error (missing or empty request input).
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InvalidInput, "", message, None)
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidUrl, url, message, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Fetch, url, message, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Timeout, url, message, source)
    }

    /// Create an SSRF error.
    pub fn ssrf(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Ssrf, url, message, source)
    }

    /// Create an Api error (an upstream API answered with something unusable).
    pub fn api(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Api, url, message, source)
    }

    /// Create a Transcript error.
    pub fn transcript(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Transcript, url, message, source)
    }

    /// Create an Extract error.
    pub fn extract(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Extract, url, message, source)
    }

    /// Create a Config error.
    pub fn config(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::with_code(ErrorCode::Config, "", message, source)
    }

    /// Create an Unexpected error.
    pub fn unexpected(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Unexpected, url, message, source)
    }

    /// Map a reqwest error onto Timeout or Fetch.
    pub fn from_reqwest(url: impl Into<String>, message: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(url, message, Some(err.into()))
        } else {
            Self::fetch(url, message, Some(err.into()))
        }
    }

    /// Returns true if this is an InvalidInput error.
    pub fn is_invalid_input(&self) -> bool {
        self.code == ErrorCode::InvalidInput
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is an SSRF error.
    pub fn is_ssrf(&self) -> bool {
        self.code == ErrorCode::Ssrf
    }

    /// Returns true if this is an Api error.
    pub fn is_api(&self) -> bool {
        self.code == ErrorCode::Api
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is an Unexpected error.
    pub fn is_unexpected(&self) -> bool {
        self.code == ErrorCode::Unexpected
    }
}
