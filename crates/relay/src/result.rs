// ABOUTME: Result types: raw extractor output (Scraped) and the normalized ExtractionResult.
// ABOUTME: Includes normalization defaults and the plain-text rendering used by file output.

use serde::{Deserialize, Serialize};

/// Title used when an extractor could not determine one.
pub const DEFAULT_TITLE: &str = "Scraped Content";

/// Message returned for a missing or empty `url` input.
pub const URL_REQUIRED: &str = "URL is required";

/// Raw output of an extractor, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scraped {
    pub title: Option<String>,
    pub url: String,
    pub content: Option<String>,
}

/// Why a request failed; drives status codes, never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request itself was unusable (missing URL).
    Input,
    /// An extractor reported a failure.
    Extraction,
    /// Anything no extractor anticipated.
    Unexpected,
}

/// The record handed to a sink: either a page or an error, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Page {
        title: String,
        url: String,
        content: String,
    },
    Failure {
        error: String,
        #[serde(skip, default = "unexpected_kind")]
        kind: FailureKind,
    },
}

fn unexpected_kind() -> FailureKind {
    FailureKind::Unexpected
}

impl ExtractionResult {
    /// Build a failure record.
    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        ExtractionResult::Failure {
            error: error.into(),
            kind,
        }
    }

    /// Returns true for the page variant.
    pub fn is_ok(&self) -> bool {
        matches!(self, ExtractionResult::Page { .. })
    }

    /// The error message, if this is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            ExtractionResult::Failure { error, .. } => Some(error),
            ExtractionResult::Page { .. } => None,
        }
    }

    /// The failure kind, if this is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExtractionResult::Failure { kind, .. } => Some(*kind),
            ExtractionResult::Page { .. } => None,
        }
    }

    /// Render as the text document written by the file sink.
    pub fn format_text(&self) -> String {
        match self {
            ExtractionResult::Page {
                title,
                url,
                content,
            } => format!("Title: {}\nURL: {}\nContent:\n{}", title, url, content),
            ExtractionResult::Failure { error, .. } => error.clone(),
        }
    }
}

/// Normalize raw extractor output into a page record.
///
/// Missing title becomes [`DEFAULT_TITLE`], missing content becomes empty,
/// content is trimmed, and the URL is always the resolved URL.
pub fn normalize(scraped: Scraped, resolved_url: &str) -> ExtractionResult {
    let title = scraped.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let content = scraped
        .content
        .map(|c| c.trim().to_string())
        .unwrap_or_default();
    ExtractionResult::Page {
        title,
        url: resolved_url.to_string(),
        content,
    }
}
