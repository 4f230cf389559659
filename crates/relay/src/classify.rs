// ABOUTME: Site classification for resolved URLs (Reddit thread, YouTube video, or generic article).
// ABOUTME: Plain substring rule over domain markers; anything unrecognised is an article.

use std::fmt;

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

/// The handler family a URL is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    Article,
    Reddit,
    YouTube,
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SiteKind::Article => "article",
            SiteKind::Reddit => "reddit",
            SiteKind::YouTube => "youtube",
        };
        write!(f, "{}", s)
    }
}

const REDDIT_MARKERS: &[&str] = &["reddit.com"];
const YOUTUBE_MARKERS: &[&str] = &["youtube.com", "youtu.be"];

static REDDIT: Lazy<AhoCorasick> = Lazy::new(|| build_matcher(REDDIT_MARKERS));
static YOUTUBE: Lazy<AhoCorasick> = Lazy::new(|| build_matcher(YOUTUBE_MARKERS));

fn build_matcher(markers: &[&str]) -> AhoCorasick {
    AhoCorasick::new(markers).expect("static marker patterns are valid")
}

/// Classify a (resolved) URL.
///
/// Order is fixed and the first match wins: the Reddit marker, then either
/// YouTube marker, then the article fallback. No scheme validation happens
/// here; malformed input is routed to the article extractor and fails there.
pub fn classify(url: &str) -> SiteKind {
    if REDDIT.is_match(url) {
        SiteKind::Reddit
    } else if YOUTUBE.is_match(url) {
        SiteKind::YouTube
    } else {
        SiteKind::Article
    }
}
