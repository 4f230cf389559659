// ABOUTME: Main library entry point for the scrape relay.
// ABOUTME: Re-exports the public API: Relay, RelayBuilder, ExtractionResult, RelayError, sinks, and config.

//! Scrape relay - turn a URL into a plain-text record of its content.
//!
//! A [`Relay`] resolves redirects, classifies the site (Reddit thread,
//! YouTube video, or generic article), runs the matching extractor, and
//! normalizes the outcome into an [`ExtractionResult`]. Results are handed to
//! a [`Sink`]: a file for the command-line tool, an HTTP response for the
//! server.
//!
//! # Example
//!
//! ```no_run
//! use scrape_relay::{load_secrets, FileSink, Relay};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let secrets = load_secrets("secrets.ini")?;
//!     let relay = Relay::builder().build(secrets.reddit);
//!     let path = relay
//!         .handle_into(Some("https://example.com/post"), FileSink::default())
//!         .await?;
//!     println!("Content saved to {}", path.display());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod extractors;
pub mod formats;
pub mod logging;
pub mod options;
pub mod relay;
pub mod resource;
pub mod result;
pub mod sink;

pub use crate::classify::{classify, SiteKind};
pub use crate::config::{load_secrets, RedditCredentials, Secrets, SecretsLoader, DEFAULT_SECRETS_FILE};
pub use crate::error::{ErrorCode, RelayError};
pub use crate::extractors::youtube::video_id;
pub use crate::extractors::Extractor;
pub use crate::logging::{init_logging, LogConfig, LogFormat};
pub use crate::options::{Options, RelayBuilder};
pub use crate::relay::{build_http_client, panic_message, run_extractor, Relay};
pub use crate::result::{ExtractionResult, FailureKind, Scraped, DEFAULT_TITLE, URL_REQUIRED};
pub use crate::sink::{FileFormat, FileSink, Sink, DEFAULT_OUTPUT_FILE};
