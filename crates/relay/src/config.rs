// ABOUTME: Loader for the Reddit application credentials (INI file plus environment overlay).
// ABOUTME: Credentials are read once at start-up and passed explicitly into the Relay.

//! Secrets loading.
//!
//! The expected file is a small INI document:
//!
//! ```ini
//! [REDDIT]
//! client_id = abc
//! client_secret = def
//! user_agent = scrape-relay/0.1 by u/someone
//! ```
//!
//! Any key can be overridden through `RELAY__REDDIT__<KEY>` environment
//! variables. Section and key names are matched case-insensitively.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde_json::Value;

use crate::error::RelayError;

/// Default location of the secrets file, relative to the working directory.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.ini";

const ENV_PREFIX: &str = "RELAY";
const REDDIT_SECTION: &str = "reddit";

/// Static application credentials for the Reddit API.
#[derive(Clone, PartialEq, Eq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Everything read from the secrets file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secrets {
    pub reddit: RedditCredentials,
}

/// Builder hiding the `config` crate wiring (INI sources + env overrides).
pub struct SecretsLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SecretsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretsLoader {
    /// Start with no files; `RELAY__`-prefixed environment variables always apply last.
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required INI file.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).format(FileFormat::Ini).required(true));
        self
    }

    /// Merge an inline INI snippet (tests, embedded defaults).
    pub fn with_ini_str(mut self, ini: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(ini, FileFormat::Ini));
        self
    }

    /// Consume the builder, merge the sources and validate the credentials.
    pub fn load(self) -> Result<Secrets, RelayError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| RelayError::config("failed to read configuration", Some(e.into())))?;

        let root: Value = cfg
            .try_deserialize()
            .map_err(|e| RelayError::config("malformed configuration", Some(e.into())))?;

        let section = section(&root, REDDIT_SECTION)
            .ok_or_else(|| RelayError::config("missing [REDDIT] section in configuration", None))?;

        let reddit = RedditCredentials {
            client_id: required(&section, "client_id")?,
            client_secret: required(&section, "client_secret")?,
            user_agent: required(&section, "user_agent")?,
        };

        Ok(Secrets { reddit })
    }
}

/// Load secrets from a file path (plus environment overrides).
pub fn load_secrets<P: AsRef<Path>>(path: P) -> Result<Secrets, RelayError> {
    SecretsLoader::new().with_file(path).load()
}

/// Merge every top-level table whose name matches `name` case-insensitively.
fn section(root: &Value, name: &str) -> Option<serde_json::Map<String, Value>> {
    let obj = root.as_object()?;
    let mut merged: Option<serde_json::Map<String, Value>> = None;
    for (key, value) in obj {
        if !key.eq_ignore_ascii_case(name) {
            continue;
        }
        if let Some(table) = value.as_object() {
            let target = merged.get_or_insert_with(serde_json::Map::new);
            for (k, v) in table {
                target.insert(k.to_lowercase(), v.clone());
            }
        }
    }
    merged
}

fn required(section: &serde_json::Map<String, Value>, key: &str) -> Result<String, RelayError> {
    let value = match section.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    };
    if value.is_empty() {
        return Err(RelayError::config(
            format!("missing REDDIT.{} in configuration", key),
            None,
        ));
    }
    Ok(value)
}
