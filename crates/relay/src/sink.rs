// ABOUTME: Output sinks that consume an ExtractionResult (file output lives here).
// ABOUTME: The HTTP responder sink is implemented by the server crate against the same trait.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::result::ExtractionResult;

/// Default file written by the command-line tool.
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Something that takes a finished result and delivers it.
pub trait Sink {
    type Output;

    fn emit(self, result: &ExtractionResult) -> Self::Output;
}

/// Encoding used by [`FileSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// `Title: …\nURL: …\nContent:\n…`, or the bare error message.
    #[default]
    Text,
    /// The result serialized as pretty JSON (`{title,url,content}` or `{error}`).
    Json,
}

/// Writes the result to a file, replacing any previous content.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: FileFormat,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: FileFormat::Text,
        }
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_FILE)
    }
}

impl Sink for FileSink {
    type Output = io::Result<PathBuf>;

    fn emit(self, result: &ExtractionResult) -> Self::Output {
        let body = match self.format {
            FileFormat::Text => result.format_text(),
            FileFormat::Json => serde_json::to_string_pretty(result)?,
        };
        fs::write(&self.path, body)?;
        tracing::debug!(path = %self.path.display(), ok = result.is_ok(), "wrote result");
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::FailureKind;
    use pretty_assertions::assert_eq;

    fn page() -> ExtractionResult {
        ExtractionResult::Page {
            title: "T".to_string(),
            url: "https://a.test/".to_string(),
            content: "Body".to_string(),
        }
    }

    #[test]
    fn writes_text_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let written = FileSink::new(&path).emit(&page()).unwrap();
        assert_eq!(written, path);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Title: T\nURL: https://a.test/\nContent:\nBody"
        );
    }

    #[test]
    fn failure_writes_only_the_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "stale").unwrap();
        FileSink::new(&path)
            .emit(&ExtractionResult::failure(FailureKind::Extraction, "Error scraping article: boom"))
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Error scraping article: boom");
    }

    #[test]
    fn json_format_uses_response_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        FileSink::new(&path)
            .with_format(FileFormat::Json)
            .emit(&page())
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "T", "url": "https://a.test/", "content": "Body"})
        );
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.txt");
        assert!(FileSink::new(path).emit(&page()).is_err());
    }
}
