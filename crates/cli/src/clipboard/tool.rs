// ABOUTME: PasteTool trait and the command-backed implementation used for every platform tool.
// ABOUTME: A tool is an external program that prints the clipboard text to stdout.

use std::process::{Command, Stdio};

/// A tool that can read text from the system clipboard.
pub trait PasteTool: Send + Sync {
    /// Tool name for display/logging.
    fn name(&self) -> &'static str;

    /// Check if this tool is available on the system.
    ///
    /// Should be fast - typically checks if the binary exists.
    fn is_available(&self) -> bool;

    /// Read the current clipboard text.
    fn try_paste(&self) -> Result<String, PasteToolError>;
}

/// Error from a specific tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteToolError {
    /// Tool not found on system
    NotFound,
    /// Tool execution failed
    Failed(String),
}

/// A paste tool backed by an external command (`pbpaste`, `xclip -o`, ...).
#[derive(Debug, Clone)]
pub struct CommandTool {
    name: &'static str,
    program: &'static str,
    args: &'static [&'static str],
}

impl CommandTool {
    pub const fn new(name: &'static str, program: &'static str, args: &'static [&'static str]) -> Self {
        Self {
            name,
            program,
            args,
        }
    }

    fn tool_exists(&self) -> bool {
        let locator = if cfg!(windows) { "where" } else { "which" };
        Command::new(locator)
            .arg(self.program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl PasteTool for CommandTool {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.tool_exists()
    }

    fn try_paste(&self) -> Result<String, PasteToolError> {
        let output = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PasteToolError::NotFound,
                _ => PasteToolError::Failed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PasteToolError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
