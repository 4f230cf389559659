// ABOUTME: Clipboard reading for the CLI: tries each platform paste tool in priority order.
// ABOUTME: Returns the first non-empty clipboard text, trimmed, or a ClipboardError.

mod tool;

pub use tool::{CommandTool, PasteTool, PasteToolError};

/// Errors that can occur while reading the clipboard.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("No clipboard tool available. On Linux, install wl-clipboard, xclip, or xsel.")]
    NoToolAvailable,

    #[error("Clipboard tool '{tool}' failed: {message}")]
    ToolFailed { tool: &'static str, message: String },

    #[error("Clipboard is empty")]
    Empty,
}

/// Get the platform-appropriate paste tools in priority order.
pub fn platform_tools() -> Vec<Box<dyn PasteTool>> {
    #[cfg(target_os = "macos")]
    {
        vec![Box::new(CommandTool::new("pbpaste", "pbpaste", &[]))]
    }

    #[cfg(target_os = "linux")]
    {
        vec![
            Box::new(CommandTool::new("wl-paste", "wl-paste", &["--no-newline"])),
            Box::new(CommandTool::new("xclip", "xclip", &["-selection", "clipboard", "-o"])),
            Box::new(CommandTool::new("xsel", "xsel", &["--clipboard", "--output"])),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        vec![Box::new(CommandTool::new(
            "powershell",
            "powershell",
            &["-NoProfile", "-Command", "Get-Clipboard"],
        ))]
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        vec![]
    }
}

/// Reads text from the clipboard using available tools.
pub struct Paste {
    tools: Vec<Box<dyn PasteTool>>,
}

impl Paste {
    /// Create with platform-appropriate tools.
    pub fn new() -> Self {
        Self {
            tools: platform_tools(),
        }
    }

    /// Create with specific tools (for testing).
    pub fn with_tools(tools: Vec<Box<dyn PasteTool>>) -> Self {
        Self { tools }
    }

    /// Read the clipboard text, trimmed.
    pub fn read(&self) -> Result<String, ClipboardError> {
        let mut last_failure = None;
        let mut saw_empty = false;

        for tool in self.tools.iter().filter(|t| t.is_available()) {
            match tool.try_paste() {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        tracing::debug!(tool = tool.name(), "read clipboard");
                        return Ok(text.to_string());
                    }
                    saw_empty = true;
                }
                Err(PasteToolError::NotFound) => continue,
                Err(PasteToolError::Failed(message)) => {
                    tracing::debug!(tool = tool.name(), %message, "paste tool failed");
                    last_failure = Some(ClipboardError::ToolFailed {
                        tool: tool.name(),
                        message,
                    });
                }
            }
        }

        if saw_empty {
            return Err(ClipboardError::Empty);
        }
        Err(last_failure.unwrap_or(ClipboardError::NoToolAvailable))
    }
}

impl Default for Paste {
    fn default() -> Self {
        Self::new()
    }
}
