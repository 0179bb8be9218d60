//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration the REPL runs with.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_BASE_URL, Gateway};
use crate::error::Result;

/// Command-line arguments for the snoochat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the agent backend.
    #[arrrg(optional, "Agent backend URL (default: http://localhost:8000/)", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Show the agent's log lines under each response.
    #[arrrg(flag, "Show agent logs")]
    pub show_logs: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Where the agent backend listens.
    pub base_url: String,

    /// Optional request timeout; transport defaults apply without one.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether agent logs start out visible.
    pub show_logs: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Backend: http://localhost:8000/
    /// - Timeout: none
    /// - Color: enabled
    /// - Logs: hidden
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            use_color: true,
            show_logs: false,
        }
    }

    /// Sets the backend URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets whether agent logs are shown.
    pub fn with_logs(mut self, show_logs: bool) -> Self {
        self.show_logs = show_logs;
        self
    }

    /// Builds the gateway this configuration describes.
    pub fn gateway(&self) -> Result<Gateway> {
        Gateway::with_options(Some(&self.base_url), self.timeout)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            base_url: args
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: args.timeout_secs.map(Duration::from_secs),
            use_color: !args.no_color,
            show_logs: args.show_logs,
        }
    }
}
