//! Chatscroll - auto-scroll coordination for chat message lists
//!
//! Keeps a message list pinned to the newest content while streaming, and
//! leaves it alone while a human is reading further up:
//! - Classify scroll events as user-driven or self-inflicted
//! - Coalesce bursts of content changes into one scroll per frame
//! - Reset follow state whenever the conversation switches

pub mod engine;
pub mod host;
pub mod replay;
pub mod tui;

pub use engine::{
    AutoScrollEngine, AutoScrollState, ContentChange, EngineSettings, FollowMode, FrameOutcome,
    ScrollBehavior, ScrollContainer, ScrollIntent,
};
pub use host::VirtualList;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for Chatscroll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatScrollConfig {
    /// Distance from bottom (inclusive) within which a user scroll resumes
    /// following new content
    pub follow_threshold: f64,

    /// How long an engine-issued scroll waits for its scroll event before the
    /// next event counts as the user's
    pub programmatic_window_ms: u64,

    /// Frame cadence of the terminal host
    pub frame_interval_ms: u64,

    /// Where tracing output goes while the terminal UI owns the screen
    pub log_file: Option<PathBuf>,
}

impl Default for ChatScrollConfig {
    fn default() -> Self {
        Self {
            follow_threshold: engine::DEFAULT_FOLLOW_THRESHOLD,
            programmatic_window_ms: engine::DEFAULT_PROGRAMMATIC_WINDOW.as_millis() as u64,
            frame_interval_ms: 16,
            log_file: None,
        }
    }
}

impl ChatScrollConfig {
    /// `~/.config/chatscroll/config.toml` (platform equivalent).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatscroll").join("config.toml"))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given (it must exist), else the default path if it
    /// exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.follow_threshold.is_finite() || self.follow_threshold < 0.0 {
            return Err(ChatScrollError::Config(format!(
                "follow_threshold must be a non-negative number, got {}",
                self.follow_threshold
            )));
        }
        if self.programmatic_window_ms == 0 {
            return Err(ChatScrollError::Config(
                "programmatic_window_ms must be greater than zero".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(ChatScrollError::Config(
                "frame_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn with_follow_threshold(mut self, threshold: f64) -> Self {
        self.follow_threshold = threshold;
        self
    }

    pub fn with_programmatic_window_ms(mut self, window_ms: u64) -> Self {
        self.programmatic_window_ms = window_ms;
        self
    }

    pub fn with_frame_interval_ms(mut self, interval_ms: u64) -> Self {
        self.frame_interval_ms = interval_ms;
        self
    }

    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }
}

/// Result type for Chatscroll operations
pub type Result<T> = std::result::Result<T, ChatScrollError>;

/// Errors that can occur in Chatscroll
///
/// The engine itself never fails; these cover configuration, replay scripts
/// and terminal I/O around it.
#[derive(Debug, thiserror::Error)]
pub enum ChatScrollError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Replay script line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
