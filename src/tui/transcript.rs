//! Message store behind the terminal transcript.
//!
//! Applies feed events and reports which content change each one caused, so
//! the app can forward it to the scroll engine. Rows are laid out in the same
//! order the list renders them: messages, running tools, typing indicator.

use ratatui::text::Line;

use crate::engine::ContentChange;

use super::feed::FeedEvent;
use super::widgets::{render_message_lines, tool_notification_line, typing_indicator_line, Message};

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    tools: Vec<String>,
    typing: bool,
    streaming: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn push(&mut self, message: Message) -> ContentChange {
        self.messages.push(message);
        ContentChange::MessageAppended
    }

    pub fn apply(&mut self, event: FeedEvent) -> Option<ContentChange> {
        match event {
            FeedEvent::Typing(on) => {
                if self.typing == on {
                    return None;
                }
                self.typing = on;
                Some(ContentChange::TypingIndicatorToggled)
            }
            FeedEvent::Message(message) => Some(self.push(message)),
            FeedEvent::StreamStarted(message) => {
                self.streaming = true;
                Some(self.push(message))
            }
            FeedEvent::Delta(text) => {
                if !self.streaming {
                    return None;
                }
                let last = self.messages.last_mut()?;
                last.content.push_str(&text);
                Some(ContentChange::StreamingDelta)
            }
            FeedEvent::StreamFinished => {
                self.streaming = false;
                None
            }
            FeedEvent::ToolStarted(name) => {
                self.tools.push(name);
                Some(ContentChange::ToolNotificationAdded)
            }
            FeedEvent::ToolFinished(name) => {
                let index = self.tools.iter().position(|tool| *tool == name)?;
                self.tools.remove(index);
                Some(ContentChange::ToolNotificationRemoved)
            }
        }
    }

    /// Height in rows of every rendered child, excluding the sentinel.
    pub fn row_heights(&self, width: usize) -> Vec<f64> {
        let mut heights: Vec<f64> = self
            .messages
            .iter()
            .map(|msg| render_message_lines(msg, width).len() as f64)
            .collect();
        heights.extend(self.tools.iter().map(|_| 1.0));
        if self.typing {
            heights.push(1.0);
        }
        heights
    }

    /// All rows, top to bottom.
    pub fn lines(&self, width: usize, spinner_frame: usize) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = self
            .messages
            .iter()
            .flat_map(|msg| render_message_lines(msg, width))
            .collect();
        lines.extend(self.tools.iter().map(|name| tool_notification_line(name)));
        if self.typing {
            lines.push(typing_indicator_line(spinner_frame));
        }
        lines
    }
}
