//! Custom widgets for the TUI

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::engine::FollowMode;

use super::theme::Theme;

/// Wrap a long string into multiple lines, respecting unicode width
fn wrap_text(text: &str, max_width: usize, indent: &str) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let indent_width = indent.width();
    let content_width = max_width.saturating_sub(indent_width);

    if content_width == 0 || text.width() <= content_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for c in text.chars() {
        let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(1);

        if current_width + char_width > content_width && !current_line.is_empty() {
            lines.push(current_line);
            current_line = String::new();
            current_width = 0;
        }

        current_line.push(c);
        current_width += char_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// A message in the conversation
#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Local::now().format("%H:%M").to_string(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

/// Render a single message to lines for display
/// max_width: terminal width for text wrapping (0 = no wrapping)
pub fn render_message_lines(msg: &Message, max_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let content_width = max_width.saturating_sub(4); // Account for "  " indent and some margin

    if msg.role == MessageRole::System {
        let style = Theme::dim().add_modifier(Modifier::ITALIC);
        for wrapped_line in wrap_text(&msg.content, content_width, "  ") {
            lines.push(Line::from(vec![
                Span::styled("  ", Theme::dim()),
                Span::styled(wrapped_line, style),
            ]));
        }
    } else {
        let (badge_text, badge_style) = match msg.role {
            MessageRole::User => (" You ", Theme::user_badge()),
            _ => (" Assistant ", Theme::assistant_badge()),
        };
        lines.push(Line::from(vec![
            Span::styled(badge_text, badge_style),
            Span::styled(format!(" {}", msg.timestamp), Theme::muted()),
        ]));

        for content_line in msg.content.lines() {
            let wrapped = wrap_text(content_line, content_width, "  ");
            for (i, wrapped_line) in wrapped.into_iter().enumerate() {
                let indent = if i == 0 { "  " } else { "    " };
                lines.push(Line::from(vec![
                    Span::raw(indent.to_string()),
                    Span::styled(wrapped_line, Theme::text()),
                ]));
            }
        }
    }

    // Add empty line for spacing
    lines.push(Line::from(""));

    lines
}

/// One row announcing a running tool.
pub fn tool_notification_line(name: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ⚡ ", Theme::tool_marker()),
        Span::styled(format!("running {name}…"), Theme::muted()),
    ])
}

/// One row for the "assistant is typing" indicator.
pub fn typing_indicator_line(spinner_frame: usize) -> Line<'static> {
    const DOTS: [&str; 4] = ["   ", ".  ", ".. ", "..."];
    Line::from(Span::styled(
        format!("  Assistant is typing{}", DOTS[spinner_frame % DOTS.len()]),
        Theme::typing(),
    ))
}

/// Header bar with title, session and follow mode
pub struct HeaderBar<'a> {
    pub title: &'a str,
    pub session: &'a str,
    pub mode: FollowMode,
}

impl Widget for HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let title_line = Line::from(vec![
            Span::styled("◆ ", Theme::title()),
            Span::styled(self.title, Theme::title()),
            Span::styled(format!("  {}", self.session), Theme::muted()),
        ]);
        buf.set_line(area.x + 1, area.y, &title_line, area.width.saturating_sub(2));

        // Follow mode on the right
        let (mode_str, mode_style) = match self.mode {
            FollowMode::Following => ("● Following ", Theme::following()),
            FollowMode::Paused => ("‖ Paused ", Theme::paused()),
        };
        let mode_len = mode_str.width() as u16;
        let mode_x = area.x + area.width.saturating_sub(mode_len + 1);
        buf.set_span(mode_x, area.y, &Span::styled(mode_str, mode_style), mode_len + 1);
    }
}

/// Status bar showing what the feed is doing
pub struct StatusBar<'a> {
    pub status_text: &'a str,
    pub is_busy: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = if self.is_busy {
            Line::from(vec![
                Span::styled("◌ ", Theme::activity()),
                Span::styled(self.status_text, Theme::activity()),
            ])
        } else {
            Line::from(vec![
                Span::styled("● ", Theme::idle()),
                Span::styled(self.status_text, Theme::dim()),
            ])
        };

        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));
    }
}

/// Help bar showing key bindings
pub struct HelpBar;

impl Widget for HelpBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bindings = [
            ("Scroll/↑↓", "read"),
            ("PgUp/PgDn", "page"),
            ("End", "bottom"),
            ("n", "New session"),
            ("q", "Quit"),
        ];

        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Theme::muted()));
            }
            spans.push(Span::styled(*key, Theme::key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::muted()));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
