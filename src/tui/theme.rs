//! Styles for the transcript view, keyed by what is on screen rather than by
//! color. Only the 16 ANSI colors are used so the terminal palette decides
//! the exact shades.

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

const BRAND: Color = Color::Cyan;
const FOLLOW: Color = Color::Green;
const READING: Color = Color::Magenta;
const ACTIVITY: Color = Color::Yellow;
const QUIET: Color = Color::DarkGray;

impl Theme {
    pub fn title() -> Style {
        Style::new().fg(BRAND).add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::new().fg(QUIET)
    }

    /// Session ids, timestamps, separators.
    pub fn muted() -> Style {
        Style::new().fg(QUIET)
    }

    pub fn text() -> Style {
        Style::new()
    }

    pub fn dim() -> Style {
        Style::new().add_modifier(Modifier::DIM)
    }

    pub fn user_badge() -> Style {
        Style::new()
            .bg(BRAND)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    pub fn assistant_badge() -> Style {
        Style::new()
            .bg(FOLLOW)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    /// Running tool rows and the busy status.
    pub fn activity() -> Style {
        Style::new().fg(ACTIVITY)
    }

    pub fn tool_marker() -> Style {
        Self::activity().add_modifier(Modifier::BOLD)
    }

    pub fn typing() -> Style {
        Style::new().fg(Color::Gray).add_modifier(Modifier::ITALIC)
    }

    pub fn idle() -> Style {
        Style::new().fg(FOLLOW)
    }

    pub fn following() -> Style {
        Style::new().fg(FOLLOW).add_modifier(Modifier::BOLD)
    }

    /// The reader scrolled up; new content will not move the view.
    pub fn paused() -> Style {
        Style::new()
            .fg(READING)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    pub fn key() -> Style {
        Style::new().fg(BRAND).add_modifier(Modifier::BOLD)
    }
}
