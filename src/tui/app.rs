//! Main TUI application

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::engine::{AutoScrollEngine, EngineSettings, FrameQueue, ScrollContainer, SystemClock};
use crate::host::VirtualList;
use crate::ChatScrollConfig;

use super::feed::{self, FeedEvent};
use super::theme::Theme;
use super::transcript::Transcript;
use super::widgets::{HeaderBar, HelpBar, Message, StatusBar};

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: f64 = 3.0;
/// Delay between streamed words.
const FEED_PACE: Duration = Duration::from_millis(45);
/// Nominal height of one terminal row. The configured follow threshold is in
/// pixels while the transcript is measured in rows.
const ROW_HEIGHT_PX: f64 = 20.0;

/// Engine settings with the follow threshold converted to rows.
fn row_settings(config: &ChatScrollConfig) -> EngineSettings {
    let settings = EngineSettings::from(config);
    EngineSettings {
        follow_threshold: settings.follow_threshold / ROW_HEIGHT_PX,
        ..settings
    }
}

/// Application state
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    config: ChatScrollConfig,
    transcript: Transcript,
    session_id: String,
    session_counter: u64,
    /// Scroll container the engine measures and moves.
    list: VirtualList,
    frames: FrameQueue,
    engine: AutoScrollEngine<SystemClock, FrameQueue>,
    feed_rx: Option<mpsc::Receiver<FeedEvent>>,
    feed_handle: Option<JoinHandle<()>>,
    spinner_frame: usize,
    should_quit: bool,
    /// Wrap width of the transcript, set during layout.
    wrap_width: usize,
}

impl App {
    pub fn new(config: ChatScrollConfig) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, crossterm::event::EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let frames = FrameQueue::new();
        let mut list = VirtualList::new(0.0);
        let mut engine =
            AutoScrollEngine::mount(row_settings(&config), SystemClock, frames.clone());
        engine.attach(list.subscribe());

        Ok(Self {
            terminal,
            config,
            transcript: Transcript::new(),
            session_id: String::new(),
            session_counter: 0,
            list,
            frames,
            engine,
            feed_rx: None,
            feed_handle: None,
            spinner_frame: 0,
            should_quit: false,
            wrap_width: 0,
        })
    }

    /// Run the main event loop. Each iteration is one animation frame.
    pub async fn run(&mut self) -> io::Result<()> {
        let frame_interval = self.config.frame_interval();
        self.start_session();

        while !self.should_quit {
            self.drain_feed();
            self.layout()?;

            self.engine
                .on_update(Some(&self.session_id), self.transcript.message_count());
            self.engine.pump_scroll_events(&self.list);
            for frame in self.frames.take_due() {
                self.engine.on_animation_frame(frame, &mut self.list);
            }
            self.engine.pump_scroll_events(&self.list);

            self.draw()?;
            self.spinner_frame = self.spinner_frame.wrapping_add(1);

            if event::poll(frame_interval)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        self.stop_feed();
        self.engine.unmount();
        info!("tui stopped");
        Ok(())
    }

    /// Switch to a brand-new conversation with its own feed.
    fn start_session(&mut self) {
        self.stop_feed();
        self.session_counter += 1;
        self.session_id = format!("session-{}", self.session_counter);
        self.transcript = Transcript::new();
        self.transcript
            .push(Message::system(format!("{} started", self.session_id)));

        let (tx, rx) = mpsc::channel(256);
        self.feed_rx = Some(rx);
        self.feed_handle = Some(feed::spawn(self.session_id.clone(), tx, FEED_PACE));
        info!(session = %self.session_id, "session started");
    }

    fn stop_feed(&mut self) {
        if let Some(handle) = self.feed_handle.take() {
            handle.abort();
        }
        self.feed_rx = None;
    }

    /// Apply every queued feed event and notify the engine of each change.
    fn drain_feed(&mut self) {
        let Some(rx) = self.feed_rx.as_mut() else {
            return;
        };
        while let Ok(event) = rx.try_recv() {
            if let Some(change) = self.transcript.apply(event) {
                self.engine.on_content_change(change);
            }
        }
    }

    fn chunks(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(1), // Status
                Constraint::Min(3),    // Transcript
                Constraint::Length(1), // Help
            ])
            .split(area)
    }

    fn transcript_block() -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title_top(Line::styled(" Conversation ", Theme::muted()))
    }

    /// Measure the transcript at the current terminal size and re-render the
    /// list, sentinel last.
    fn layout(&mut self) -> io::Result<()> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let inner = Self::transcript_block().inner(Self::chunks(area)[2]);

        // Leave the rightmost column for the scrollbar.
        self.wrap_width = inner.width.saturating_sub(1) as usize;
        self.list.resize(inner.height as f64);
        self.list.render(&self.transcript.row_heights(self.wrap_width));
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let page = (self.list.client_height() - 1.0).max(1.0);
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('n') => self.start_session(),
            KeyCode::Up => self.list.user_scroll_by(-1.0),
            KeyCode::Down => self.list.user_scroll_by(1.0),
            KeyCode::PageUp => self.list.user_scroll_by(-page),
            KeyCode::PageDown => self.list.user_scroll_by(page),
            KeyCode::Home => self.list.user_scroll_to(0.0),
            KeyCode::End => {
                let bottom = self.list.max_scroll_top();
                self.list.user_scroll_to(bottom);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.list.user_scroll_by(-WHEEL_STEP),
            MouseEventKind::ScrollDown => self.list.user_scroll_by(WHEEL_STEP),
            _ => {}
        }
    }

    fn status_text(&self) -> (String, bool) {
        if let Some(tool) = self.transcript.tools().last() {
            (format!("Running {tool}"), true)
        } else if self.transcript.is_typing() {
            ("Thinking".to_string(), true)
        } else if self.transcript.is_streaming() {
            ("Streaming reply".to_string(), true)
        } else {
            ("Ready".to_string(), false)
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        let mode = self.engine.mode();
        let session_id = &self.session_id;
        let (status_text, is_busy) = self.status_text();
        let lines = self.transcript.lines(self.wrap_width, self.spinner_frame / 8);
        let scroll_top = self.list.scroll_top() as usize;
        let max_scroll = self.list.max_scroll_top() as usize;

        self.terminal.draw(|f| {
            let chunks = Self::chunks(f.area());

            f.render_widget(
                HeaderBar {
                    title: "Chatscroll",
                    session: session_id,
                    mode,
                },
                chunks[0],
            );
            f.render_widget(
                StatusBar {
                    status_text: &status_text,
                    is_busy,
                },
                chunks[1],
            );
            Self::render_transcript(f, chunks[2], lines, scroll_top, max_scroll);
            f.render_widget(HelpBar, chunks[3]);
        })?;
        Ok(())
    }

    fn render_transcript(
        f: &mut Frame,
        area: Rect,
        lines: Vec<Line<'static>>,
        scroll_top: usize,
        max_scroll: usize,
    ) {
        let block = Self::transcript_block();
        let inner = block.inner(area);
        f.render_widget(block, area);

        let visible: Vec<Line> = lines
            .into_iter()
            .skip(scroll_top)
            .take(inner.height as usize)
            .collect();
        f.render_widget(Paragraph::new(visible), inner);

        if max_scroll > 0 {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");
            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll_top);
            f.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop_feed();
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            crossterm::event::DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}
