//! Integration tests for the auto-scroll engine

use chatscroll::engine::{
    AutoScrollEngine, ContentChange, EngineSettings, FollowMode, FrameOutcome, FrameQueue,
    ManualClock, ScrollBehavior, ScrollContainer, SENTINEL_MARKER,
};
use chatscroll::host::VirtualList;
use chatscroll::replay::{self, Script};
use chatscroll::{ChatScrollConfig, ChatScrollError};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

struct View {
    frames: FrameQueue,
    list: VirtualList,
    engine: AutoScrollEngine<ManualClock, FrameQueue>,
    messages: usize,
}

impl View {
    /// A mounted view showing session "a" with 1000px of content in a 500px
    /// viewport, already scrolled to the bottom by its initial load.
    fn mounted() -> Self {
        let frames = FrameQueue::new();
        let mut list = VirtualList::new(500.0);
        let mut engine = AutoScrollEngine::mount(
            EngineSettings::default(),
            ManualClock::new(),
            frames.clone(),
        );
        engine.attach(list.subscribe());

        let mut view = Self {
            frames,
            list,
            engine,
            messages: 0,
        };
        view.show_messages("a", &[250.0, 250.0, 250.0, 250.0]);
        view.next_frame();
        view.list.take_scroll_calls();
        view
    }

    fn show_messages(&mut self, session: &str, heights: &[f64]) {
        self.messages = heights.len();
        self.list.render(heights);
        self.engine.on_update(Some(session), self.messages);
    }

    fn user_scroll_to(&mut self, top: f64) {
        self.list.user_scroll_to(top);
        self.engine.pump_scroll_events(&self.list);
    }

    fn next_frame(&mut self) -> Vec<FrameOutcome> {
        let outcomes = self
            .frames
            .take_due()
            .into_iter()
            .map(|frame| self.engine.on_animation_frame(frame, &mut self.list))
            .collect();
        self.engine.pump_scroll_events(&self.list);
        outcomes
    }

    /// Two new messages, a tool notification and a streaming delta landing in
    /// one update cycle.
    fn burst(&mut self) {
        let mut heights: Vec<f64> = self.list.children()[..self.messages]
            .iter()
            .map(|node| node.height)
            .collect();
        heights.extend([120.0, 80.0, 24.0]);
        self.list.render(&heights);

        self.engine.on_content_change(ContentChange::MessageAppended);
        self.engine.on_content_change(ContentChange::MessageAppended);
        self.engine
            .on_content_change(ContentChange::ToolNotificationAdded);
        self.engine.on_content_change(ContentChange::StreamingDelta);
        self.messages += 2;
        self.engine.on_update(Some("a"), self.messages);
    }
}

/// Scrolled 300px up from the bottom: paused, and new messages leave the
/// position alone.
#[test]
fn test_reading_user_is_not_disturbed() {
    let mut view = View::mounted();
    assert_eq!(view.list.scroll_height(), 1000.0);

    view.user_scroll_to(200.0);
    assert_eq!(view.engine.mode(), FollowMode::Paused);

    view.list.render(&[250.0, 250.0, 250.0, 250.0, 90.0]);
    view.engine.on_update(Some("a"), 5);
    let outcomes = view.next_frame();

    assert!(matches!(outcomes[..], [FrameOutcome::Paused { .. }]));
    assert!(view.list.scroll_calls().is_empty());
    assert_eq!(view.list.scroll_top(), 200.0);
}

/// Within 50px of the bottom: following, and the next message scrolls
/// smoothly to the sentinel.
#[test]
fn test_near_bottom_user_keeps_following() {
    let mut view = View::mounted();

    view.user_scroll_to(450.0);
    assert_eq!(view.engine.mode(), FollowMode::Following);

    view.list.render(&[250.0, 250.0, 250.0, 250.0, 90.0]);
    view.engine.on_update(Some("a"), 5);
    view.next_frame();

    let calls = view.list.take_scroll_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target, SENTINEL_MARKER);
    assert_eq!(calls[0].behavior, ScrollBehavior::Smooth);
    assert_eq!(calls[0].from, 450.0);
    assert_eq!(calls[0].to, 590.0);
    assert_eq!(view.engine.mode(), FollowMode::Following);
}

#[test]
fn test_threshold_is_inclusive() {
    let mut view = View::mounted();

    view.user_scroll_to(400.0); // exactly 100 from the bottom
    assert_eq!(view.engine.mode(), FollowMode::Following);

    view.user_scroll_to(399.0);
    assert_eq!(view.engine.mode(), FollowMode::Paused);
}

#[test]
fn test_burst_while_paused_scrolls_nothing() {
    let mut view = View::mounted();
    view.user_scroll_to(100.0);

    view.burst();
    assert_eq!(view.frames.len(), 1);
    view.next_frame();

    assert!(view.list.scroll_calls().is_empty());
    assert_eq!(view.list.scroll_top(), 100.0);
}

#[test]
fn test_burst_while_following_scrolls_once() {
    let mut view = View::mounted();

    view.burst();
    assert_eq!(view.frames.len(), 1);
    let outcomes = view.next_frame();

    assert_eq!(outcomes.len(), 1);
    let calls = view.list.take_scroll_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target, SENTINEL_MARKER);
    assert_eq!(view.list.scroll_top(), view.list.max_scroll_top());
    // The engine's own scroll event did not pause it.
    assert_eq!(view.engine.mode(), FollowMode::Following);
}

#[test]
fn test_session_switch_while_paused_resets() {
    let mut view = View::mounted();
    view.user_scroll_to(0.0);
    assert_eq!(view.engine.mode(), FollowMode::Paused);

    view.show_messages("b", &[300.0, 300.0, 300.0, 300.0, 300.0]);
    assert_eq!(view.engine.mode(), FollowMode::Following);
    view.next_frame();

    let calls = view.list.take_scroll_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].behavior, ScrollBehavior::Instant);
    assert_eq!(view.list.scroll_top(), 1000.0);
    assert_eq!(
        view.engine.session_context().session_id.as_deref(),
        Some("b")
    );
    assert_eq!(view.engine.session_context().previous_message_count, 5);
}

#[test]
fn test_sentinel_survives_every_render() {
    let mut view = View::mounted();
    for count in [0usize, 1, 12] {
        view.list.render(&vec![60.0; count]);
        let last = view.list.child_count() - 1;
        assert_eq!(view.list.child_marker(last), Some(SENTINEL_MARKER));
    }
}

#[test]
fn test_config_defaults_and_builder() {
    let config = ChatScrollConfig::default();
    assert_eq!(config.follow_threshold, 100.0);
    assert_eq!(config.programmatic_window_ms, 50);
    assert_eq!(config.frame_interval_ms, 16);
    assert!(config.log_file.is_none());

    let config = config
        .with_follow_threshold(40.0)
        .with_frame_interval_ms(33);
    assert_eq!(config.follow_threshold, 40.0);
    assert_eq!(config.frame_interval().as_millis(), 33);
}

#[test]
fn test_config_load_partial_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "follow_threshold = 64.0\n").unwrap();

    let config = ChatScrollConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.follow_threshold, 64.0);
    assert_eq!(config.programmatic_window_ms, 50);
}

#[test]
fn test_config_rejects_invalid_values() {
    for text in [
        "follow_threshold = -1.0",
        "programmatic_window_ms = 0",
        "frame_interval_ms = 0",
    ] {
        match ChatScrollConfig::from_toml_str(text) {
            Err(ChatScrollError::Config(_)) => {}
            other => panic!("Expected Config error for {text:?}, got {other:?}"),
        }
    }

    assert!(matches!(
        ChatScrollConfig::from_toml_str("follow_threshold = \"far\""),
        Err(ChatScrollError::Toml(_))
    ));
}

#[test]
fn test_config_missing_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nope.toml");
    assert!(matches!(
        ChatScrollConfig::load_or_default(Some(&path)),
        Err(ChatScrollError::Io(_))
    ));
}

#[test]
fn test_replay_script_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"# reader pauses, session switch brings them back
{{"step":"resize","client_height":500}}
{{"step":"render","heights":[500,500]}}
{{"step":"session","id":"a","messages":2}}
{{"step":"frame"}}
{{"step":"user_scroll","to":100}}
{{"step":"content","change":"typing_indicator_toggled"}}
{{"step":"frame"}}
{{"step":"render","heights":[700,700]}}
{{"step":"session","id":"b","messages":2}}
{{"step":"frame"}}"#
    )
    .unwrap();

    let script = Script::load(file.path()).unwrap();
    let report = replay::run(&script, &ChatScrollConfig::default());

    assert_eq!(report.outcomes.len(), 3);
    assert!(report.outcomes[0].scrolled());
    assert!(matches!(report.outcomes[1], FrameOutcome::Paused { .. }));
    assert!(report.outcomes[2].scrolled());
    assert_eq!(report.scroll_calls.len(), 2);
    assert_eq!(report.final_mode, FollowMode::Following);
    assert_eq!(report.final_scroll_top, 900.0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["final_mode"], "following");
    assert_eq!(json["scroll_calls"][1]["behavior"], "instant");
}
