//! Auto-scroll coordination engine
//!
//! Decides, on every content change, whether the message list follows the
//! newest content or stays where a reading user left it.
//!
//! Flow: content change -> `ScrollScheduler` (coalesce, defer to next frame)
//! -> gate check -> arm `IntentClassifier` -> scroll the sentinel into view ->
//! host emits a scroll event -> classifier tags it -> user scrolls move the gate.

pub mod clock;
pub mod container;
pub mod events;
pub mod gate;
pub mod intent;
pub mod metrics;
pub mod scheduler;
pub mod sentinel;
pub mod session;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use clock::{Clock, ManualClock, SystemClock};
pub use container::ScrollContainer;
pub use events::{EventHub, ScrollEvent, Subscription, SubscriptionId};
pub use gate::{AutoScrollState, FollowMode, DEFAULT_FOLLOW_THRESHOLD};
pub use intent::{IntentClassifier, ScrollIntent, DEFAULT_PROGRAMMATIC_WINDOW};
pub use metrics::ScrollMetrics;
pub use scheduler::{
    FrameId, FrameQueue, FrameScheduler, PendingScroll, ScrollBehavior, ScrollReason,
    ScrollScheduler,
};
pub use sentinel::{SentinelError, SentinelTarget, CONTAINER_MARKER, SENTINEL_MARKER};
pub use session::{SessionContext, SessionId, SessionResetCoordinator, SessionUpdate};

use crate::ChatScrollConfig;

/// Tunables the engine reads on every decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub follow_threshold: f64,
    pub programmatic_window: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            follow_threshold: DEFAULT_FOLLOW_THRESHOLD,
            programmatic_window: DEFAULT_PROGRAMMATIC_WINDOW,
        }
    }
}

impl From<&ChatScrollConfig> for EngineSettings {
    fn from(config: &ChatScrollConfig) -> Self {
        Self {
            follow_threshold: config.follow_threshold,
            programmatic_window: Duration::from_millis(config.programmatic_window_ms),
        }
    }
}

/// Content-change notifications from the message store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentChange {
    MessageAppended,
    StreamingDelta,
    ToolNotificationAdded,
    ToolNotificationRemoved,
    TypingIndicatorToggled,
}

impl ContentChange {
    pub fn reason(self) -> ScrollReason {
        match self {
            ContentChange::MessageAppended => ScrollReason::MessageAppended,
            ContentChange::StreamingDelta => ScrollReason::StreamingDelta,
            ContentChange::ToolNotificationAdded => ScrollReason::ToolNotificationAdded,
            ContentChange::ToolNotificationRemoved => ScrollReason::ToolNotificationRemoved,
            ContentChange::TypingIndicatorToggled => ScrollReason::TypingIndicatorToggled,
        }
    }
}

/// Why a due frame did not scroll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Sentinel(SentinelError),
    NotScrollable,
}

/// What happened when a frame handed to `on_animation_frame` fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameOutcome {
    Scrolled {
        behavior: ScrollBehavior,
        reasons: Vec<ScrollReason>,
    },
    /// The user is reading further up.
    Paused { reasons: Vec<ScrollReason> },
    Skipped { reason: SkipReason },
    /// The frame was cancelled or superseded.
    Stale,
    Unmounted,
}

impl FrameOutcome {
    pub fn scrolled(&self) -> bool {
        matches!(self, FrameOutcome::Scrolled { .. })
    }
}

/// The engine attached to one mounted message list view.
pub struct AutoScrollEngine<C: Clock = SystemClock, F: FrameScheduler = FrameQueue> {
    settings: EngineSettings,
    state: AutoScrollState,
    classifier: IntentClassifier<C>,
    scheduler: ScrollScheduler<F>,
    session: SessionResetCoordinator,
    subscription: Option<Subscription<ScrollEvent>>,
    mounted: bool,
}

impl<C: Clock, F: FrameScheduler> AutoScrollEngine<C, F> {
    /// Create the engine for a freshly mounted view.
    pub fn mount(settings: EngineSettings, clock: C, frames: F) -> Self {
        debug!(
            threshold = settings.follow_threshold,
            window_ms = settings.programmatic_window.as_millis() as u64,
            "auto-scroll engine mounted"
        );
        Self {
            settings,
            state: AutoScrollState::fresh(),
            classifier: IntentClassifier::new(clock, settings.programmatic_window),
            scheduler: ScrollScheduler::new(frames),
            session: SessionResetCoordinator::new(),
            subscription: None,
            mounted: true,
        }
    }

    /// Listen to the container's scroll events. Replaces any earlier
    /// subscription, which is dropped and thereby unsubscribed.
    pub fn attach(&mut self, subscription: Subscription<ScrollEvent>) {
        self.subscription = Some(subscription);
    }

    pub fn state(&self) -> AutoScrollState {
        self.state
    }

    pub fn mode(&self) -> FollowMode {
        self.state.mode()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn session_context(&self) -> &SessionContext {
        self.session.context()
    }

    pub fn pending_scroll(&self) -> Option<&PendingScroll> {
        self.scheduler.pending()
    }

    pub fn classifier(&self) -> &IntentClassifier<C> {
        &self.classifier
    }

    /// Feed the current session id and message count after a view update.
    pub fn on_update(&mut self, session_id: Option<&str>, message_count: usize) -> SessionUpdate {
        if !self.mounted {
            return SessionUpdate::Unchanged;
        }

        let update = self.session.observe(session_id, message_count);
        match &update {
            SessionUpdate::Started { .. } | SessionUpdate::Switched { .. } => {
                self.reset_for_session();
            }
            SessionUpdate::Appended { .. } => {
                self.request(ScrollReason::MessageAppended);
            }
            SessionUpdate::Truncated { .. } | SessionUpdate::Unchanged => {}
        }
        update
    }

    /// A content change happened in the current update cycle.
    pub fn on_content_change(&mut self, change: ContentChange) -> Option<FrameId> {
        self.request(change.reason())
    }

    /// Handle one raw scroll event from the container.
    pub fn on_scroll_event<S: ScrollContainer + ?Sized>(
        &mut self,
        container: &S,
    ) -> Option<ScrollIntent> {
        if !self.mounted {
            return None;
        }

        let intent = self.classifier.classify();
        let distance = metrics::read(container).distance_from_bottom();

        // Until the session's first scroll lands, position changes come from
        // layout settling, not from someone reading.
        if !self.state.has_completed_initial_scroll {
            debug!(?intent, distance, "scroll before initial scroll, gate untouched");
            return Some(intent);
        }

        let previous = self.state;
        self.state = gate::next(
            self.state,
            intent,
            distance,
            self.settings.follow_threshold,
        );
        if previous.enabled != self.state.enabled {
            debug!(mode = %self.state.mode(), distance, "auto-follow changed");
        }
        Some(intent)
    }

    /// Drain and handle every queued event from the attached subscription.
    pub fn pump_scroll_events<S: ScrollContainer + ?Sized>(&mut self, container: &S) -> usize {
        let mut handled = 0;
        while let Some(_event) = self.subscription.as_mut().and_then(Subscription::try_next) {
            self.on_scroll_event(container);
            handled += 1;
        }
        handled
    }

    /// Run the coalesced action scheduled for `frame`, if it is still current.
    pub fn on_animation_frame<S: ScrollContainer + ?Sized>(
        &mut self,
        frame: FrameId,
        container: &mut S,
    ) -> FrameOutcome {
        if !self.mounted {
            return FrameOutcome::Unmounted;
        }

        self.classifier.expire();
        // User scrolls queued before this frame must be judged before we move.
        self.pump_scroll_events(&*container);

        let Some(pending) = self.scheduler.take_due(frame) else {
            return FrameOutcome::Stale;
        };

        if !self.state.enabled {
            debug!(frame = frame.get(), reasons = ?pending.reasons, "auto-follow paused, not scrolling");
            return FrameOutcome::Paused {
                reasons: pending.reasons,
            };
        }

        if let Err(err) = SentinelTarget::verify(&*container) {
            warn!(error = %err, container = container.marker(), "skipping auto-scroll");
            return FrameOutcome::Skipped {
                reason: SkipReason::Sentinel(err),
            };
        }

        let metrics = metrics::read(&*container);
        if !metrics.is_scrollable() {
            debug!(?metrics, "container has no overflow, skipping auto-scroll");
            return FrameOutcome::Skipped {
                reason: SkipReason::NotScrollable,
            };
        }

        self.classifier.mark_next_scroll_programmatic();
        container.scroll_sentinel_into_view(pending.behavior);
        self.state.has_completed_initial_scroll = true;
        debug!(
            frame = frame.get(),
            behavior = ?pending.behavior,
            reasons = ?pending.reasons,
            "scrolled sentinel into view"
        );

        FrameOutcome::Scrolled {
            behavior: pending.behavior,
            reasons: pending.reasons,
        }
    }

    /// Tear down: cancel pending work, drop the subscription, forget the
    /// session. The engine ignores every later call.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.scheduler.cancel();
        self.classifier.disarm();
        self.subscription = None;
        self.session.forget();
        self.mounted = false;
        debug!("auto-scroll engine unmounted");
    }

    fn reset_for_session(&mut self) {
        self.scheduler.cancel();
        self.classifier.disarm();
        self.state = AutoScrollState::fresh();
        self.request(ScrollReason::SessionLoaded);
    }

    fn request(&mut self, reason: ScrollReason) -> Option<FrameId> {
        if !self.mounted {
            return None;
        }
        let behavior = if self.state.has_completed_initial_scroll {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        };
        Some(self.scheduler.request_scroll(reason, behavior))
    }
}

impl<C: Clock, F: FrameScheduler> Drop for AutoScrollEngine<C, F> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::VirtualList;
    use pretty_assertions::assert_eq;

    struct Harness {
        clock: ManualClock,
        frames: FrameQueue,
        list: VirtualList,
        engine: AutoScrollEngine<ManualClock, FrameQueue>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = ManualClock::new();
            let frames = FrameQueue::new();
            let mut list = VirtualList::new(500.0);
            let mut engine =
                AutoScrollEngine::mount(EngineSettings::default(), clock.clone(), frames.clone());
            engine.attach(list.subscribe());
            Self {
                clock,
                frames,
                list,
                engine,
            }
        }

        fn fire_frames(&mut self) -> Vec<FrameOutcome> {
            let outcomes = self
                .frames
                .take_due()
                .into_iter()
                .map(|frame| self.engine.on_animation_frame(frame, &mut self.list))
                .collect();
            self.engine.pump_scroll_events(&self.list);
            outcomes
        }

        /// Session "a" loaded with 1000px of content, initial scroll done.
        fn loaded() -> Self {
            let mut h = Self::new();
            h.list.render(&[400.0, 600.0]);
            h.engine.on_update(Some("a"), 2);
            let outcomes = h.fire_frames();
            assert!(outcomes[0].scrolled());
            h.list.take_scroll_calls();
            h
        }
    }

    #[test]
    fn test_initial_load_scrolls_instantly() {
        let mut h = Harness::new();
        h.list.render(&[400.0, 600.0]);
        h.engine.on_update(Some("a"), 2);

        let outcomes = h.fire_frames();
        assert_eq!(
            outcomes,
            vec![FrameOutcome::Scrolled {
                behavior: ScrollBehavior::Instant,
                reasons: vec![ScrollReason::SessionLoaded],
            }]
        );
        assert_eq!(h.list.scroll_top(), 500.0);
        assert!(h.engine.state().has_completed_initial_scroll);
        assert_eq!(h.engine.mode(), FollowMode::Following);
    }

    #[test]
    fn test_own_scroll_event_is_programmatic() {
        let mut h = Harness::loaded();
        h.list.render(&[400.0, 600.0, 300.0]);
        h.engine.on_update(Some("a"), 3);
        for frame in h.frames.take_due() {
            h.engine.on_animation_frame(frame, &mut h.list);
        }

        assert!(h.engine.classifier().is_armed());
        h.engine.pump_scroll_events(&h.list);
        assert!(!h.engine.classifier().is_armed());
        assert_eq!(h.engine.mode(), FollowMode::Following);
    }

    #[test]
    fn test_user_scroll_pauses_and_resumes() {
        let mut h = Harness::loaded();

        h.list.user_scroll_to(200.0);
        h.engine.pump_scroll_events(&h.list);
        assert_eq!(h.engine.mode(), FollowMode::Paused);

        h.list.user_scroll_to(400.0);
        h.engine.pump_scroll_events(&h.list);
        assert_eq!(h.engine.mode(), FollowMode::Following);
    }

    #[test]
    fn test_user_scroll_queued_before_frame_wins() {
        let mut h = Harness::loaded();
        h.list.render(&[400.0, 600.0, 300.0]);
        h.engine.on_content_change(ContentChange::MessageAppended);
        // The user scrolls away before the frame fires and before the event
        // has been pumped.
        h.list.user_scroll_to(100.0);

        let outcomes = h.fire_frames();
        assert!(matches!(outcomes[0], FrameOutcome::Paused { .. }));
        assert!(h.list.scroll_calls().is_empty());
    }

    #[test]
    fn test_unchanged_position_flag_expires() {
        let mut h = Harness::loaded();
        // Already at the bottom: the scroll call fires no event.
        h.engine.on_content_change(ContentChange::StreamingDelta);
        let outcomes = h.fire_frames();
        assert!(outcomes[0].scrolled());
        assert!(h.engine.classifier().is_armed());

        h.clock.advance(Duration::from_millis(60));
        h.list.user_scroll_to(100.0);
        h.engine.pump_scroll_events(&h.list);
        assert_eq!(h.engine.mode(), FollowMode::Paused);
    }

    #[test]
    fn test_misplaced_sentinel_skips_cycle() {
        use crate::host::Node;

        let mut h = Harness::loaded();
        h.list.render_nodes(vec![
            Node::message(400.0),
            Node::sentinel(),
            Node::message(900.0),
        ]);
        h.engine.on_content_change(ContentChange::MessageAppended);

        let outcomes = h.fire_frames();
        assert_eq!(
            outcomes,
            vec![FrameOutcome::Skipped {
                reason: SkipReason::Sentinel(SentinelError::Misplaced {
                    index: 1,
                    child_count: 3
                }),
            }]
        );
        assert!(h.list.scroll_calls().is_empty());
        assert_eq!(h.engine.mode(), FollowMode::Following);
    }

    #[test]
    fn test_short_content_skips_without_pausing() {
        let mut h = Harness::new();
        h.list.render(&[120.0]);
        h.engine.on_update(Some("a"), 1);

        let outcomes = h.fire_frames();
        assert_eq!(
            outcomes,
            vec![FrameOutcome::Skipped {
                reason: SkipReason::NotScrollable
            }]
        );
        assert_eq!(h.engine.mode(), FollowMode::Following);
        assert!(!h.engine.state().has_completed_initial_scroll);

        // Once content overflows, the first scroll is still the instant one.
        h.list.render(&[120.0, 900.0]);
        h.engine.on_update(Some("a"), 2);
        let outcomes = h.fire_frames();
        assert_eq!(
            outcomes,
            vec![FrameOutcome::Scrolled {
                behavior: ScrollBehavior::Instant,
                reasons: vec![ScrollReason::MessageAppended],
            }]
        );
    }

    #[test]
    fn test_session_switch_cancels_pending_scroll() {
        let mut h = Harness::loaded();
        h.engine.on_content_change(ContentChange::StreamingDelta);
        let stale = h.engine.pending_scroll().unwrap().frame;

        h.list.render(&[800.0, 800.0]);
        h.engine.on_update(Some("b"), 2);

        assert_eq!(h.engine.on_animation_frame(stale, &mut h.list), FrameOutcome::Stale);
        let outcomes = h.fire_frames();
        assert_eq!(
            outcomes,
            vec![FrameOutcome::Scrolled {
                behavior: ScrollBehavior::Instant,
                reasons: vec![ScrollReason::SessionLoaded],
            }]
        );
    }

    #[test]
    fn test_unmount_drops_everything() {
        let mut h = Harness::loaded();
        h.engine.on_content_change(ContentChange::MessageAppended);
        assert_eq!(h.frames.len(), 1);

        h.engine.unmount();
        assert!(!h.engine.is_mounted());
        assert!(h.frames.is_empty());
        assert_eq!(h.list.subscriber_count(), 0);
        assert_eq!(h.engine.on_content_change(ContentChange::StreamingDelta), None);
        assert_eq!(h.engine.on_scroll_event(&h.list), None);
        assert_eq!(
            h.engine.on_update(Some("b"), 1),
            SessionUpdate::Unchanged
        );
    }

    #[test]
    fn test_settings_from_config() {
        let config = ChatScrollConfig::default()
            .with_follow_threshold(24.0)
            .with_programmatic_window_ms(80);
        let settings = EngineSettings::from(&config);
        assert_eq!(settings.follow_threshold, 24.0);
        assert_eq!(settings.programmatic_window, Duration::from_millis(80));
    }

    #[test]
    fn test_frame_outcome_serializes_tagged() {
        let outcome = FrameOutcome::Scrolled {
            behavior: ScrollBehavior::Smooth,
            reasons: vec![ScrollReason::StreamingDelta],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "scrolled");
        assert_eq!(json["behavior"], "smooth");
        assert_eq!(json["reasons"][0], "streaming_delta");
    }
}
