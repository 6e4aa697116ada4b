//! Coalesces scroll requests into at most one action per animation frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
    /// Jump without animation. Used for the first scroll of a session.
    Instant,
}

impl ScrollBehavior {
    /// Instant wins: an initial load must never degrade to an animated scroll.
    fn merge(self, other: ScrollBehavior) -> ScrollBehavior {
        match (self, other) {
            (ScrollBehavior::Smooth, ScrollBehavior::Smooth) => ScrollBehavior::Smooth,
            _ => ScrollBehavior::Instant,
        }
    }
}

/// Why a scroll was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollReason {
    MessageAppended,
    StreamingDelta,
    ToolNotificationAdded,
    ToolNotificationRemoved,
    TypingIndicatorToggled,
    SessionLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameId(u64);

impl FrameId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Host hook for "call me back on the next animation frame".
///
/// The host later hands the id back to `AutoScrollEngine::on_animation_frame`.
pub trait FrameScheduler {
    fn request_frame(&mut self, id: FrameId);
    fn cancel_frame(&mut self, id: FrameId);
}

/// Queue-backed frame scheduler. Clones share the queue, so the host keeps a
/// clone and drains it once per frame.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    inner: Rc<RefCell<VecDeque<FrameId>>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames that should fire now, oldest first.
    pub fn take_due(&self) -> Vec<FrameId> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, id: FrameId) {
        self.inner.borrow_mut().push_back(id);
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.inner.borrow_mut().retain(|queued| *queued != id);
    }
}

/// The single coalesced action waiting for its frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingScroll {
    pub frame: FrameId,
    pub behavior: ScrollBehavior,
    pub reasons: Vec<ScrollReason>,
}

pub struct ScrollScheduler<F> {
    frames: F,
    next_frame: u64,
    pending: Option<PendingScroll>,
}

impl<F: FrameScheduler> ScrollScheduler<F> {
    pub fn new(frames: F) -> Self {
        Self {
            frames,
            next_frame: 0,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&PendingScroll> {
        self.pending.as_ref()
    }

    /// Ask for a scroll on the next frame. Calls before that frame fires fold
    /// into the already pending action; only the first requests a frame.
    pub fn request_scroll(&mut self, reason: ScrollReason, behavior: ScrollBehavior) -> FrameId {
        if let Some(pending) = self.pending.as_mut() {
            pending.behavior = pending.behavior.merge(behavior);
            pending.reasons.push(reason);
            debug!(
                frame = pending.frame.get(),
                ?reason,
                coalesced = pending.reasons.len(),
                "coalesced scroll request"
            );
            return pending.frame;
        }

        self.next_frame += 1;
        let frame = FrameId(self.next_frame);
        self.frames.request_frame(frame);
        self.pending = Some(PendingScroll {
            frame,
            behavior,
            reasons: vec![reason],
        });
        debug!(frame = frame.get(), ?reason, ?behavior, "scheduled scroll");
        frame
    }

    /// Claim the pending action if `frame` is the one it waits for.
    /// Cancelled or superseded frames yield nothing.
    pub fn take_due(&mut self, frame: FrameId) -> Option<PendingScroll> {
        if self.pending.as_ref().map(|p| p.frame) == Some(frame) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Drop the pending action and release its frame.
    pub fn cancel(&mut self) -> Option<PendingScroll> {
        let pending = self.pending.take()?;
        self.frames.cancel_frame(pending.frame);
        debug!(frame = pending.frame.get(), "cancelled pending scroll");
        Some(pending)
    }
}
