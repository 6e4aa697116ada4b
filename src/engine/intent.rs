//! Classifies raw scroll events as user-driven or self-inflicted.
//!
//! Scroll events carry no cause, so the only signal is a short-lived flag the
//! engine arms right before it scrolls. The first event seen while armed is
//! ours; everything else belongs to the user.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::clock::Clock;

/// One ~16ms frame plus margin for the host to dispatch the event.
pub const DEFAULT_PROGRAMMATIC_WINDOW: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollIntent {
    User,
    Programmatic,
}

pub struct IntentClassifier<C> {
    clock: C,
    window: Duration,
    armed_until: Option<Instant>,
}

impl<C: Clock> IntentClassifier<C> {
    pub fn new(clock: C, window: Duration) -> Self {
        Self {
            clock,
            window,
            armed_until: None,
        }
    }

    /// Arm the flag: the next scroll event within the window is programmatic.
    pub fn mark_next_scroll_programmatic(&mut self) {
        self.armed_until = Some(self.clock.now() + self.window);
    }

    /// Tag one observed scroll event. Always disarms.
    pub fn classify(&mut self) -> ScrollIntent {
        let now = self.clock.now();
        let intent = match self.armed_until.take() {
            Some(deadline) if now <= deadline => ScrollIntent::Programmatic,
            _ => ScrollIntent::User,
        };
        trace!(?intent, "classified scroll event");
        intent
    }

    /// Clear the flag if its window has elapsed without an event (the host
    /// fires nothing when a scroll call does not move the position).
    /// Returns true if a stale flag was cleared.
    pub fn expire(&mut self) -> bool {
        match self.armed_until {
            Some(deadline) if self.clock.now() > deadline => {
                self.armed_until = None;
                trace!("programmatic scroll flag expired without an event");
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed_until
            .is_some_and(|deadline| self.clock.now() <= deadline)
    }

    pub fn disarm(&mut self) {
        self.armed_until = None;
    }
}
