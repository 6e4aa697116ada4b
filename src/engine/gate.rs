//! Auto-follow state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::intent::ScrollIntent;

/// Distance from bottom, inclusive, within which a user scroll resumes
/// following.
pub const DEFAULT_FOLLOW_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoScrollState {
    pub enabled: bool,
    pub has_completed_initial_scroll: bool,
}

impl AutoScrollState {
    /// State for a freshly mounted view or a newly switched session.
    pub fn fresh() -> Self {
        Self {
            enabled: true,
            has_completed_initial_scroll: false,
        }
    }

    pub fn mode(&self) -> FollowMode {
        if self.enabled {
            FollowMode::Following
        } else {
            FollowMode::Paused
        }
    }
}

impl Default for AutoScrollState {
    fn default() -> Self {
        Self::fresh()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowMode {
    Following,
    Paused,
}

impl fmt::Display for FollowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowMode::Following => write!(f, "Following"),
            FollowMode::Paused => write!(f, "Paused"),
        }
    }
}

/// Transition for one classified scroll event.
///
/// Only user scrolls move the gate; our own scrolls never do.
pub fn next(
    state: AutoScrollState,
    intent: ScrollIntent,
    distance_from_bottom: f64,
    threshold: f64,
) -> AutoScrollState {
    match intent {
        ScrollIntent::Programmatic => state,
        ScrollIntent::User => AutoScrollState {
            enabled: distance_from_bottom <= threshold,
            ..state
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = DEFAULT_FOLLOW_THRESHOLD;

    fn paused() -> AutoScrollState {
        AutoScrollState {
            enabled: false,
            has_completed_initial_scroll: true,
        }
    }

    #[test]
    fn test_user_near_bottom_follows() {
        for distance in [0.0, 1.0, 50.0, 99.9, 100.0] {
            for start in [AutoScrollState::fresh(), paused()] {
                let state = next(start, ScrollIntent::User, distance, T);
                assert_eq!(state.mode(), FollowMode::Following, "distance {distance}");
            }
        }
    }

    #[test]
    fn test_user_far_from_bottom_pauses() {
        for distance in [100.01, 101.0, 300.0, 10_000.0] {
            for start in [AutoScrollState::fresh(), paused()] {
                let state = next(start, ScrollIntent::User, distance, T);
                assert_eq!(state.mode(), FollowMode::Paused, "distance {distance}");
            }
        }
    }

    #[test]
    fn test_programmatic_never_moves_gate() {
        for distance in [0.0, 100.0, 5_000.0] {
            for start in [AutoScrollState::fresh(), paused()] {
                assert_eq!(next(start, ScrollIntent::Programmatic, distance, T), start);
            }
        }
    }

    #[test]
    fn test_initial_scroll_flag_preserved() {
        let state = next(paused(), ScrollIntent::User, 0.0, T);
        assert!(state.has_completed_initial_scroll);
    }

    #[test]
    fn test_custom_threshold() {
        let state = next(AutoScrollState::fresh(), ScrollIntent::User, 30.0, 24.0);
        assert_eq!(state.mode(), FollowMode::Paused);
    }
}
