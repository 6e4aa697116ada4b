//! The end-of-list anchor the engine scrolls to.
//!
//! Targeting the last *message* node stalls short of the bottom whenever that
//! message is still growing or is followed by tool/typing rows. The sentinel is
//! a zero-height node the rendering layer keeps as the last child on every
//! render, so "scroll the sentinel into view" always means "the true bottom".

use serde::Serialize;

use super::container::ScrollContainer;

/// Marker carried by the scroll container.
pub const CONTAINER_MARKER: &str = "message-list-scroll-container";

/// Marker carried by the sentinel node.
pub const SENTINEL_MARKER: &str = "message-list-scroll-sentinel";

/// Placement violations. These are configuration errors in the view layer:
/// the engine logs them and skips the scroll for that cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SentinelError {
    #[error("scroll sentinel is not rendered in the container")]
    Missing,

    #[error("scroll sentinel rendered at child {index} of {child_count}, expected last")]
    Misplaced { index: usize, child_count: usize },
}

pub struct SentinelTarget;

impl SentinelTarget {
    pub fn is_sentinel(marker: Option<&str>) -> bool {
        marker == Some(SENTINEL_MARKER)
    }

    /// Check that the sentinel is the structurally last child of `container`.
    pub fn verify<C: ScrollContainer + ?Sized>(container: &C) -> Result<(), SentinelError> {
        let child_count = container.child_count();
        let Some(last) = child_count.checked_sub(1) else {
            return Err(SentinelError::Missing);
        };

        if Self::is_sentinel(container.child_marker(last)) {
            return Ok(());
        }

        match (0..last).find(|&i| Self::is_sentinel(container.child_marker(i))) {
            Some(index) => Err(SentinelError::Misplaced { index, child_count }),
            None => Err(SentinelError::Missing),
        }
    }
}
