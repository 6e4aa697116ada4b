//! Host-side view of the scroll container.
//!
//! The engine never owns the container; the view layer hands it a borrow on
//! every call so measurements are always taken against the live layout.

use super::scheduler::ScrollBehavior;
use super::sentinel::CONTAINER_MARKER;

/// Everything the engine needs to read from, and do to, a scrollable list.
pub trait ScrollContainer {
    /// Stable marker identifying the container to external test suites.
    fn marker(&self) -> &str {
        CONTAINER_MARKER
    }

    fn scroll_top(&self) -> f64;

    fn scroll_height(&self) -> f64;

    fn client_height(&self) -> f64;

    /// Number of structural children currently rendered.
    fn child_count(&self) -> usize;

    /// Marker of the child at `index`, if it carries one.
    fn child_marker(&self, index: usize) -> Option<&str>;

    /// Bring the sentinel into view. Only called after the sentinel has been
    /// verified as the last child.
    fn scroll_sentinel_into_view(&mut self, behavior: ScrollBehavior);
}
