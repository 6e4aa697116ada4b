//! Scroll metrics snapshot read from a container.

use serde::Serialize;

use super::container::ScrollContainer;

/// Scroll geometry at one instant. All fields are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top: non_negative(scroll_top),
            scroll_height: non_negative(scroll_height),
            client_height: non_negative(client_height),
        }
    }

    /// Gap between the bottom of the viewport and the end of the content.
    ///
    /// A container that has not been laid out yet (`client_height == 0`)
    /// reports 0, i.e. "at bottom".
    pub fn distance_from_bottom(&self) -> f64 {
        if !self.is_laid_out() {
            return 0.0;
        }
        (self.scroll_height - self.scroll_top - self.client_height).max(0.0)
    }

    pub fn is_laid_out(&self) -> bool {
        self.client_height > 0.0
    }

    /// Whether the content overflows the viewport at all.
    pub fn is_scrollable(&self) -> bool {
        self.is_laid_out() && self.scroll_height > self.client_height
    }
}

/// Read the current metrics of `container`. Never cached.
pub fn read<C: ScrollContainer + ?Sized>(container: &C) -> ScrollMetrics {
    ScrollMetrics::new(
        container.scroll_top(),
        container.scroll_height(),
        container.client_height(),
    )
}
