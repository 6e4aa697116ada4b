//! In-memory message list with browser-like scroll semantics.
//!
//! Children are stacked vertically by height. Changing the scroll position,
//! whether by the user or by the engine, emits a `ScrollEvent` only when the
//! position actually moves.

use serde::Serialize;

use crate::engine::{
    EventHub, ScrollBehavior, ScrollContainer, ScrollEvent, Subscription, SENTINEL_MARKER,
};

/// One structural child of the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub marker: Option<String>,
    pub height: f64,
}

impl Node {
    pub fn message(height: f64) -> Self {
        Self {
            marker: None,
            height: height.max(0.0),
        }
    }

    /// Zero-height end-of-list anchor.
    pub fn sentinel() -> Self {
        Self {
            marker: Some(SENTINEL_MARKER.to_string()),
            height: 0.0,
        }
    }
}

/// A recorded `scroll_sentinel_into_view` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollCall {
    pub target: String,
    pub behavior: ScrollBehavior,
    pub from: f64,
    pub to: f64,
}

pub struct VirtualList {
    children: Vec<Node>,
    scroll_top: f64,
    client_height: f64,
    calls: Vec<ScrollCall>,
    events: EventHub<ScrollEvent>,
}

impl VirtualList {
    pub fn new(client_height: f64) -> Self {
        let mut list = Self {
            children: Vec::new(),
            scroll_top: 0.0,
            client_height: client_height.max(0.0),
            calls: Vec::new(),
            events: EventHub::new(),
        };
        list.render(&[]);
        list
    }

    /// Render one row per message height, followed by the sentinel.
    pub fn render(&mut self, heights: &[f64]) {
        let mut nodes: Vec<Node> = heights.iter().copied().map(Node::message).collect();
        nodes.push(Node::sentinel());
        self.render_nodes(nodes);
    }

    /// Render an arbitrary child layout, sentinel or not.
    pub fn render_nodes(&mut self, nodes: Vec<Node>) {
        self.children = nodes;
        self.clamp();
    }

    pub fn resize(&mut self, client_height: f64) {
        self.client_height = client_height.max(0.0);
        self.clamp();
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn subscribe(&mut self) -> Subscription<ScrollEvent> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    pub fn max_scroll_top(&self) -> f64 {
        (self.content_height() - self.client_height).max(0.0)
    }

    /// Input-device scroll to an absolute position.
    pub fn user_scroll_to(&mut self, top: f64) {
        self.set_scroll_top(top);
    }

    pub fn user_scroll_by(&mut self, delta: f64) {
        self.set_scroll_top(self.scroll_top + delta);
    }

    pub fn scroll_calls(&self) -> &[ScrollCall] {
        &self.calls
    }

    pub fn take_scroll_calls(&mut self) -> Vec<ScrollCall> {
        std::mem::take(&mut self.calls)
    }

    fn content_height(&self) -> f64 {
        self.children.iter().map(|node| node.height).sum()
    }

    fn clamp(&mut self) {
        let max = self.max_scroll_top();
        if self.scroll_top > max {
            self.set_scroll_top(max);
        }
    }

    fn set_scroll_top(&mut self, top: f64) -> bool {
        let top = if top.is_finite() {
            top.clamp(0.0, self.max_scroll_top())
        } else {
            0.0
        };
        if top == self.scroll_top {
            return false;
        }
        self.scroll_top = top;
        self.events.emit(ScrollEvent { scroll_top: top });
        true
    }

    /// Top offset of the sentinel, if one is rendered.
    fn sentinel_offset(&self) -> Option<f64> {
        let mut offset = 0.0;
        for node in &self.children {
            if node.marker.as_deref() == Some(SENTINEL_MARKER) {
                return Some(offset);
            }
            offset += node.height;
        }
        None
    }
}

impl ScrollContainer for VirtualList {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn scroll_height(&self) -> f64 {
        self.content_height()
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_marker(&self, index: usize) -> Option<&str> {
        self.children.get(index)?.marker.as_deref()
    }

    fn scroll_sentinel_into_view(&mut self, behavior: ScrollBehavior) {
        let Some(offset) = self.sentinel_offset() else {
            return;
        };
        // Align the zero-height anchor with the bottom edge of the viewport.
        let from = self.scroll_top;
        self.set_scroll_top(offset - self.client_height);
        self.calls.push(ScrollCall {
            target: SENTINEL_MARKER.to_string(),
            behavior,
            from,
            to: self.scroll_top,
        });
    }
}
