//! Concrete scroll containers for hosts without a real DOM.

mod virtual_list;

pub use virtual_list::{Node, ScrollCall, VirtualList};
