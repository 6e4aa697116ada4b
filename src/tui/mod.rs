//! Terminal User Interface module
//!
//! A chat transcript whose scrolling is driven by the auto-scroll engine,
//! fed by a simulated streaming agent.

mod app;
pub mod feed;
mod theme;
pub mod transcript;
mod widgets;

pub use app::App;
pub use feed::FeedEvent;
pub use theme::Theme;
pub use transcript::Transcript;
pub use widgets::{Message, MessageRole};
