//! Headless replay of scroll scenarios.
//!
//! A script is JSON lines, one step per line. Blank lines and lines starting
//! with `#` are ignored:
//!
//! ```text
//! {"step":"resize","client_height":500}
//! {"step":"render","heights":[400,600]}
//! {"step":"session","id":"a","messages":2}
//! {"step":"frame"}
//! {"step":"user_scroll","to":200}
//! {"step":"content","change":"message_appended"}
//! {"step":"frame"}
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{
    AutoScrollEngine, ContentChange, EngineSettings, FollowMode, FrameOutcome, FrameQueue,
    ManualClock, ScrollContainer,
};
use crate::host::{ScrollCall, VirtualList};
use crate::{ChatScrollConfig, ChatScrollError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Lay out messages of the given heights (sentinel appended).
    Render { heights: Vec<f64> },
    Resize { client_height: f64 },
    /// View update with the current session id and message count.
    Session {
        id: Option<String>,
        messages: usize,
    },
    Content { change: ContentChange },
    UserScroll { to: f64 },
    /// Fire every requested animation frame.
    Frame,
    Advance { ms: u64 },
    Unmount,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let step = serde_json::from_str(line).map_err(|e| ChatScrollError::Script {
                line: index + 1,
                message: e.to_string(),
            })?;
            steps.push(step);
        }
        Ok(Self { steps })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub scroll_calls: Vec<ScrollCall>,
    pub outcomes: Vec<FrameOutcome>,
    pub final_mode: FollowMode,
    pub final_scroll_top: f64,
}

impl ReplayReport {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Drive a fresh engine over an in-memory list through `script`.
pub fn run(script: &Script, config: &ChatScrollConfig) -> ReplayReport {
    let clock = ManualClock::new();
    let frames = FrameQueue::new();
    let mut list = VirtualList::new(0.0);
    let mut engine =
        AutoScrollEngine::mount(EngineSettings::from(config), clock.clone(), frames.clone());
    engine.attach(list.subscribe());

    let mut outcomes = Vec::new();
    for step in &script.steps {
        debug!(?step, "replay step");
        match step {
            Step::Render { heights } => {
                list.render(heights);
                engine.pump_scroll_events(&list);
            }
            Step::Resize { client_height } => {
                list.resize(*client_height);
                engine.pump_scroll_events(&list);
            }
            Step::Session { id, messages } => {
                engine.on_update(id.as_deref(), *messages);
            }
            Step::Content { change } => {
                engine.on_content_change(*change);
            }
            Step::UserScroll { to } => {
                list.user_scroll_to(*to);
                engine.pump_scroll_events(&list);
            }
            Step::Frame => {
                for frame in frames.take_due() {
                    outcomes.push(engine.on_animation_frame(frame, &mut list));
                }
                engine.pump_scroll_events(&list);
            }
            Step::Advance { ms } => {
                clock.advance(Duration::from_millis(*ms));
            }
            Step::Unmount => {
                engine.unmount();
            }
        }
    }

    let report = ReplayReport {
        scroll_calls: list.take_scroll_calls(),
        outcomes,
        final_mode: engine.mode(),
        final_scroll_top: list.scroll_top(),
    };
    info!(
        steps = script.steps.len(),
        scroll_calls = report.scroll_calls.len(),
        mode = %report.final_mode,
        "replay finished"
    );
    report
}
