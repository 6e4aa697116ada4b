//! Simulated agent feed
//!
//! Plays scripted turns into a channel the way a streaming backend would:
//! user prompt, typing indicator, tool notifications, then the reply streamed
//! word by word.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::widgets::Message;

#[derive(Debug, Clone)]
pub enum FeedEvent {
    Typing(bool),
    Message(Message),
    /// A message whose content arrives in subsequent `Delta`s.
    StreamStarted(Message),
    Delta(String),
    StreamFinished,
    ToolStarted(String),
    ToolFinished(String),
}

struct Turn {
    prompt: &'static str,
    tools: &'static [&'static str],
    reply: &'static str,
}

const TURNS: &[Turn] = &[
    Turn {
        prompt: "Why does the message list stop short of the bottom while streaming?",
        tools: &["search_code", "read_file"],
        reply: "The list was scrolling to the last message element. While that message \
                is still growing, or when tool rows and the typing indicator render after \
                it, its bottom edge is not the bottom of the list, so every scroll lands \
                a little short and the gap compounds as tokens arrive.\n\
                Scrolling to a zero-height anchor that is always rendered last fixes it: \
                the anchor's position is the true end of the content no matter what is \
                being appended.",
    },
    Turn {
        prompt: "How do you tell my scrolling apart from yours?",
        tools: &["read_file"],
        reply: "Scroll events do not say who caused them. Right before scrolling, the \
                engine arms a short-lived flag; the first scroll event seen while it is \
                armed is treated as its own and clears it. If no event arrives, because \
                the position did not change, the flag expires after about one frame plus \
                a margin so it can never swallow your next scroll.",
    },
    Turn {
        prompt: "And when several things change at once?",
        tools: &["run_tests"],
        reply: "Every change in one update cycle, whether a new message, a streamed \
                delta, a tool notification or the typing indicator, folds into a single \
                pending scroll. It runs on the next frame, after layout, and only if you \
                are still following. Scroll up more than a handful of lines and nothing \
                moves until you come back near the bottom.",
    },
];

/// Spawn the feed for one session. Dropping the receiver stops it.
pub fn spawn(session: String, tx: mpsc::Sender<FeedEvent>, pace: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        run(&session, &tx, pace).await;
        debug!(%session, "feed stopped");
    })
}

async fn run(session: &str, tx: &mpsc::Sender<FeedEvent>, pace: Duration) {
    for turn in TURNS.iter().cycle() {
        if play_turn(turn, tx, pace).await.is_err() {
            return;
        }
        debug!(%session, prompt = turn.prompt, "turn finished");
        tokio::time::sleep(pace * 20).await;
    }
}

async fn play_turn(
    turn: &Turn,
    tx: &mpsc::Sender<FeedEvent>,
    pace: Duration,
) -> Result<(), mpsc::error::SendError<FeedEvent>> {
    tx.send(FeedEvent::Message(Message::user(turn.prompt))).await?;
    tx.send(FeedEvent::Typing(true)).await?;
    tokio::time::sleep(pace * 8).await;

    for tool in turn.tools {
        tx.send(FeedEvent::ToolStarted(tool.to_string())).await?;
        tokio::time::sleep(pace * 6).await;
        tx.send(FeedEvent::ToolFinished(tool.to_string())).await?;
    }

    tx.send(FeedEvent::Typing(false)).await?;
    tx.send(FeedEvent::StreamStarted(Message::assistant(""))).await?;
    for (i, line) in turn.reply.lines().enumerate() {
        if i > 0 {
            tx.send(FeedEvent::Delta("\n".to_string())).await?;
        }
        for (j, word) in line.split_whitespace().enumerate() {
            let delta = if j == 0 {
                word.to_string()
            } else {
                format!(" {word}")
            };
            tx.send(FeedEvent::Delta(delta)).await?;
            tokio::time::sleep(pace).await;
        }
    }
    tx.send(FeedEvent::StreamFinished).await?;
    Ok(())
}
