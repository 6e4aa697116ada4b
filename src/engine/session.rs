//! Detects conversation switches so follow state never leaks across sessions.

use tracing::debug;

pub type SessionId = String;

/// What the coordinator remembers between updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: Option<SessionId>,
    pub previous_message_count: usize,
}

/// Result of comparing one update against the remembered context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// First update after mount.
    Started {
        session_id: Option<SessionId>,
        message_count: usize,
    },
    Switched {
        from: Option<SessionId>,
        to: Option<SessionId>,
        message_count: usize,
    },
    Appended {
        added: usize,
    },
    Truncated {
        removed: usize,
    },
    Unchanged,
}

impl SessionUpdate {
    /// Whether follow state must be rebuilt from scratch.
    pub fn is_reset(&self) -> bool {
        matches!(
            self,
            SessionUpdate::Started { .. } | SessionUpdate::Switched { .. }
        )
    }
}

#[derive(Debug, Default)]
pub struct SessionResetCoordinator {
    context: SessionContext,
    observed: bool,
}

impl SessionResetCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Compare the current session and message count with the previous update.
    ///
    /// On a switch the message count baseline is replaced by the new
    /// session's count, so its initial batch is never read as an append.
    pub fn observe(&mut self, session_id: Option<&str>, message_count: usize) -> SessionUpdate {
        let session_id = session_id.map(str::to_string);

        if !self.observed {
            self.observed = true;
            self.context = SessionContext {
                session_id: session_id.clone(),
                previous_message_count: message_count,
            };
            debug!(?session_id, message_count, "session started");
            return SessionUpdate::Started {
                session_id,
                message_count,
            };
        }

        if self.context.session_id != session_id {
            let from = std::mem::replace(&mut self.context.session_id, session_id.clone());
            self.context.previous_message_count = message_count;
            debug!(?from, to = ?session_id, message_count, "session switched");
            return SessionUpdate::Switched {
                from,
                to: session_id,
                message_count,
            };
        }

        let previous = std::mem::replace(&mut self.context.previous_message_count, message_count);
        if message_count > previous {
            SessionUpdate::Appended {
                added: message_count - previous,
            }
        } else if message_count < previous {
            SessionUpdate::Truncated {
                removed: previous - message_count,
            }
        } else {
            SessionUpdate::Unchanged
        }
    }

    /// Forget everything; the next update is treated as a fresh start.
    pub fn forget(&mut self) {
        self.context = SessionContext::default();
        self.observed = false;
    }
}
