//! In-memory session table for the HTTP channel.
//!
//! Each HTTP session owns one [`Conversation`]. The table is capped by entry
//! count: `order` tracks recency and the least recently used session is
//! dropped first. Nothing is persisted.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::knowledge::Locale;
use crate::session::{Conversation, Turn};

use super::super::state::CommsState;

/// Summary row for `GET /api/sessions`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionSummary {
    pub session_id: Uuid,
    pub locale: Locale,
    pub started_at: String,
    pub message_count: usize,
}

/// Result of [`SessionTable::turn`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct TurnOutcome {
    pub session_id: Uuid,
    /// Locale the turn was answered in.
    pub locale: Locale,
    pub turn: Turn,
    /// A new session was opened for this turn.
    pub created: bool,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, Conversation>,
    /// Session ids, least recently used first.
    order: VecDeque<Uuid>,
}

impl Inner {
    fn touch(&mut self, id: Uuid) {
        self.order.retain(|k| *k != id);
        self.order.push_back(id);
    }
}

pub(crate) struct SessionTable {
    cap: usize,
    inner: Mutex<Inner>,
}

impl SessionTable {
    pub fn new(cap: usize) -> Self {
        Self { cap: cap.max(1), inner: Mutex::new(Inner::default()) }
    }

    /// Run a chat turn.
    ///
    /// With `session_id = None` a new session is opened in `locale`, or
    /// `default_locale` when that is `None`. An existing session switches to
    /// `locale` when one is given. Returns `None` for an unknown session id.
    pub fn turn(
        &self,
        channel_id: &str,
        session_id: Option<Uuid>,
        locale: Option<Locale>,
        default_locale: Locale,
        text: &str,
        comms: &CommsState,
    ) -> Option<TurnOutcome> {
        let mut inner = self.lock();

        let (mut conversation, created) = match session_id {
            Some(id) => (inner.sessions.remove(&id)?, false),
            None => (Conversation::new(locale.unwrap_or(default_locale)), true),
        };
        if let Some(locale) = locale {
            conversation.set_locale(locale);
        }

        let (conversation, turn) = comms.take_turn(channel_id, conversation, text);
        let id = conversation.id();
        let outcome = TurnOutcome { session_id: id, locale: conversation.locale(), turn, created };

        inner.sessions.insert(id, conversation);
        inner.touch(id);
        while inner.order.len() > self.cap {
            if let Some(oldest) = inner.order.pop_front() {
                inner.sessions.remove(&oldest);
                debug!(session_id = %oldest, "session evicted");
            }
        }

        Some(outcome)
    }

    pub fn get(&self, session_id: Uuid) -> Option<Conversation> {
        self.lock().sessions.get(&session_id).cloned()
    }

    /// Summaries, most recently used first.
    pub fn list(&self) -> Vec<SessionSummary> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.sessions.get(id))
            .map(|c| SessionSummary {
                session_id: c.id(),
                locale: c.locale(),
                started_at: c.started_at().to_string(),
                message_count: c.len(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic mid-turn leaves the maps consistent, so poisoning is ignored.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
