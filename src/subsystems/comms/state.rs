//! Shared state for comms channels.
//!
//! Channels hold an `Arc<CommsState>` and reach the matcher, chat settings
//! and the manager's event queue only through the methods below.

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::intent::IntentMatcher;
use crate::session::{Conversation, Turn, take_turn};

/// Events a channel sends back to the comms manager.
#[derive(Debug)]
pub enum CommsEvent {
    /// Channel has stopped (clean exit or EOF).
    ChannelShutdown { channel_id: String },
    /// A conversation was opened on the channel.
    SessionStarted { channel_id: String, session_id: Uuid },
}

pub struct CommsState {
    matcher: IntentMatcher,
    chat: ChatConfig,
    event_tx: mpsc::Sender<CommsEvent>,
}

impl CommsState {
    pub fn new(matcher: IntentMatcher, chat: ChatConfig, event_tx: mpsc::Sender<CommsEvent>) -> Self {
        Self { matcher, chat, event_tx }
    }

    pub fn matcher(&self) -> &IntentMatcher {
        &self.matcher
    }

    pub fn chat(&self) -> &ChatConfig {
        &self.chat
    }

    /// Run one chat turn on `conversation` and hand it back.
    pub fn take_turn(
        &self,
        channel_id: &str,
        conversation: Conversation,
        text: &str,
    ) -> (Conversation, Turn) {
        let (conversation, turn) = take_turn(conversation, text, &self.matcher);
        debug!(
            channel_id,
            session_id = %conversation.id(),
            locale = %conversation.locale(),
            category = %turn.category,
            "turn answered"
        );
        (conversation, turn)
    }

    /// Report an event to the comms manager.
    ///
    /// Non-blocking: the event is dropped with a warning if the manager is
    /// behind or gone.
    pub fn report_event(&self, event: CommsEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("comms event dropped: {e}");
        }
    }
}
