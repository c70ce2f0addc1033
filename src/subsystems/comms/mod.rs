//! Comms subsystem: manages the chat front-ends.
//!
//! # Architecture
//!
//! Each channel (console, HTTP) implements [`runtime::Channel`] and is
//! spawned as an independent task by [`start`] via
//! [`runtime::spawn_channels`]. Channels capture their shared
//! [`Arc<CommsState>`] at construction time; the generic `Channel::run`
//! signature only carries the shutdown token.
//!
//! An intra-subsystem [`mpsc`] channel lets running channels signal the
//! comms manager (lifecycle events, session tracking). It is drained by a
//! background task that ends once every channel has dropped its sender.
//!
//! [`runtime::Channel`]: crate::subsystems::runtime::Channel
//! [`runtime::spawn_channels`]: crate::subsystems::runtime::spawn_channels

#[cfg(feature = "channel-axum")]
pub mod axum_channel;
#[cfg(feature = "channel-pty")]
pub mod pty;
mod state;
pub mod typewriter;

pub use state::{CommsEvent, CommsState};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::intent::IntentMatcher;
use crate::subsystems::runtime::{Channel, ChannelSetHandle, spawn_channels};

/// Spawn all configured channels and return a handle that resolves when
/// they have all exited.
///
/// If any channel exits with an error the shared `shutdown` token is
/// cancelled so siblings stop cooperatively. Synchronous: returns as soon
/// as the tasks are spawned.
pub fn start(config: &Config, matcher: IntentMatcher, shutdown: CancellationToken) -> ChannelSetHandle {
    let (event_tx, event_rx) = mpsc::channel::<CommsEvent>(32);
    let state = Arc::new(CommsState::new(matcher, config.chat.clone(), event_tx));

    let mut channels: Vec<Box<dyn Channel>> = Vec::new();

    #[cfg(feature = "channel-pty")]
    {
        if config.comms_pty_should_load() {
            info!("loading pty channel");
            channels.push(Box::new(pty::PtyChannel::new("pty0", state.clone())));
        }
    }

    #[cfg(feature = "channel-axum")]
    {
        if config.comms_axum_should_load() {
            info!(bind = %config.comms.axum_channel.bind, "loading axum channel");
            channels.push(Box::new(axum_channel::AxumChannel::new(
                "axum0",
                config.bot_name.clone(),
                config.comms.axum_channel.clone(),
                state.clone(),
            )));
        }
    }

    if channels.is_empty() {
        info!("no comms channels configured — waiting for shutdown");
    }

    // Only the channels keep the sender alive from here on.
    drop(state);

    tokio::spawn(drain_events(event_rx));

    spawn_channels(channels, shutdown)
}

async fn drain_events(mut rx: mpsc::Receiver<CommsEvent>) {
    let mut sessions_started = 0u64;
    while let Some(event) = rx.recv().await {
        match event {
            CommsEvent::ChannelShutdown { channel_id } => {
                debug!(%channel_id, sessions_started, "channel reported shutdown");
            }
            CommsEvent::SessionStarted { channel_id, session_id } => {
                sessions_started += 1;
                debug!(%channel_id, %session_id, sessions_started, "session started");
            }
        }
    }
}
