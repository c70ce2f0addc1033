//! Axum-based HTTP channel: JSON API under `/api/`.
//!
//! Implements [`Channel`] so it slots into the comms lifecycle: `run()`
//! drives the axum event loop and the shared [`CancellationToken`] is wired
//! to axum's graceful shutdown. Conversations live in a [`SessionTable`]
//! keyed by session id.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health
//! GET  /api/content/{locale}
//! POST /api/message
//! GET  /api/sessions
//! GET  /api/session/{session_id}
//! POST /api/appointment
//! GET  /favicon.ico              → 204
//! ```

mod api;
mod sessions;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AxumChannelConfig;
use crate::error::AppError;
use crate::subsystems::runtime::{Channel, ChannelFuture};

use super::state::CommsState;
use sessions::SessionTable;

// ── Shared request state ──────────────────────────────────────────────────────

/// Axum router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone; all fields are reference-counted.
#[derive(Clone)]
pub(crate) struct AxumState {
    /// Channel identifier used in log spans.
    pub channel_id: Arc<str>,
    pub comms: Arc<CommsState>,
    pub sessions: Arc<SessionTable>,
    pub bot_name: Arc<str>,
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    channel_id: String,
    bot_name: String,
    config: AxumChannelConfig,
    state: Arc<CommsState>,
}

impl AxumChannel {
    pub fn new(
        channel_id: impl Into<String>,
        bot_name: impl Into<String>,
        config: AxumChannelConfig,
        state: Arc<CommsState>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            bot_name: bot_name.into(),
            config,
            state,
        }
    }
}

impl Channel for AxumChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture {
        Box::pin(run_axum(*self, shutdown))
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

async fn run_axum(channel: AxumChannel, shutdown: CancellationToken) -> Result<(), AppError> {
    let AxumChannel { channel_id, bot_name, config, state } = channel;
    let bind_addr = config.bind;

    let axum_state = AxumState {
        channel_id: Arc::from(channel_id.as_str()),
        comms: state,
        sessions: Arc::new(SessionTable::new(config.max_sessions)),
        bot_name: Arc::from(bot_name.as_str()),
    };

    let router = build_router(axum_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Comms(format!("axum bind failed on {bind_addr}: {e}")))?;

    info!(%channel_id, %bind_addr, max_sessions = config.max_sessions, "axum channel listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Comms(format!("axum server error: {e}")))?;

    info!(%channel_id, "axum channel shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub(crate) fn build_router(state: AxumState) -> Router {
    Router::new()
        .route("/api/health",                 get(api::health))
        .route("/api/content/{locale}",       get(api::content))
        .route("/api/message",                post(api::message))
        .route("/api/sessions",               get(api::sessions))
        .route("/api/session/{session_id}",   get(api::session_detail))
        .route("/api/appointment",            post(api::appointment))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
}
