//! Channel runtime: spawns front-end channels and supervises them.
//!
//! A [`Channel`] captures its shared state at construction and is handed to
//! [`spawn_channels`], which runs every channel as its own Tokio task. If any
//! channel fails or panics the shared [`CancellationToken`] is cancelled so
//! the others wind down, and the first error is reported through the
//! returned [`ChannelSetHandle`].

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::AppError;

/// Boxed run-loop returned by [`Channel::run`].
pub type ChannelFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A front-end that drives chat turns (console, HTTP, …).
pub trait Channel: Send + 'static {
    /// Stable identifier used in log messages.
    fn id(&self) -> &str;

    /// Consume the channel and return its run-loop. The loop should exit
    /// when `shutdown` is cancelled.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture;
}

/// Resolves when every spawned channel has exited.
pub struct ChannelSetHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl ChannelSetHandle {
    /// Await all channels and return the first error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("channel supervisor panicked: {e}"))),
        }
    }
}

/// Spawn each channel and supervise the set.
///
/// With no channels the handle waits for `shutdown` instead of returning
/// immediately, so a process with nothing configured idles until Ctrl-C.
pub fn spawn_channels(
    channels: Vec<Box<dyn Channel>>,
    shutdown: CancellationToken,
) -> ChannelSetHandle {
    let inner = tokio::spawn(async move {
        if channels.is_empty() {
            shutdown.cancelled().await;
            return Ok(());
        }

        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();
        for channel in channels {
            debug!(channel = %channel.id(), "spawning channel");
            set.spawn(channel.run(shutdown.clone()));
        }

        let mut first_err: Option<AppError> = None;
        while let Some(res) = set.join_next().await {
            match res {
                Err(e) => {
                    error!("channel panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| AppError::Comms(format!("channel panicked: {e}")));
                }
                Ok(Err(e)) => {
                    error!("channel error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                Ok(Ok(())) => {}
            }
        }

        first_err.map_or(Ok(()), Err)
    });

    ChannelSetHandle { inner }
}
