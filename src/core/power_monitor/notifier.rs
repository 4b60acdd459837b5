//! Change notification for snapshot consumers.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};

use anyhow::{anyhow, Result};

/// Called once per completed collector cycle.
///
/// Implementations must return quickly. Errors are logged by the collector
/// and otherwise ignored.
pub trait ChangeNotifier: Send {
    fn notify(&self) -> Result<()>;
}

impl<F> ChangeNotifier for F
where
    F: Fn() -> Result<()> + Send,
{
    fn notify(&self) -> Result<()> {
        self()
    }
}

/// Notifier that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self) -> Result<()> {
        Ok(())
    }
}

/// Wakes a consumer through a bounded channel without ever blocking.
///
/// At most one wake-up is buffered; further notifications while one is
/// pending are coalesced.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: SyncSender<()>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, Receiver<()>) {
        let (tx, rx) = sync_channel(1);
        (Self { tx }, rx)
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn notify(&self) -> Result<()> {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => Ok(()),
            Err(TrySendError::Disconnected(())) => Err(anyhow!("consumer is gone")),
        }
    }
}
