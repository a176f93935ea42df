//! Shutdown signal for the poll loop
//!
//! [`signal`] hands out a [`Broadcaster`] and a [`Watcher`]. The binary keeps
//! the `Broadcaster` in its ctrl-c task; the [`crate::beat::Beat`] owns the
//! `Watcher` and checks it between ticks, so a poll already in progress always
//! completes. The signal fires once and cannot be taken back.

use tokio::sync::broadcast;

/// Construct a `Watcher` and `Broadcaster` pair.
#[must_use]
pub fn signal() -> (Watcher, Broadcaster) {
    // Nothing is ever sent on the channel. Dropping the sender closes it and
    // closing is the signal.
    let (sender, receiver) = broadcast::channel(1);
    (
        Watcher {
            receiver,
            signal_received: false,
        },
        Broadcaster { sender },
    )
}

#[derive(Debug)]
/// Fires the shutdown signal. Dropping it without calling
/// [`Broadcaster::signal`] fires the signal as well.
pub struct Broadcaster {
    sender: broadcast::Sender<()>,
}

impl Broadcaster {
    /// Fire the signal. Does not wait for the watcher to notice.
    pub fn signal(self) {
        drop(self.sender);
    }
}

#[derive(Debug)]
/// Waits for the shutdown signal.
pub struct Watcher {
    receiver: broadcast::Receiver<()>,
    signal_received: bool,
}

impl Watcher {
    /// Wait for the signal. Returns at once if it was already received.
    pub async fn recv(&mut self) {
        while !self.signal_received {
            match self.receiver.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => self.signal_received = true,
            }
        }
    }
}
