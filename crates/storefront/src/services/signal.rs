//! Wishlist-changed signal.
//!
//! Views that display wishlist state subscribe here instead of sharing an
//! in-memory container. Delivery is best-effort: a subscription only sees
//! signals published after it was created, and a listener that falls behind
//! skips what it missed. Dropping a [`WishlistSubscription`] unsubscribes it.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use raritone_core::{ProductId, SessionHandle};

/// Buffered signals per listener before it starts lagging.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 64;

/// A wishlist mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistChanged {
    /// Visitor whose wishlist changed.
    #[serde(skip)]
    pub owner: SessionHandle,
    pub product_id: ProductId,
    pub now_present: bool,
}

/// Publish side of the signal.
#[derive(Clone)]
pub struct WishlistSignal {
    sender: broadcast::Sender<WishlistChanged>,
}

impl WishlistSignal {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Broadcast a change without waiting for listeners.
    pub fn publish(&self, change: WishlistChanged) {
        match self.sender.send(change) {
            Ok(listeners) => tracing::debug!(listeners, "wishlist change published"),
            Err(_) => tracing::debug!("wishlist change published with no listeners"),
        }
    }

    /// Start receiving changes published from now on.
    #[must_use]
    pub fn subscribe(&self) -> WishlistSubscription {
        WishlistSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for WishlistSignal {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_CAPACITY)
    }
}

/// Receive side of the signal.
pub struct WishlistSubscription {
    receiver: broadcast::Receiver<WishlistChanged>,
}

impl WishlistSubscription {
    /// Wait for the next change. `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<WishlistChanged> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "wishlist listener lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published change, if any.
    pub fn try_recv(&mut self) -> Option<WishlistChanged> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) => return Some(change),
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
