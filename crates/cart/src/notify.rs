//! User-facing notices emitted by the cart store.
//!
//! The store never returns errors to its callers. Rejected and failed
//! operations are reported through a [`Notifier`] instead, which a UI turns
//! into toasts or status lines.

use std::fmt;

use tokio::sync::mpsc;

/// A message shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartNotice {
    /// Requested amount is above the available stock.
    StockExceeded,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed (including "not in cart").
    RemoveFailed,
    /// Changing a product amount failed (including "not in cart").
    UpdateFailed,
    /// Emptying the cart failed.
    ClearFailed,
}

impl CartNotice {
    /// Text shown to the shopper.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StockExceeded => "Requested quantity is out of stock",
            Self::AddFailed => "Error adding product",
            Self::RemoveFailed => "Error removing product",
            Self::UpdateFailed => "Error changing product quantity",
            Self::ClearFailed => "Error clearing cart",
        }
    }
}

impl fmt::Display for CartNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Fire-and-forget sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: CartNotice);
}

/// Forwards notices to an unbounded channel.
///
/// Sending never blocks; notices sent after the receiver is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<CartNotice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the UI drains.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CartNotice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: CartNotice) {
        let _ = self.sender.send(notice);
    }
}

/// Logs notices at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: CartNotice) {
        tracing::warn!(notice = ?notice, "{notice}");
    }
}
