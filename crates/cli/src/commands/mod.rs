//! Command implementations.
//!
//! Every command runs against one [`Session`]: a file-backed cart store plus
//! the receiving end of its notices.

pub mod cart;
pub mod products;

use rocketshoes_cart::{CartConfig, CartNotice, CatalogError, ChannelNotifier, FileCartStore};
use tokio::sync::mpsc::UnboundedReceiver;

/// Cart store for one CLI invocation.
pub struct Session {
    pub store: FileCartStore<ChannelNotifier>,
    notices: UnboundedReceiver<CartNotice>,
}

impl Session {
    /// Open the cart stored at the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn open(config: &CartConfig) -> Result<Self, CatalogError> {
        let (notifier, notices) = ChannelNotifier::new();
        let store = FileCartStore::from_config(config, notifier)?;
        tracing::debug!(path = %config.storage_path.display(), "Opened cart storage");
        Ok(Self { store, notices })
    }

    /// Notices emitted since the last call.
    pub fn take_notices(&mut self) -> Vec<CartNotice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            notices.push(notice);
        }
        notices
    }
}
