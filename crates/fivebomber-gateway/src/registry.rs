//! In-process transport over per-socket channels.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use fivebomber_core::error::GameError;
use fivebomber_core::transport::{SendOutcome, Transport};

/// Frames queued for one socket's writer task.
pub type FrameSender = UnboundedSender<Vec<u8>>;

/// The gateway's `Transport`: a registry of per-connection frame senders.
///
/// A send to an unregistered ID, or to a sender whose writer task has shut
/// down, reports `RecipientGone` — the same signal a closed remote gives
/// any other transport binding.
#[derive(Default)]
pub struct ChannelTransport {
    senders: RwLock<HashMap<String, FrameSender>>,
}

impl ChannelTransport {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the frame sender for a freshly opened socket.
    pub async fn register(&self, connection_id: &str, sender: FrameSender) {
        debug!(connection_id, "transport registered");
        self.senders
            .write()
            .await
            .insert(connection_id.to_owned(), sender);
    }

    /// Unregisters a socket. Idempotent.
    pub async fn unregister(&self, connection_id: &str) {
        debug!(connection_id, "transport unregistered");
        self.senders.write().await.remove(connection_id);
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, connection_id: &str, payload: &[u8]) -> Result<SendOutcome, GameError> {
        let senders = self.senders.read().await;
        let Some(sender) = senders.get(connection_id) else {
            return Ok(SendOutcome::RecipientGone);
        };
        if sender.send(payload.to_vec()).is_err() {
            // Writer task already dropped its receiver.
            return Ok(SendOutcome::RecipientGone);
        }
        Ok(SendOutcome::Delivered)
    }
}
