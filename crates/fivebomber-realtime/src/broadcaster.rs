//! Room fan-out with stale-connection reclamation.

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, warn};

use fivebomber_core::error::GameError;
use fivebomber_core::model::Connection;
use fivebomber_core::repository::ConnectionRepository;
use fivebomber_core::transport::{SendOutcome, Transport};

/// Fans messages out to every connection of a room.
///
/// A recipient that has gone away is expected: its record is removed and
/// delivery to the rest continues. Any other send failure is a broken
/// channel — it aborts the broadcast and propagates.
pub struct Broadcaster {
    connections: Arc<dyn ConnectionRepository>,
    transport: Arc<dyn Transport>,
}

impl Broadcaster {
    /// Creates a broadcaster over the given connection store and transport.
    #[must_use]
    pub fn new(connections: Arc<dyn ConnectionRepository>, transport: Arc<dyn Transport>) -> Self {
        Self {
            connections,
            transport,
        }
    }

    /// Delivers `message` to every connection currently recorded for
    /// `room_id`. An empty room is a no-op, not an error. Delivery order
    /// across recipients is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` if the room listing or a stale-record
    /// removal fails, and `GameError::Connection` if any delivery fails
    /// with something other than the recipient being gone.
    pub async fn broadcast_to_room(&self, room_id: &str, message: &Value) -> Result<(), GameError> {
        let connections = self.connections.list_by_room(room_id).await?;
        if connections.is_empty() {
            debug!(room_id, "broadcast to empty room skipped");
            return Ok(());
        }

        let payload = encode(message);
        debug!(room_id, recipients = connections.len(), "broadcasting");

        try_join_all(
            connections
                .iter()
                .map(|connection| self.deliver(connection, &payload)),
        )
        .await?;

        Ok(())
    }

    /// Delivers `message` to a single connection, exposing the three-way
    /// outcome: delivered, recipient gone, or a hard channel error.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Connection` for channel failures other than the
    /// recipient having gone away.
    pub async fn send_to_connection(
        &self,
        connection_id: &str,
        message: &Value,
    ) -> Result<SendOutcome, GameError> {
        self.transport.send(connection_id, &encode(message)).await
    }

    async fn deliver(&self, connection: &Connection, payload: &[u8]) -> Result<(), GameError> {
        match self.transport.send(&connection.connection_id, payload).await? {
            SendOutcome::Delivered => Ok(()),
            SendOutcome::RecipientGone => {
                warn!(
                    connection_id = connection.connection_id,
                    room_id = connection.room_id,
                    "removing stale connection"
                );
                self.connections.remove(&connection.connection_id).await
            }
        }
    }
}

fn encode(message: &Value) -> Vec<u8> {
    // Serializing a serde_json::Value cannot fail.
    serde_json::to_vec(message).expect("Value serialization is infallible")
}
