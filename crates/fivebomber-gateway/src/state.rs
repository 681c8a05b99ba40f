//! Shared application state.

use std::sync::Arc;

use fivebomber_core::clock::Clock;
use fivebomber_core::repository::{ConnectionRepository, QuestionRepository, SessionRepository};
use fivebomber_realtime::Broadcaster;

use crate::registry::ChannelTransport;

/// Application state shared across all request handlers and socket tasks.
#[derive(Clone)]
pub struct AppState {
    /// Game session store.
    pub sessions: Arc<dyn SessionRepository>,
    /// Question reference data.
    pub questions: Arc<dyn QuestionRepository>,
    /// Live connection leases.
    pub connections: Arc<dyn ConnectionRepository>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Per-socket frame channels; doubles as the broadcast transport.
    pub transport: Arc<ChannelTransport>,
    /// Room fan-out over the connection store and transport.
    pub broadcaster: Arc<Broadcaster>,
}

impl AppState {
    /// Wires application state from its collaborators; the channel
    /// transport and broadcaster are built here so every handler shares
    /// one registry.
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        questions: Arc<dyn QuestionRepository>,
        connections: Arc<dyn ConnectionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let transport = Arc::new(ChannelTransport::new());
        let broadcaster = Arc::new(Broadcaster::new(
            Arc::clone(&connections),
            Arc::clone(&transport) as Arc<dyn fivebomber_core::transport::Transport>,
        ));
        Self {
            sessions,
            questions,
            connections,
            clock,
            transport,
            broadcaster,
        }
    }
}
