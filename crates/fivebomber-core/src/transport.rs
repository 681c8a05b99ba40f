//! Transport send primitive.

use async_trait::async_trait;

use crate::error::GameError;

/// Outcome of a single delivery attempt.
///
/// The three-way contract — delivered, recipient gone, or a hard error via
/// `Result` — is what lets the broadcaster treat a vanished recipient as a
/// cleanup trigger while a broken channel aborts the whole fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was handed to the recipient's transport session.
    Delivered,
    /// The addressed transport session no longer exists. Expected and
    /// non-fatal; the caller should drop its connection record.
    RecipientGone,
}

/// Duplex-transport send primitive.
///
/// The engine never sees the concrete transport; the gateway binds this to
/// per-socket channels, tests to a scripted fake.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempts to deliver `payload` to one transport session.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Connection` for channel failures other than the
    /// recipient having gone away.
    async fn send(&self, connection_id: &str, payload: &[u8]) -> Result<SendOutcome, GameError>;
}
