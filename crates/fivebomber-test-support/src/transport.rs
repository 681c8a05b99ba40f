//! Test transport — scripted delivery outcomes and a sent-frame log.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use fivebomber_core::error::GameError;
use fivebomber_core::transport::{SendOutcome, Transport};

enum Script {
    Gone,
    Broken,
}

/// A transport that records every send and answers with a per-connection
/// scripted outcome: delivered by default, "recipient gone" or a hard
/// channel error where configured.
#[derive(Default)]
pub struct RecordingTransport {
    scripts: Mutex<HashMap<String, Script>>,
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingTransport {
    /// Creates a transport that delivers everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `connection_id` as gone: sends to it report
    /// `SendOutcome::RecipientGone`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn mark_gone(&self, connection_id: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(connection_id.to_owned(), Script::Gone);
    }

    /// Marks `connection_id` as broken: sends to it fail with
    /// `GameError::Connection`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn mark_broken(&self, connection_id: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(connection_id.to_owned(), Script::Broken);
    }

    /// Every attempted send as `(connection_id, payload)`, in call order.
    /// Gone and broken attempts are recorded too.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    /// Connection IDs that received a delivered frame.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn delivered_to(&self) -> Vec<String> {
        let scripts = self.scripts.lock().unwrap();
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| !scripts.contains_key(id))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, connection_id: &str, payload: &[u8]) -> Result<SendOutcome, GameError> {
        self.sent
            .lock()
            .unwrap()
            .push((connection_id.to_owned(), payload.to_vec()));

        match self.scripts.lock().unwrap().get(connection_id) {
            Some(Script::Gone) => Ok(SendOutcome::RecipientGone),
            Some(Script::Broken) => Err(GameError::Connection("channel closed abruptly".into())),
            None => Ok(SendOutcome::Delivered),
        }
    }
}
