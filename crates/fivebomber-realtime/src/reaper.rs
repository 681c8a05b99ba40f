//! Background sweep of lapsed connection leases.
//!
//! Connections are leases: `put` stamps an expiry about an hour out, and
//! this loop deletes whatever is past due. Cleanup is eventually
//! consistent — readers between sweeps may still see expired records and
//! are expected to tolerate them.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use fivebomber_core::clock::Clock;
use fivebomber_core::repository::ConnectionRepository;

/// How often the reaper sweeps by default.
pub const REAP_INTERVAL: Duration = Duration::from_secs(300);

/// Runs the reap loop forever. Spawn it as a task; storage failures are
/// logged and the loop keeps going.
pub async fn run(
    connections: Arc<dyn ConnectionRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so startup stays quiet.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match connections.remove_expired(clock.now()).await {
            Ok(0) => debug!("connection reaper: nothing to sweep"),
            Ok(reaped) => debug!(reaped, "connection reaper: removed expired leases"),
            Err(error) => warn!(%error, "connection reaper sweep failed"),
        }
    }
}
