//! Five Bomber — realtime fan-out.
//!
//! The broadcaster delivers one message to every live connection in a room
//! and reclaims stale connections as it finds them; the reaper sweeps
//! lapsed leases in the background.

pub mod broadcaster;
pub mod reaper;

pub use broadcaster::Broadcaster;
