//! Realtime row-change delivery.
//!
//! A [`RealtimeClient`] opens a websocket, joins a channel filtered to one
//! table and one user, and hands back a [`Subscription`] that yields the
//! inserted rows until it is cancelled or dropped.

mod client;
mod error;
pub mod protocol;
mod subscription;

pub use client::{HEARTBEAT_INTERVAL, RealtimeClient};
pub use error::RealtimeError;
pub use protocol::{ChangeEvent, ChangeFilter};
pub use subscription::Subscription;
