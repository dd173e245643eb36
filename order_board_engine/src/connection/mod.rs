//! # Relay connection supervision
//!
//! The dashboard holds at most one connection to the relay at a time. [`ConnectionSupervisor`] owns that connection:
//! * [`ConnectionSupervisor::configure`] validates a target address without touching the network.
//! * [`ConnectionSupervisor::connect`] closes any existing connection and opens a new one.
//! * [`ConnectionSupervisor::teardown`] closes the connection. Dropping the supervisor does the same.
//!
//! The connection itself runs on a background task, which reports back through a channel of [`LinkEvent`]s. The host
//! feeds those events to [`ConnectionSupervisor::handle_event`] on its own event loop. Every connection gets a new
//! generation number, and events from superseded connections are discarded there, so a late message from an old
//! connection is never handed to the reconciler.
//!
//! There is no automatic reconnection. Once a connection is lost, it stays down until the host connects again.
mod endpoint;
mod supervisor;

pub use endpoint::{RelayEndpoint, RELAY_SCHEME};
pub use supervisor::{ConnectionStatus, ConnectionSupervisor, LinkEvent, LinkEventKind, StatusObserver};
