//! # Order board relay
//! The relay sits between the point-of-sale system and the order board dashboards. It is responsible for:
//! Accepting WebSocket connections from any number of clients.
//! Forwarding every message a client sends, unmodified, to every _other_ connected client.
//!
//! The relay does not interpret, validate, store or order messages. A client that is slow or has gone away never holds
//! up delivery to the others.
//!
//! ## Configuration
//! The relay is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/`: The WebSocket endpoint. Clients upgrade here and are then part of the broadcast group.
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/status`: Returns the number of connected sessions as JSON.

pub mod cli;
pub mod config;
pub mod errors;
pub mod hub;
pub mod registry;
pub mod routes;
pub mod server;
pub mod session;
