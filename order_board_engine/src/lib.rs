//! Order Board Engine
//!
//! The order board is a real-time display of open orders. Order events produced by a point-of-sale system are pushed
//! through a relay server to every connected dashboard. This library holds the dashboard side of that system. It is
//! transport-agnostic apart from the [`connection`] module.
//!
//! The library is divided into these sections:
//! 1. Wire decoding ([`mod@wire`]). Raw relay payloads are decoded into a tagged [`wire::BoardMessage`], or rejected
//!    as a [`MalformedMessage`].
//! 2. Reconciliation ([`mod@reconciler`]). Order updates are merged into an ordered collection of
//!    [`order_objects::OrderRecord`]s keyed on the order number. Identity, creation time and position are stable.
//! 3. Projection ([`mod@view`], [`mod@hidden`], [`mod@fade`]). The visible page of orders is derived from the
//!    reconciled orders plus the local hide/search/page state.
//! 4. The [`OrderBoard`] facade, which ties the above together the way a dashboard host uses them.
//! 5. Connection supervision ([`mod@connection`]). Manages the single outbound relay connection and reports its status.
pub mod board;
pub mod clock;
pub mod config;
pub mod connection;
pub mod errors;
pub mod fade;
pub mod hidden;
pub mod order_objects;
pub mod reconciler;
pub mod view;
pub mod wire;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use board::OrderBoard;
pub use clock::{Clock, SystemClock};
pub use config::{BoardConfig, HiddenUpdatePolicy};
pub use connection::{ConnectionStatus, ConnectionSupervisor, LinkEvent, LinkEventKind, RelayEndpoint};
pub use errors::{BoardError, ConnectionError, MalformedMessage};
pub use reconciler::{MergeOutcome, OrderReconciler};
