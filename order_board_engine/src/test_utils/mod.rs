//! Helpers for exercising the engine in tests without a relay or real time passing.
mod clock;
mod orders;
mod prepare_env;

pub use clock::ManualClock;
pub use orders::{drink, order_payload, order_update};
pub use prepare_env::prepare_test_env;
