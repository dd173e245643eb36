use chrono::{DateTime, Utc};

/// A source of wall-clock time. The reconciler stamps and ages orders with whatever clock it is given, so that hosts
/// can drive it from real time and tests can drive it by hand.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
