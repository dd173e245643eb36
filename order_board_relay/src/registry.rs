//! The set of open relay sessions.
//!
//! [`SessionRegistry`] is a plain owned collection. It does no locking of its own: it is owned by the
//! [`RelayHub`](crate::hub::RelayHub) actor, whose mailbox serializes every add, remove and broadcast. A broadcast
//! therefore always sees a consistent set of sessions.
use std::{
    collections::BTreeMap,
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use actix::{prelude::*, Recipient};
use bytes::Bytes;
use log::*;
use thiserror::Error;

//--------------------------------------      SessionId       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Hands out process-wide unique, increasing session ids
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------      RelayFrame      ---------------------------------------------------------
/// A message payload, exactly as a client sent it
#[derive(Message, Debug, Clone, PartialEq, Eq)]
#[rtype(result = "()")]
pub enum RelayFrame {
    Text(String),
    Binary(Bytes),
}

impl RelayFrame {
    pub fn len(&self) -> usize {
        match self {
            RelayFrame::Text(s) => s.len(),
            RelayFrame::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//--------------------------------------     SessionSink      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Session message queue is closed")]
    Closed,
}

/// The sending half of a session, as seen by the registry
pub trait SessionSink {
    fn is_open(&self) -> bool;
    fn deliver(&self, frame: RelayFrame) -> Result<(), DeliveryError>;
}

impl SessionSink for Recipient<RelayFrame> {
    fn is_open(&self) -> bool {
        self.connected()
    }

    /// Queues the frame regardless of how many are already waiting. A slow session never loses frames; only a
    /// closed one does.
    fn deliver(&self, frame: RelayFrame) -> Result<(), DeliveryError> {
        if !self.connected() {
            return Err(DeliveryError::Closed);
        }
        self.do_send(frame);
        Ok(())
    }
}

//--------------------------------------   SessionRegistry    ---------------------------------------------------------
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Sessions that were already closed when the broadcast reached them
    pub skipped: usize,
    pub failed: usize,
}

pub struct SessionRegistry<S> {
    sessions: BTreeMap<SessionId, S>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self { sessions: BTreeMap::new() }
    }
}

impl<S: SessionSink> SessionRegistry<S> {
    /// Adds a session. Returns false if a session with the same id was replaced.
    pub fn add(&mut self, id: SessionId, session: S) -> bool {
        self.sessions.insert(id, session).is_none()
    }

    pub fn remove(&mut self, id: SessionId) -> Option<S> {
        self.sessions.remove(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Delivers `frame` to every open session except `sender`, in session id order. A failed delivery is logged and
    /// the broadcast carries on with the remaining sessions.
    pub fn broadcast(&self, sender: SessionId, frame: &RelayFrame) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for (&id, session) in self.sessions.iter().filter(|(id, _)| **id != sender) {
            if !session.is_open() {
                trace!("📡️ Session {id} is closed. Skipping it.");
                report.skipped += 1;
                continue;
            }
            match session.deliver(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("📡️ Could not relay message from {sender} to {id}. {e}");
                    report.failed += 1;
                },
            }
        }
        report
    }

    /// Drops sessions that are no longer open. Returns the number removed.
    pub fn prune_closed(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.is_open());
        before - self.sessions.len()
    }
}
