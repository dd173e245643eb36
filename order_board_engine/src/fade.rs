//! The two-phase hide transition.
//!
//! Hiding an order first marks it as fading, which a renderer uses to animate it away. Once the transition delay has
//! passed, the host commits the hide with the [`FadeToken`] it got when the fade began. A token is only honoured while
//! its fade is still pending: cancelling the fade, or starting a newer fade for the same order, turns the old token
//! into a no-op. This lets a restore or a shutdown abandon a pending commit safely, however the host schedules it.
use std::collections::HashMap;

use crate::order_objects::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FadeToken {
    id: OrderId,
    seq: u64,
}

impl FadeToken {
    pub fn id(&self) -> &OrderId {
        &self.id
    }
}

#[derive(Debug, Default)]
pub struct FadeTracker {
    pending: HashMap<OrderId, u64>,
    next_seq: u64,
}

impl FadeTracker {
    /// Marks `id` as fading. Any earlier pending fade for the same order is superseded.
    pub fn begin(&mut self, id: OrderId) -> FadeToken {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending.insert(id.clone(), seq);
        FadeToken { id, seq }
    }

    /// Ends the fade for the token's order. Returns false if the token is stale.
    pub fn complete(&mut self, token: &FadeToken) -> bool {
        match self.pending.get(&token.id) {
            Some(&seq) if seq == token.seq => {
                self.pending.remove(&token.id);
                true
            },
            _ => false,
        }
    }

    pub fn cancel(&mut self, id: &OrderId) -> bool {
        self.pending.remove(id).is_some()
    }

    /// Cancels every pending fade, returning the affected orders
    pub fn cancel_all(&mut self) -> Vec<OrderId> {
        self.pending.drain().map(|(id, _)| id).collect()
    }

    pub fn is_fading(&self, id: &OrderId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
