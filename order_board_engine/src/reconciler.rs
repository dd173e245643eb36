//! # Order reconciler
//!
//! The reconciler merges a stream of order updates into an ordered collection of [`OrderRecord`]s.
//!
//! * An update for an order number that has not been seen before is appended to the end of the collection. It gets a
//!   fresh [`OrderId`], is stamped with the current time, and starts with a wait time of zero.
//! * An update for a known order number overwrites the origin-supplied fields of the existing record in place. The id,
//!   creation time, wait time and position of the record are preserved.
//!
//! Applying the same update more than once has no further effect. Wait times only change when [`OrderReconciler::tick`]
//! is called, which the host does on a fixed schedule.
use std::collections::HashMap;

use log::*;

use crate::{
    clock::{Clock, SystemClock},
    errors::MalformedMessage,
    order_objects::{OrderId, OrderRecord},
    wire::{BoardMessage, OrderUpdate},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted(OrderId),
    Updated(OrderId),
}

impl MergeOutcome {
    pub fn id(&self) -> &OrderId {
        match self {
            MergeOutcome::Inserted(id) | MergeOutcome::Updated(id) => id,
        }
    }
}

pub struct OrderReconciler<C = SystemClock> {
    orders: Vec<OrderRecord>,
    by_order_number: HashMap<String, usize>,
    by_id: HashMap<OrderId, usize>,
    clock: C,
}

impl Default for OrderReconciler<SystemClock> {
    fn default() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl OrderReconciler<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> OrderReconciler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { orders: Vec::new(), by_order_number: HashMap::new(), by_id: HashMap::new(), clock }
    }

    /// Merge a single order update into the collection.
    pub fn apply(&mut self, update: OrderUpdate) -> MergeOutcome {
        match self.by_order_number.get(&update.order_number) {
            Some(&index) => {
                let record = &mut self.orders[index];
                record.merge(update);
                trace!("🧾️ Order {} updated in place at position {index}", record.order_number);
                MergeOutcome::Updated(record.id.clone())
            },
            None => {
                let record = OrderRecord::new(update, self.clock.now());
                let index = self.orders.len();
                let id = record.id.clone();
                debug!("🧾️ New order {} (ticket {}) added as {id}", record.order_number, record.ticket_number);
                self.by_order_number.insert(record.order_number.clone(), index);
                self.by_id.insert(id.clone(), index);
                self.orders.push(record);
                MergeOutcome::Inserted(id)
            },
        }
    }

    /// Decode a raw relay payload and merge it.
    ///
    /// Returns `Ok(None)` for well-formed messages that carry no order update. Malformed payloads are logged and
    /// returned as an error, and leave the collection untouched.
    pub fn apply_payload(&mut self, payload: &str) -> Result<Option<MergeOutcome>, MalformedMessage> {
        match BoardMessage::decode(payload) {
            Ok(BoardMessage::OrderListUpdate(update)) => Ok(Some(self.apply(update))),
            Ok(BoardMessage::Unrecognized(kind)) => {
                debug!("🧾️ Ignoring message of type '{kind}'");
                Ok(None)
            },
            Err(e) => {
                warn!("🧾️ Discarding message. {e}");
                trace!("🧾️ Discarded payload: {payload}");
                Err(e)
            },
        }
    }

    /// Recompute every record's wait time from its creation time. Returns the number of records whose wait time
    /// changed.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut changed = 0;
        for record in &mut self.orders {
            let minutes = (now - record.created_at).num_minutes().max(0);
            if minutes != record.wait_time_minutes {
                record.wait_time_minutes = minutes;
                changed += 1;
            }
        }
        trace!("🧾️ Wait times refreshed. {changed} of {} orders changed", self.orders.len());
        changed
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn get(&self, id: &OrderId) -> Option<&OrderRecord> {
        self.by_id.get(id).map(|&i| &self.orders[i])
    }

    pub fn find_by_order_number(&self, order_number: &str) -> Option<&OrderRecord> {
        self.by_order_number.get(order_number).map(|&i| &self.orders[i])
    }

    pub fn contains(&self, id: &OrderId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
