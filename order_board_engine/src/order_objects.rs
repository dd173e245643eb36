use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::{OrderUpdate, WireItem};

//--------------------------------------       OrderId        ---------------------------------------------------------
/// The synthetic identity of an order on the board.
///
/// It is derived from the order number and the time the order was first seen, and is generated exactly once per
/// logical order. Later updates to the same order never produce a new id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(order_number: &str, first_seen: DateTime<Utc>) -> Self {
        Self(format!("ws_order_{order_number}_{}", first_seen.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------      OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub ice: String,
    pub sugar: String,
    /// Add-ons, in the order the origin listed them
    pub options: Vec<String>,
    pub eco_cup: Option<String>,
}

impl OrderItem {
    /// Case-insensitive match against an already lower-cased search needle
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }

    /// A one-line description, e.g. `Black tea x2 (Less ice / Half sugar / Pearls、Pudding)`
    pub fn summary(&self) -> String {
        let mut s = format!("{} x{} ({} / {}", self.name, self.quantity, self.ice, self.sugar);
        if !self.options.is_empty() {
            s.push_str(" / ");
            s.push_str(&self.options.join("、"));
        }
        s.push(')');
        if let Some(cup) = &self.eco_cup {
            s.push_str(&format!(" [eco cup: {cup}]"));
        }
        s
    }
}

impl From<WireItem> for OrderItem {
    fn from(item: WireItem) -> Self {
        // Either spelling may be used by the origin. The precedence matches what the origin's own screens display.
        let ice = item.ice.or(item.ice_level).unwrap_or_default();
        let sugar = item.sugar_level.or(item.sugar).unwrap_or_default();
        let options = item.options.unwrap_or_default().into_iter().map(|o| o.name).collect();
        Self { name: item.name, quantity: item.quantity, ice, sugar, options, eco_cup: item.eco_cup }
    }
}

//--------------------------------------     OrderRecord      ---------------------------------------------------------
/// The reconciled, de-duplicated representation of one business order on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    /// The business key. Updates are matched to records using this field.
    pub order_number: String,
    pub ticket_number: i64,
    pub items: Vec<OrderItem>,
    /// When the board first saw this order. Never changes after insertion.
    pub created_at: DateTime<Utc>,
    /// Whole minutes since `created_at`, as of the last wait-time tick.
    pub wait_time_minutes: i64,
    pub is_paid: bool,
}

impl OrderRecord {
    /// Creates a brand-new record for an order first seen at `now`.
    pub fn new(update: OrderUpdate, now: DateTime<Utc>) -> Self {
        let id = OrderId::new(&update.order_number, now);
        Self {
            id,
            order_number: update.order_number,
            ticket_number: update.ticket_number,
            items: update.items.into_iter().map(OrderItem::from).collect(),
            created_at: now,
            wait_time_minutes: 0,
            is_paid: update.is_paid,
        }
    }

    /// Overwrites the origin-supplied fields with those in `update`. Identity, creation time and wait time are left
    /// untouched.
    pub fn merge(&mut self, update: OrderUpdate) {
        self.order_number = update.order_number;
        self.ticket_number = update.ticket_number;
        self.items = update.items.into_iter().map(OrderItem::from).collect();
        self.is_paid = update.is_paid;
    }

    pub fn is_long_wait(&self, threshold_minutes: i64) -> bool {
        self.wait_time_minutes > threshold_minutes
    }

    /// True if the ticket number or any item name contains `needle`. The needle must already be lower-cased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.ticket_number.to_string().contains(needle) || self.items.iter().any(|i| i.name_contains(needle))
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::test_utils::{drink, order_update};

    #[test]
    fn order_id_is_derived_from_number_and_first_seen() {
        let t0 = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(OrderId::new("105", t0).as_str(), "ws_order_105_1700000000123");
    }

    #[test]
    fn item_summary() {
        let mut item = OrderItem::from(drink("Black tea", 2));
        assert_eq!(item.summary(), "Black tea x2 (Less ice / Half sugar)");
        item.options = vec!["Pearls".into(), "Pudding".into()];
        item.eco_cup = Some("yes".into());
        assert_eq!(item.summary(), "Black tea x2 (Less ice / Half sugar / Pearls、Pudding) [eco cup: yes]");
    }

    #[test]
    fn alternate_spellings_of_ice_and_sugar() {
        let mut w = drink("Green tea", 1);
        w.ice = None;
        w.ice_level = Some("No ice".into());
        w.sugar = Some("ignored".into());
        w.sugar_level = Some("Full sugar".into());
        let item = OrderItem::from(w);
        assert_eq!(item.ice, "No ice");
        assert_eq!(item.sugar, "Full sugar");
    }

    #[test]
    fn search_matches_ticket_or_item_name() {
        let now = Utc::now();
        let rec = OrderRecord::new(order_update("7", 42, true, vec![drink("Oolong Milk Tea", 1)]), now);
        assert!(rec.matches_search("42"));
        assert!(rec.matches_search("4"));
        assert!(rec.matches_search("milk"));
        assert!(!rec.matches_search("latte"));
        assert!(!rec.matches_search("7"));
    }

    #[test]
    fn long_wait_is_strict() {
        let mut rec = OrderRecord::new(order_update("1", 1, true, vec![]), Utc::now());
        rec.wait_time_minutes = 5;
        assert!(!rec.is_long_wait(5));
        rec.wait_time_minutes = 6;
        assert!(rec.is_long_wait(5));
    }
}
