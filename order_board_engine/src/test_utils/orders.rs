use crate::wire::{OrderUpdate, WireItem};

pub fn drink(name: &str, quantity: u32) -> WireItem {
    WireItem {
        name: name.to_string(),
        quantity,
        ice: Some("Less ice".to_string()),
        sugar: Some("Half sugar".to_string()),
        ..Default::default()
    }
}

pub fn order_update(order_number: &str, ticket_number: i64, is_paid: bool, items: Vec<WireItem>) -> OrderUpdate {
    OrderUpdate { order_number: order_number.to_string(), ticket_number, is_paid, items }
}

/// A complete `order_list_update` payload, as the relay would deliver it
pub fn order_payload(order_number: &str, ticket_number: i64, is_paid: bool, items: Vec<WireItem>) -> String {
    order_update(order_number, ticket_number, is_paid, items).to_message().expect("order update serializes")
}
