//! Relay payload decoding.
//!
//! The relay forwards payloads verbatim, so the dashboard is the first component that interprets them. Every payload
//! is decoded in a single step into either a known [`BoardMessage`] variant, or a [`MalformedMessage`] error. A
//! well-formed envelope with a `type` the dashboard does not know about decodes to [`BoardMessage::Unrecognized`] so
//! that newer origins can add message types without breaking older dashboards.
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::MalformedMessage;

pub const ORDER_LIST_UPDATE: &str = "order_list_update";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardMessage {
    OrderListUpdate(OrderUpdate),
    Unrecognized(String),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Serialize)]
struct OutgoingEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a OrderUpdate,
}

impl BoardMessage {
    pub fn decode(payload: &str) -> Result<Self, MalformedMessage> {
        let envelope: Envelope =
            serde_json::from_str(payload).map_err(|e| MalformedMessage(format!("Invalid envelope. {e}")))?;
        if envelope.kind != ORDER_LIST_UPDATE {
            return Ok(Self::Unrecognized(envelope.kind));
        }
        let data = envelope
            .data
            .ok_or_else(|| MalformedMessage(format!("{ORDER_LIST_UPDATE} message has no data field")))?;
        let update: OrderUpdate =
            serde_json::from_value(data).map_err(|e| MalformedMessage(format!("Invalid order update. {e}")))?;
        if update.order_number.trim().is_empty() {
            return Err(MalformedMessage("orderNumber is empty".to_string()));
        }
        Ok(Self::OrderListUpdate(update))
    }
}

//--------------------------------------     OrderUpdate      ---------------------------------------------------------
/// The `data` field of an `order_list_update` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(deserialize_with = "string_or_number")]
    pub order_number: String,
    #[serde(deserialize_with = "whole_number")]
    pub ticket_number: i64,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub items: Vec<WireItem>,
}

impl OrderUpdate {
    /// Wraps this update in an `order_list_update` envelope, ready to be sent to the relay.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&OutgoingEnvelope { kind: ORDER_LIST_UPDATE, data: self })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireItem {
    pub name: String,
    #[serde(deserialize_with = "whole_number")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco_cup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<WireOption>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOption {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

// Some origins send order numbers as bare JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => Ok(s),
        StringOrNumber::Number(n) => Ok(n.to_string()),
    }
}

// Counts may arrive as floats such as `2.0`. Anything with a fractional part, or out of range for the field, is
// rejected.
fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    let whole = n.as_i64().or_else(|| {
        n.as_f64().filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64).map(|f| f as i64)
    });
    let whole = whole.ok_or_else(|| DeError::custom(format!("{n} is not a whole number")))?;
    T::try_from(whole).map_err(|_| DeError::custom(format!("{n} is out of range")))
}

#[cfg(test)]
mod test {
    use super::*;

    const FULL: &str = r#"{
        "type": "order_list_update",
        "data": {
            "orderNumber": "105",
            "ticketNumber": 12,
            "isPaid": true,
            "items": [
                { "name": "Black tea", "quantity": 2, "ice": "Less ice", "sugar_level": "Half sugar",
                  "eco_cup": "yes", "options": [ { "name": "Pearls" }, { "name": "Pudding" } ] },
                { "name": "Green tea", "quantity": 1, "ice_level": "No ice", "sugar": "No sugar" }
            ]
        }
    }"#;

    #[test]
    fn decode_order_list_update() {
        let BoardMessage::OrderListUpdate(update) = BoardMessage::decode(FULL).unwrap() else {
            panic!("Expected an order update");
        };
        assert_eq!(update.order_number, "105");
        assert_eq!(update.ticket_number, 12);
        assert!(update.is_paid);
        assert_eq!(update.items.len(), 2);
        assert_eq!(update.items[0].sugar_level.as_deref(), Some("Half sugar"));
        assert_eq!(update.items[0].options.as_ref().map(|o| o.len()), Some(2));
        assert_eq!(update.items[1].ice_level.as_deref(), Some("No ice"));
    }

    #[test]
    fn defaults_for_optional_fields() {
        let msg = r#"{"type":"order_list_update","data":{"orderNumber":77,"ticketNumber":3}}"#;
        let BoardMessage::OrderListUpdate(update) = BoardMessage::decode(msg).unwrap() else {
            panic!("Expected an order update");
        };
        assert_eq!(update.order_number, "77");
        assert!(!update.is_paid);
        assert!(update.items.is_empty());
    }

    #[test]
    fn unknown_types_are_ignored() {
        let msg = r#"{"type":"menu_update","data":[1,2,3]}"#;
        assert_eq!(BoardMessage::decode(msg).unwrap(), BoardMessage::Unrecognized("menu_update".into()));
    }

    #[test]
    fn malformed_payloads() {
        let cases = [
            "ping",
            "{}",
            r#"{"type":"order_list_update"}"#,
            r#"{"type":"order_list_update","data":{"ticketNumber":3}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"1"}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"  ","ticketNumber":3}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"1","ticketNumber":"three"}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"1","ticketNumber":3,"items":[{"quantity":1}]}}"#,
        ];
        for case in cases {
            assert!(BoardMessage::decode(case).is_err(), "{case} should be rejected");
        }
    }

    #[test]
    fn outgoing_messages_decode_to_the_same_update() {
        let BoardMessage::OrderListUpdate(update) = BoardMessage::decode(FULL).unwrap() else {
            panic!("Expected an order update");
        };
        let msg = update.to_message().unwrap();
        assert!(msg.contains(r#""type":"order_list_update""#));
        assert_eq!(BoardMessage::decode(&msg).unwrap(), BoardMessage::OrderListUpdate(update));
    }

    #[test]
    fn whole_floats_are_accepted_as_counts() {
        let msg = r#"{"type":"order_list_update","data":{"orderNumber":"9","ticketNumber":7.0,
            "items":[{"name":"Taro slush","quantity":2.0},{"name":"Lemon tea","quantity":1}]}}"#;
        let BoardMessage::OrderListUpdate(update) = BoardMessage::decode(msg).unwrap() else {
            panic!("Expected an order update");
        };
        assert_eq!(update.ticket_number, 7);
        assert_eq!(update.items[0].quantity, 2);
        assert_eq!(update.items[1].quantity, 1);
        // Re-encoded as plain integers
        assert!(update.to_message().unwrap().contains(r#""ticketNumber":7,"#));
    }

    #[test]
    fn fractional_and_out_of_range_counts_are_malformed() {
        let cases = [
            r#"{"type":"order_list_update","data":{"orderNumber":"9","ticketNumber":7.5}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"9","ticketNumber":1e300}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"9","ticketNumber":1,"items":[{"name":"a","quantity":2.5}]}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"9","ticketNumber":1,"items":[{"name":"a","quantity":-1}]}}"#,
            r#"{"type":"order_list_update","data":{"orderNumber":"9","ticketNumber":1,"items":[{"name":"a","quantity":5e9}]}}"#,
        ];
        for case in cases {
            let err = BoardMessage::decode(case).unwrap_err();
            assert!(err.to_string().contains("Invalid order update"), "{case}: {err}");
        }
    }
}
