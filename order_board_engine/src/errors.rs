use thiserror::Error;

use crate::order_objects::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed message. {0}")]
pub struct MalformedMessage(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    MalformedMessage(#[from] MalformedMessage),
    #[error("Ticket {ticket_number} has not been paid for and cannot be cleared from the board.")]
    PolicyViolation { id: OrderId, ticket_number: i64 },
    #[error("No order with id {0} is on the board.")]
    UnknownOrder(OrderId),
    #[error("Order {0} is already hidden.")]
    AlreadyHidden(OrderId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Invalid relay address '{address}'. {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("No relay address has been configured.")]
    NotConfigured,
    #[error("Relay connection failed. {0}")]
    Transport(String),
}

impl ConnectionError {
    pub fn invalid_address<S: Into<String>>(address: &str, reason: S) -> Self {
        Self::InvalidAddress { address: address.to_string(), reason: reason.into() }
    }
}
