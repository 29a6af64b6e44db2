//! Event payloads emitted to the notification sink
//!
//! Each event carries the full post-mutation record, so downstream
//! consumers never need a follow-up read. The core only emits events;
//! delivery is someone else's job.

use crate::order::Order;
use crate::trade::Trade;
use serde::{Deserialize, Serialize};

/// Events produced by order admission, matching, and cancellation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ExchangeEvent {
    /// Order admitted (funds reserved, pre-match snapshot)
    #[serde(rename = "ORDER_CREATED")]
    OrderCreated(Order),

    /// Order received a fill but has remaining amount
    #[serde(rename = "ORDER_PARTIALLY_FILLED")]
    OrderPartiallyFilled(Order),

    /// Order completely filled
    #[serde(rename = "ORDER_FILLED")]
    OrderFilled(Order),

    /// Order cancelled, reservation released
    #[serde(rename = "ORDER_CANCELLED")]
    OrderCancelled(Order),

    /// A match settled successfully
    #[serde(rename = "TRADE_EXECUTED")]
    TradeExecuted(Trade),
}

impl ExchangeEvent {
    /// Event for an order fill transition, chosen by the post-fill status
    pub fn for_fill(order: &Order) -> Self {
        if order.is_filled() {
            ExchangeEvent::OrderFilled(order.clone())
        } else {
            ExchangeEvent::OrderPartiallyFilled(order.clone())
        }
    }
}
