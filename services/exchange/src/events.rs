//! Event publication
//!
//! The core emits events on an unbounded channel; whoever owns the
//! receiving end (websocket fan-out, message queue bridge) handles
//! delivery. A missing consumer never stalls or fails the core.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use types::events::ExchangeEvent;

/// Sending half of the notification seam
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: UnboundedSender<ExchangeEvent>,
}

impl EventBus {
    /// Create a bus and the receiver the notification sink consumes
    pub fn channel() -> (Self, UnboundedReceiver<ExchangeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publish one event; a dropped receiver is not the core's problem
    pub fn publish(&self, event: ExchangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Publish a batch in order
    pub fn publish_all(&self, events: Vec<ExchangeEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use types::ids::{AccountId, MarketId};
    use types::numeric::{Price, Quantity};
    use types::order::{FeeSnapshot, Order, Side};

    fn make_order() -> Order {
        Order::limit(
            AccountId::new(),
            MarketId::new("BTC/USDT"),
            Side::BUY,
            Price::from_u64(100),
            Quantity::from_str("1.0").unwrap(),
            FeeSnapshot {
                maker_rate: Decimal::ZERO,
                taker_rate: Decimal::ZERO,
            },
            1708123456789000000,
        )
    }

    #[test]
    fn test_events_arrive_in_order() {
        let (bus, mut rx) = EventBus::channel();
        let order = make_order();
        bus.publish_all(vec![
            ExchangeEvent::OrderCreated(order.clone()),
            ExchangeEvent::OrderCancelled(order),
        ]);

        assert!(matches!(
            rx.try_recv().unwrap(),
            ExchangeEvent::OrderCreated(_)
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ExchangeEvent::OrderCancelled(_)
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_receiver_is_harmless() {
        let (bus, rx) = EventBus::channel();
        drop(rx);
        bus.publish(ExchangeEvent::OrderCreated(make_order()));
    }
}
