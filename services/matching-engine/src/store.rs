//! Shared order store
//!
//! All orders — open, resting, and terminal — live here. Terminal orders
//! are retained for audit and never physically deleted. The book only
//! holds (order id, remaining, arrival) footprints; this store is the
//! authoritative record, and is what the books are rebuilt from after a
//! restart.

use dashmap::DashMap;
use types::ids::{AccountId, MarketId, OrderId};
use types::order::{Order, Side};

/// Query filter for open-order lookups
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub symbol: Option<MarketId>,
    pub side: Option<Side>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        if let Some(symbol) = &self.symbol {
            if &order.symbol != symbol {
                return false;
            }
        }
        if let Some(side) = self.side {
            if order.side != side {
                return false;
            }
        }
        true
    }
}

/// Concurrent order store keyed by order id
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: DashMap<OrderId, Order>,
}

impl OrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }

    /// Insert or replace an order record
    pub fn upsert(&self, order: Order) {
        self.orders.insert(order.order_id, order);
    }

    /// Snapshot of one order
    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.orders.get(order_id).map(|entry| entry.value().clone())
    }

    /// All non-terminal orders (open or partially filled)
    pub fn open_orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| !entry.status.is_terminal())
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Non-terminal orders for one symbol; book-reconstruction input
    pub fn open_orders_for_symbol(&self, symbol: &MarketId) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| !entry.status.is_terminal() && &entry.symbol == symbol)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Non-terminal orders for one account, filtered
    pub fn open_orders_for(&self, account_id: AccountId, filter: &OrderFilter) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| {
                entry.account_id == account_id
                    && !entry.status.is_terminal()
                    && filter.matches(entry.value())
            })
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|o| o.created_at);
        orders
    }

    /// Number of stored orders, terminal included
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
