//! Price level with FIFO queue
//!
//! A price level holds every resting order at one price, ordered by
//! arrival time: the front of the queue is always the oldest order, so
//! ties in price are broken strictly by earlier arrival. Insertion is by
//! arrival timestamp, which keeps the ordering correct both for live
//! admission (append) and for book reconstruction from stored orders.

use std::collections::VecDeque;
use types::ids::OrderId;
use types::numeric::Quantity;

/// One resting order's footprint in the book
#[derive(Debug, Clone, Copy)]
pub struct LevelEntry {
    pub order_id: OrderId,
    pub remaining: Quantity,
    /// Original creation timestamp; the time-priority key
    pub arrived_at: i64,
}

/// All orders resting at a single price
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    /// Orders in arrival order (oldest at the front)
    orders: VecDeque<LevelEntry>,
    /// Total quantity resting at this level
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create an empty price level
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    /// Insert an entry at its arrival-time position
    ///
    /// Live admission always appends (newest arrival); reconstruction may
    /// insert out of order and still ends up FIFO-correct.
    pub fn insert(&mut self, entry: LevelEntry) {
        let position = self
            .orders
            .iter()
            .position(|e| e.arrived_at > entry.arrived_at);
        match position {
            Some(index) => self.orders.insert(index, entry),
            None => self.orders.push_back(entry),
        }
        self.total_quantity = self.total_quantity + entry.remaining;
    }

    /// Remove an order by id; returns its remaining quantity if found
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Quantity> {
        let position = self.orders.iter().position(|e| &e.order_id == order_id)?;
        let entry = self.orders.remove(position)?;
        self.total_quantity = self.total_quantity.saturating_sub(entry.remaining);
        Some(entry.remaining)
    }

    /// Oldest entry at this level
    pub fn peek_front(&self) -> Option<LevelEntry> {
        self.orders.front().copied()
    }

    /// Remove and return the oldest entry
    pub fn pop_front(&mut self) -> Option<LevelEntry> {
        let entry = self.orders.pop_front()?;
        self.total_quantity = self.total_quantity.saturating_sub(entry.remaining);
        Some(entry)
    }

    /// Set the front entry's remaining quantity after a partial fill;
    /// a zero quantity removes the entry
    pub fn reduce_front(&mut self, new_remaining: Quantity) -> bool {
        let Some(entry) = self.orders.front_mut() else {
            return false;
        };
        let old_remaining = entry.remaining;
        if new_remaining.is_zero() {
            self.orders.pop_front();
        } else {
            entry.remaining = new_remaining;
        }
        self.total_quantity = self
            .total_quantity
            .saturating_sub(old_remaining)
            + new_remaining;
        true
    }

    /// Check if the level holds no orders
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Total quantity resting at this level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
