//! Order book for a single trading pair
//!
//! Two priority-ordered sides: bids descending, asks ascending, FIFO
//! within a price level. The incoming side's counterpart is always the
//! "opposite" side here; the matching loop only ever touches the front
//! of the best opposing level.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::LevelEntry;

use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Side;

/// Both sides of one pair's book
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    bids: BidBook,
    asks: AskBook,
}

/// Depth snapshot for market-data consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    /// (price, total quantity) levels, best bid first
    pub bids: Vec<(Price, Quantity)>,
    /// (price, total quantity) levels, best ask first
    pub asks: Vec<(Price, Quantity)>,
}

impl OrderBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self {
            bids: BidBook::new(),
            asks: AskBook::new(),
        }
    }

    /// Rest an order on its own side
    pub fn insert(
        &mut self,
        side: Side,
        order_id: OrderId,
        price: Price,
        remaining: Quantity,
        arrived_at: i64,
    ) {
        match side {
            Side::BUY => self.bids.insert(order_id, price, remaining, arrived_at),
            Side::SELL => self.asks.insert(order_id, price, remaining, arrived_at),
        }
    }

    /// Remove a resting order from its side
    pub fn remove(&mut self, side: Side, order_id: &OrderId, price: Price) -> bool {
        match side {
            Side::BUY => self.bids.remove(order_id, price),
            Side::SELL => self.asks.remove(order_id, price),
        }
    }

    /// Best bid price and resting quantity
    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.bids.best_bid()
    }

    /// Best ask price and resting quantity
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.asks.best_ask()
    }

    /// Best price on the side opposing an incoming order
    pub fn best_opposite_price(&self, incoming_side: Side) -> Option<Price> {
        match incoming_side {
            Side::BUY => self.asks.best_ask_price(),
            Side::SELL => self.bids.best_bid_price(),
        }
    }

    /// Next maker for an incoming order: the oldest entry at the best
    /// opposing price
    pub fn peek_opposite(&self, incoming_side: Side) -> Option<(Price, LevelEntry)> {
        match incoming_side {
            Side::BUY => self.asks.peek_best(),
            Side::SELL => self.bids.peek_best(),
        }
    }

    /// Drop the fully filled maker at the front of the best opposing level
    pub fn pop_opposite_front(&mut self, incoming_side: Side) -> Option<LevelEntry> {
        match incoming_side {
            Side::BUY => self.asks.pop_best_front(),
            Side::SELL => self.bids.pop_best_front(),
        }
    }

    /// Shrink the partially filled maker at the front of the best
    /// opposing level
    pub fn reduce_opposite_front(&mut self, incoming_side: Side, new_remaining: Quantity) -> bool {
        match incoming_side {
            Side::BUY => self.asks.reduce_best_front(new_remaining),
            Side::SELL => self.bids.reduce_best_front(new_remaining),
        }
    }

    /// Depth snapshot, best-first on both sides
    pub fn snapshot(&self, symbol: &str, depth: usize) -> BookSnapshot {
        BookSnapshot {
            symbol: symbol.to_string(),
            bids: self.bids.depth_snapshot(depth),
            asks: self.asks.depth_snapshot(depth),
        }
    }

    /// Check if both sides are empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
