//! Ask (sell-side) order book
//!
//! Sell orders sorted by price ascending: the lowest ask matches first.
//! At each price level orders are FIFO by arrival time.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};

use super::price_level::{LevelEntry, PriceLevel};

/// Ask (sell) side of the book
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    /// Price levels; BTreeMap is ascending, so the best ask is the first key
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    /// Create an empty ask book
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert a resting order at its price level
    pub fn insert(&mut self, order_id: OrderId, price: Price, remaining: Quantity, arrived_at: i64) {
        self.levels
            .entry(price)
            .or_insert_with(PriceLevel::new)
            .insert(LevelEntry {
                order_id,
                remaining,
                arrived_at,
            });
    }

    /// Remove an order; returns true if it was found
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> bool {
        if let Some(level) = self.levels.get_mut(&price) {
            if level.remove(order_id).is_some() {
                if level.is_empty() {
                    self.levels.remove(&price);
                }
                return true;
            }
        }
        false
    }

    /// Best ask: lowest price and the total quantity resting there
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    /// Best ask price
    pub fn best_ask_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Oldest order at the best price: the next maker for a crossing buy
    pub fn peek_best(&self) -> Option<(Price, LevelEntry)> {
        self.levels
            .iter()
            .next()
            .and_then(|(price, level)| level.peek_front().map(|entry| (*price, entry)))
    }

    /// Remove the front order of the best level (fully filled maker)
    pub fn pop_best_front(&mut self) -> Option<LevelEntry> {
        let price = self.best_ask_price()?;
        let level = self.levels.get_mut(&price)?;
        let entry = level.pop_front();
        if level.is_empty() {
            self.levels.remove(&price);
        }
        entry
    }

    /// Shrink the front order of the best level after a partial fill
    pub fn reduce_best_front(&mut self, new_remaining: Quantity) -> bool {
        let Some(price) = self.best_ask_price() else {
            return false;
        };
        let Some(level) = self.levels.get_mut(&price) else {
            return false;
        };
        let reduced = level.reduce_front(new_remaining);
        if level.is_empty() {
            self.levels.remove(&price);
        }
        reduced
    }

    /// Top N price levels, best first
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Check if the ask book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
