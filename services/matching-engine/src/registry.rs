//! Trading pair registry and admission validation
//!
//! Read-mostly lookup by symbol. Validation runs before any funds are
//! reserved and returns the first failing check, so a rejected order is
//! always side-effect free.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use types::errors::OrderRejectReason;
use types::market::TradingPair;
use types::numeric::{Price, Quantity};

/// Registry of administered trading pairs
pub struct PairRegistry {
    pairs: RwLock<HashMap<String, TradingPair>>,
}

impl PairRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            pairs: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, TradingPair>> {
        self.pairs.read().expect("pair registry lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, TradingPair>> {
        self.pairs.write().expect("pair registry lock poisoned")
    }

    /// Register (or replace) a pair; administrative operation
    pub fn register(&self, pair: TradingPair) {
        self.write().insert(pair.symbol.as_str().to_string(), pair);
    }

    /// Soft-deactivate a pair; returns false if unknown
    pub fn deactivate(&self, symbol: &str) -> bool {
        match self.write().get_mut(symbol) {
            Some(pair) => {
                pair.deactivate();
                true
            }
            None => false,
        }
    }

    /// Replace a pair's live fee schedule; resting orders keep their
    /// captured snapshot
    pub fn update_fees(&self, symbol: &str, maker_rate: Decimal, taker_rate: Decimal) -> bool {
        match self.write().get_mut(symbol) {
            Some(pair) => {
                pair.maker_fee_rate = maker_rate;
                pair.taker_fee_rate = taker_rate;
                true
            }
            None => false,
        }
    }

    /// Look up a pair by symbol
    pub fn get(&self, symbol: &str) -> Result<TradingPair, OrderRejectReason> {
        self.read()
            .get(symbol)
            .cloned()
            .ok_or_else(|| OrderRejectReason::PairNotFound {
                symbol: symbol.to_string(),
            })
    }

    /// All registered symbols
    pub fn symbols(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }
}

impl Default for PairRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a candidate order against a pair's limits
///
/// `limit_price` is checked against bounds and precision only when
/// present (market orders carry none); `notional_price` is the price the
/// reservation will use, and prices the notional check for both order
/// types. Checks run in a fixed order and the first failure wins.
pub fn validate_limits(
    pair: &TradingPair,
    limit_price: Option<Price>,
    amount: Quantity,
    notional_price: Price,
) -> Result<(), OrderRejectReason> {
    // 1. Pair must be admitting orders
    if !pair.active {
        return Err(OrderRejectReason::PairInactive {
            symbol: pair.symbol.as_str().to_string(),
        });
    }

    // 2. Limit price bounds and precision
    if let Some(price) = limit_price {
        if !pair.price_in_bounds(price) {
            return Err(OrderRejectReason::PriceOutOfRange {
                price: price.as_decimal(),
                min: pair.min_price.as_decimal(),
                max: pair.max_price.as_decimal(),
            });
        }
        if price.scale() > pair.price_scale {
            return Err(OrderRejectReason::PricePrecision {
                scale: price.scale(),
                max_scale: pair.price_scale,
            });
        }
    }

    // 3. Amount floor and precision
    if amount < pair.min_amount {
        return Err(OrderRejectReason::AmountTooSmall {
            amount: amount.as_decimal(),
            min: pair.min_amount.as_decimal(),
        });
    }
    if amount.scale() > pair.amount_scale {
        return Err(OrderRejectReason::AmountPrecision {
            scale: amount.scale(),
            max_scale: pair.amount_scale,
        });
    }

    // 4. Notional floor
    let notional = notional_price.as_decimal() * amount.as_decimal();
    if notional < pair.min_notional {
        return Err(OrderRejectReason::NotionalTooSmall {
            notional,
            min: pair.min_notional,
        });
    }

    Ok(())
}
