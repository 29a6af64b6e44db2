//! Trading pair metadata
//!
//! Administered per-market configuration: price bounds, minimum tradable
//! amount, minimum notional value, decimal precision, and fee schedule.
//! Pairs are created by administrators and soft-deactivated, never deleted.

use crate::ids::MarketId;
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-market configuration read by every order and trade operation
///
/// Fee rates here are the *live* schedule; orders capture a snapshot of
/// them at creation time, so changing a pair's rates never retroactively
/// alters resting orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    pub symbol: MarketId,
    /// Inclusive lower bound for limit prices
    pub min_price: Price,
    /// Inclusive upper bound for limit prices
    pub max_price: Price,
    /// Smallest tradable amount
    pub min_amount: Quantity,
    /// Smallest acceptable order value (price × amount), in quote
    pub min_notional: Decimal,
    /// Maximum fractional digits for prices
    pub price_scale: u32,
    /// Maximum fractional digits for amounts
    pub amount_scale: u32,
    pub maker_fee_rate: Decimal,
    pub taker_fee_rate: Decimal,
    pub active: bool,
    pub created_at: i64,
}

impl TradingPair {
    /// Create an active trading pair
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: MarketId,
        min_price: Price,
        max_price: Price,
        min_amount: Quantity,
        min_notional: Decimal,
        price_scale: u32,
        amount_scale: u32,
        maker_fee_rate: Decimal,
        taker_fee_rate: Decimal,
        timestamp: i64,
    ) -> Self {
        Self {
            symbol,
            min_price,
            max_price,
            min_amount,
            min_notional,
            price_scale,
            amount_scale,
            maker_fee_rate,
            taker_fee_rate,
            active: true,
            created_at: timestamp,
        }
    }

    /// Base asset of the pair
    pub fn base(&self) -> &str {
        self.symbol.base()
    }

    /// Quote asset of the pair
    pub fn quote(&self) -> &str {
        self.symbol.quote()
    }

    /// Soft-deactivate; the pair stops admitting orders but is retained
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Check a limit price against the configured bounds
    pub fn price_in_bounds(&self, price: Price) -> bool {
        price >= self.min_price && price <= self.max_price
    }
}
