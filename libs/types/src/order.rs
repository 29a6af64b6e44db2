//! Order lifecycle types
//!
//! An order moves `Open → {PartiallyFilled → Filled | Cancelled}` once
//! admitted; validation failures end in `Rejected`, and a failed
//! settlement parks the order in `NeedsReview` for operator resolution.
//! Terminal orders are never deleted.

use crate::errors::{OrderError, OrderRejectReason};
use crate::ids::{AccountId, MarketId, OrderId};
use crate::market::TradingPair;
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order pricing type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Executes at the limit price or better; the remainder rests
    LIMIT,
    /// Executes against available liquidity; never rests
    MARKET,
}

/// Order status
///
/// `NeedsReview` is terminal for automatic matching: it is only reached
/// from a failed settlement and requires operator intervention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum OrderStatus {
    /// Admitted, no fills yet
    #[serde(rename = "OPEN")]
    Open,

    /// Partially matched
    #[serde(rename = "PARTIALLY_FILLED")]
    PartiallyFilled,

    /// Completely matched (terminal)
    #[serde(rename = "FILLED")]
    Filled,

    /// Cancelled by user or system (terminal)
    #[serde(rename = "CANCELLED")]
    Cancelled,

    /// Failed admission validation (terminal)
    #[serde(rename = "REJECTED")]
    Rejected(OrderRejectReason),

    /// Settlement failed mid-match; frozen until operator resolution (terminal)
    #[serde(rename = "NEEDS_REVIEW")]
    NeedsReview,
}

impl OrderStatus {
    /// Check if status is terminal (no further automatic transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled
                | OrderStatus::Cancelled
                | OrderStatus::Rejected(_)
                | OrderStatus::NeedsReview
        )
    }

    /// Only `Open` and `PartiallyFilled` orders may be cancelled
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::PartiallyFilled)
    }
}

/// Fee rates captured on the order at creation time
///
/// A resting order keeps the rates it was admitted under; later
/// administrative fee-schedule changes never reprice it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSnapshot {
    pub maker_rate: Decimal,
    pub taker_rate: Decimal,
}

impl From<&TradingPair> for FeeSnapshot {
    fn from(pair: &TradingPair) -> Self {
        Self {
            maker_rate: pair.maker_fee_rate,
            taker_rate: pair.taker_fee_rate,
        }
    }
}

/// Complete order structure
///
/// `filled_amount + remaining_amount == amount` holds across every
/// mutation; `created_at` is the time-priority key in the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub symbol: MarketId,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price; present for LIMIT, absent for MARKET
    pub price: Option<Price>,
    pub amount: Quantity,
    pub filled_amount: Quantity,
    pub remaining_amount: Quantity,
    pub status: OrderStatus,
    pub fees: FeeSnapshot,
    pub created_at: i64, // Unix nanos; time-priority key
    pub updated_at: i64, // Unix nanos
}

impl Order {
    /// Create a new open limit order
    pub fn limit(
        account_id: AccountId,
        symbol: MarketId,
        side: Side,
        price: Price,
        amount: Quantity,
        fees: FeeSnapshot,
        timestamp: i64,
    ) -> Self {
        Self::new_inner(
            account_id,
            symbol,
            side,
            OrderType::LIMIT,
            Some(price),
            amount,
            fees,
            timestamp,
        )
    }

    /// Create a new open market order
    pub fn market(
        account_id: AccountId,
        symbol: MarketId,
        side: Side,
        amount: Quantity,
        fees: FeeSnapshot,
        timestamp: i64,
    ) -> Self {
        Self::new_inner(
            account_id,
            symbol,
            side,
            OrderType::MARKET,
            None,
            amount,
            fees,
            timestamp,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new_inner(
        account_id: AccountId,
        symbol: MarketId,
        side: Side,
        order_type: OrderType,
        price: Option<Price>,
        amount: Quantity,
        fees: FeeSnapshot,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            account_id,
            symbol,
            side,
            order_type,
            price,
            amount,
            filled_amount: Quantity::zero(),
            remaining_amount: amount,
            status: OrderStatus::Open,
            fees,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Check quantity invariant: filled + remaining = total
    pub fn check_invariant(&self) -> bool {
        self.filled_amount.as_decimal() + self.remaining_amount.as_decimal()
            == self.amount.as_decimal()
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_amount == self.amount
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        !self.filled_amount.is_zero()
    }

    /// Apply a fill, adjusting quantities and status
    ///
    /// A fill exceeding the remaining amount indicates a matching bug;
    /// it is reported, never applied.
    pub fn add_fill(&mut self, fill: Quantity, timestamp: i64) -> Result<(), OrderError> {
        if fill > self.remaining_amount {
            return Err(OrderError::InvalidFill {
                order_id: self.order_id.to_string(),
                requested: fill.as_decimal(),
                remaining: self.remaining_amount.as_decimal(),
            });
        }

        self.filled_amount = self.filled_amount + fill;
        self.remaining_amount = self.remaining_amount.saturating_sub(fill);

        if self.is_filled() {
            self.status = OrderStatus::Filled;
        } else if self.has_fills() {
            self.status = OrderStatus::PartiallyFilled;
        }

        self.updated_at = timestamp;
        Ok(())
    }

    /// Cancel the order; fails on terminal states
    pub fn cancel(&mut self, timestamp: i64) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidState {
                order_id: self.order_id.to_string(),
                status: format!("{:?}", self.status),
            });
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
        Ok(())
    }

    /// Mark the order rejected at admission
    pub fn reject(&mut self, reason: OrderRejectReason, timestamp: i64) {
        self.status = OrderStatus::Rejected(reason);
        self.updated_at = timestamp;
    }

    /// Freeze the order after a failed settlement
    pub fn mark_needs_review(&mut self, timestamp: i64) {
        self.status = OrderStatus::NeedsReview;
        self.updated_at = timestamp;
    }

    /// Finalize a market order after the match loop: the executed portion
    /// stands as filled, the unmet remainder is cancelled (market orders
    /// never rest)
    pub fn finalize_market(&mut self, timestamp: i64) {
        if self.is_filled() {
            return;
        }
        self.status = if self.has_fills() {
            OrderStatus::Filled
        } else {
            OrderStatus::Cancelled
        };
        self.updated_at = timestamp;
    }
}
