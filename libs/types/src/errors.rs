//! Error taxonomy for the matching and settlement core
//!
//! Validation and funds errors are local: reported to the caller with no
//! side effects. Settlement errors are internal and must never surface a
//! half-applied state. Invariant violations indicate a bug upstream and
//! are alarmed, never silently corrected.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons an order fails admission validation
///
/// All of these are raised before any funds are touched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderRejectReason {
    #[error("unknown trading pair: {symbol}")]
    PairNotFound { symbol: String },

    #[error("trading pair {symbol} is not active")]
    PairInactive { symbol: String },

    #[error("price {price} outside [{min}, {max}]")]
    PriceOutOfRange {
        price: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("price has {scale} decimals, pair allows {max_scale}")]
    PricePrecision { scale: u32, max_scale: u32 },

    #[error("amount {amount} below minimum {min}")]
    AmountTooSmall { amount: Decimal, min: Decimal },

    #[error("amount has {scale} decimals, pair allows {max_scale}")]
    AmountPrecision { scale: u32, max_scale: u32 },

    #[error("notional {notional} below minimum {min}")]
    NotionalTooSmall { notional: Decimal, min: Decimal },

    #[error("limit order requires a price")]
    MissingLimitPrice,

    #[error("market order has no price cap and no opposite liquidity to price against")]
    NoMarketPrice,
}

/// Wallet ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("insufficient {asset}: required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("balance invariant violated for {asset}: {detail}")]
    InvariantViolation { asset: String, detail: String },

    #[error("no {asset} wallet for account {account_id}")]
    WalletNotFound { account_id: String, asset: String },

    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },
}

/// Order access and lifecycle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("caller does not own order {order_id}")]
    Unauthorized { order_id: String },

    #[error("order {order_id} is in state {status}")]
    InvalidState { order_id: String, status: String },

    #[error("fill of {requested} exceeds remaining {remaining} on order {order_id}")]
    InvalidFill {
        order_id: String,
        requested: Decimal,
        remaining: Decimal,
    },
}

/// Settlement errors
///
/// Fatal for the match attempt that raised them; the affected order is
/// removed from automatic matching until operator intervention.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettlementError {
    #[error("settlement failed for trade {trade_id}: {reason}")]
    Failed { trade_id: String, reason: String },
}

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderRejectReason),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("settlement error: {0}")]
    Settlement(#[from] SettlementError),
}

impl EngineError {
    /// True for the funds-rejection class (no order admitted, no funds moved)
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, EngineError::Ledger(LedgerError::InsufficientFunds { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_reason_display() {
        let err = OrderRejectReason::AmountTooSmall {
            amount: Decimal::from_str_exact("0.0001").unwrap(),
            min: Decimal::from_str_exact("0.001").unwrap(),
        };
        assert_eq!(err.to_string(), "amount 0.0001 below minimum 0.001");
    }

    #[test]
    fn test_ledger_error_insufficient_funds() {
        let err = LedgerError::InsufficientFunds {
            asset: "BTC".to_string(),
            required: Decimal::from_str_exact("1.5").unwrap(),
            available: Decimal::ONE,
        };
        assert!(err.to_string().contains("BTC"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_engine_error_from_reject_reason() {
        let reason = OrderRejectReason::MissingLimitPrice;
        let engine_err: EngineError = reason.into();
        assert!(matches!(engine_err, EngineError::InvalidOrder(_)));
    }

    #[test]
    fn test_is_insufficient_funds() {
        let err: EngineError = LedgerError::InsufficientFunds {
            asset: "USDT".to_string(),
            required: Decimal::from(100),
            available: Decimal::from(50),
        }
        .into();
        assert!(err.is_insufficient_funds());

        let other: EngineError = OrderRejectReason::MissingLimitPrice.into();
        assert!(!other.is_insufficient_funds());
    }

    #[test]
    fn test_reject_reason_serialization() {
        let reason = OrderRejectReason::PairInactive {
            symbol: "BTC/USDT".to_string(),
        };
        let json = serde_json::to_string(&reason).unwrap();
        let back: OrderRejectReason = serde_json::from_str(&json).unwrap();
        assert_eq!(reason, back);
    }
}
