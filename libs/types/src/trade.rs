//! Trade execution types
//!
//! A trade is the immutable record of one match between a resting
//! (maker) order and an incoming (taker) order. Execution price is
//! always the maker's price; the taker never sets price.

use crate::ids::{AccountId, MarketId, OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade settlement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeState {
    /// Trade created, pending settlement
    MATCHED,
    /// Fully settled to wallets (terminal)
    SETTLED,
    /// Settlement failed; recorded for operator review (terminal)
    FAILED,
}

/// Immutable record of one match
///
/// Each side's fee is charged in the asset that side receives: the buyer
/// pays in base, the seller pays in quote. The fee amounts are computed
/// from the rate snapshots captured on the participating orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub sequence: u64, // Monotonic per-engine sequence
    pub symbol: MarketId,

    // Order references
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,

    // Account references
    pub maker_account_id: AccountId,
    pub taker_account_id: AccountId,

    /// Side of the incoming (taker) order
    pub taker_side: Side,
    /// Execution price — the maker's price
    pub price: Price,
    pub quantity: Quantity,

    // Fees, each in the asset the side receives
    pub maker_fee: Decimal,
    pub maker_fee_asset: String,
    pub taker_fee: Decimal,
    pub taker_fee_asset: String,

    pub executed_at: i64, // Unix nanos
    pub settled_at: Option<i64>,

    pub state: TradeState,
}

impl Trade {
    /// Create a new matched trade
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        symbol: MarketId,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker_account_id: AccountId,
        taker_account_id: AccountId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        maker_fee: Decimal,
        maker_fee_asset: String,
        taker_fee: Decimal,
        taker_fee_asset: String,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            symbol,
            maker_order_id,
            taker_order_id,
            maker_account_id,
            taker_account_id,
            taker_side,
            price,
            quantity,
            maker_fee,
            maker_fee_asset,
            taker_fee,
            taker_fee_asset,
            executed_at,
            settled_at: None,
            state: TradeState::MATCHED,
        }
    }

    /// Mark trade as settled
    pub fn settle(&mut self, timestamp: i64) {
        self.state = TradeState::SETTLED;
        self.settled_at = Some(timestamp);
    }

    /// Mark trade as failed (settlement could not be applied)
    pub fn fail(&mut self) {
        self.state = TradeState::FAILED;
    }

    /// Quote-currency value of the trade (price × quantity)
    pub fn quote_value(&self) -> Decimal {
        self.quantity.as_decimal() * self.price.as_decimal()
    }

    /// Check if trade is settled
    pub fn is_settled(&self) -> bool {
        matches!(self.state, TradeState::SETTLED)
    }

    /// Account on the buying side of the trade
    pub fn buyer_account_id(&self) -> AccountId {
        match self.taker_side {
            Side::BUY => self.taker_account_id,
            Side::SELL => self.maker_account_id,
        }
    }

    /// Account on the selling side of the trade
    pub fn seller_account_id(&self) -> AccountId {
        match self.taker_side {
            Side::BUY => self.maker_account_id,
            Side::SELL => self.taker_account_id,
        }
    }

    /// Order on the buying side of the trade
    pub fn buyer_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::BUY => self.taker_order_id,
            Side::SELL => self.maker_order_id,
        }
    }

    /// Order on the selling side of the trade
    pub fn seller_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::BUY => self.maker_order_id,
            Side::SELL => self.taker_order_id,
        }
    }

    /// Fee charged to the buying side, in base
    pub fn buyer_fee(&self) -> Decimal {
        match self.taker_side {
            Side::BUY => self.taker_fee,
            Side::SELL => self.maker_fee,
        }
    }

    /// Fee charged to the selling side, in quote
    pub fn seller_fee(&self) -> Decimal {
        match self.taker_side {
            Side::BUY => self.maker_fee,
            Side::SELL => self.taker_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade(taker_side: Side) -> Trade {
        Trade::new(
            1000,
            MarketId::new("BTC/USDT"),
            OrderId::new(),
            OrderId::new(),
            AccountId::new(),
            AccountId::new(),
            taker_side,
            Price::from_u64(50000),
            Quantity::from_str("0.5").unwrap(),
            Decimal::from(25),
            "USDT".to_string(),
            Decimal::from_str_exact("0.001").unwrap(),
            "BTC".to_string(),
            1708123456789000000,
        )
    }

    #[test]
    fn test_trade_creation() {
        let trade = make_trade(Side::BUY);
        assert_eq!(trade.state, TradeState::MATCHED);
        assert!(!trade.is_settled());
        assert_eq!(trade.sequence, 1000);
    }

    #[test]
    fn test_trade_settlement() {
        let mut trade = make_trade(Side::BUY);
        trade.settle(1708123456790000000);
        assert_eq!(trade.state, TradeState::SETTLED);
        assert!(trade.is_settled());
        assert!(trade.settled_at.is_some());
    }

    #[test]
    fn test_quote_value() {
        let trade = make_trade(Side::BUY);
        assert_eq!(trade.quote_value(), Decimal::from(25000));
    }

    #[test]
    fn test_buyer_seller_mapping_taker_buy() {
        let trade = make_trade(Side::BUY);
        assert_eq!(trade.buyer_account_id(), trade.taker_account_id);
        assert_eq!(trade.seller_account_id(), trade.maker_account_id);
        assert_eq!(trade.buyer_order_id(), trade.taker_order_id);
        assert_eq!(trade.seller_order_id(), trade.maker_order_id);
        // Taker buys, so the taker fee is the buyer fee (in base)
        assert_eq!(trade.buyer_fee(), trade.taker_fee);
        assert_eq!(trade.seller_fee(), trade.maker_fee);
    }

    #[test]
    fn test_buyer_seller_mapping_taker_sell() {
        let trade = make_trade(Side::SELL);
        assert_eq!(trade.buyer_account_id(), trade.maker_account_id);
        assert_eq!(trade.seller_account_id(), trade.taker_account_id);
        assert_eq!(trade.buyer_fee(), trade.maker_fee);
        assert_eq!(trade.seller_fee(), trade.taker_fee);
    }

    #[test]
    fn test_failed_trade_is_not_settled() {
        let mut trade = make_trade(Side::SELL);
        trade.fail();
        assert_eq!(trade.state, TradeState::FAILED);
        assert!(!trade.is_settled());
        assert!(trade.settled_at.is_none());
    }
}
