//! Trade settlement
//!
//! A settled trade moves four balances (two legs × two accounts) and
//! credits two fees. The wallet ledger applies the whole instruction in
//! one atomic unit; this module only translates a trade into that
//! instruction and records the outcome on the trade itself.

use std::sync::Arc;
use tracing::{debug, error};
use types::errors::SettlementError;
use types::market::TradingPair;
use types::trade::Trade;
use wallet_ledger::{SettlementLeg, WalletLedger};

/// Settlement coordinator bound to one wallet ledger
pub struct SettlementCoordinator {
    ledger: Arc<WalletLedger>,
}

impl SettlementCoordinator {
    pub fn new(ledger: Arc<WalletLedger>) -> Self {
        Self { ledger }
    }

    /// The ledger this coordinator settles against
    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }

    /// Settle one trade
    ///
    /// On success the trade is marked settled. On failure no wallet is
    /// changed, the trade is marked failed, and the error is returned so
    /// the matching engine can halt the affected order.
    pub fn settle_trade(
        &self,
        trade: &mut Trade,
        pair: &TradingPair,
        timestamp: i64,
    ) -> Result<(), SettlementError> {
        let legs = [
            // Quote leg: buyer's reserved quote → seller, net of the seller's fee
            SettlementLeg {
                from_account: trade.buyer_account_id(),
                from_order_id: trade.buyer_order_id(),
                to_account: trade.seller_account_id(),
                to_order_id: trade.seller_order_id(),
                asset: pair.quote().to_string(),
                amount: trade.quote_value(),
                fee: trade.seller_fee(),
            },
            // Base leg: seller's reserved base → buyer, net of the buyer's fee
            SettlementLeg {
                from_account: trade.seller_account_id(),
                from_order_id: trade.seller_order_id(),
                to_account: trade.buyer_account_id(),
                to_order_id: trade.buyer_order_id(),
                asset: pair.base().to_string(),
                amount: trade.quantity.as_decimal(),
                fee: trade.buyer_fee(),
            },
        ];

        match self.ledger.settle(&legs, trade.trade_id, timestamp) {
            Ok(()) => {
                trade.settle(timestamp);
                debug!(
                    trade_id = %trade.trade_id,
                    symbol = %trade.symbol,
                    price = %trade.price,
                    quantity = %trade.quantity,
                    "trade settled"
                );
                Ok(())
            }
            Err(err) => {
                trade.fail();
                error!(
                    trade_id = %trade.trade_id,
                    symbol = %trade.symbol,
                    %err,
                    "settlement failed; wallets unchanged"
                );
                Err(SettlementError::Failed {
                    trade_id: trade.trade_id.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }
}
