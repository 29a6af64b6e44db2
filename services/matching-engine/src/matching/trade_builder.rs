//! Trade construction
//!
//! Builds the immutable trade record for one match: monotonic sequence
//! number, execution at the maker's price, and fees computed from the
//! rate snapshots the participating orders captured at creation.

use rust_decimal::Decimal;
use types::market::TradingPair;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

/// Builds trades with a monotonically increasing sequence
pub struct TradeBuilder {
    sequence_counter: u64,
}

impl TradeBuilder {
    /// Create a builder with a starting sequence number
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            sequence_counter: starting_sequence,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Build the trade for one match between a resting maker and an
    /// incoming taker
    ///
    /// Each side's fee is charged in the asset it receives — base for the
    /// buyer, quote for the seller — at that side's captured rate.
    pub fn build(
        &mut self,
        pair: &TradingPair,
        maker: &Order,
        taker: &Order,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        let (maker_fee, maker_fee_asset) =
            side_fee(pair, maker.side, maker.fees.maker_rate, price, quantity);
        let (taker_fee, taker_fee_asset) =
            side_fee(pair, taker.side, taker.fees.taker_rate, price, quantity);

        Trade::new(
            self.next_sequence(),
            pair.symbol.clone(),
            maker.order_id,
            taker.order_id,
            maker.account_id,
            taker.account_id,
            taker.side,
            price,
            quantity,
            maker_fee,
            maker_fee_asset,
            taker_fee,
            taker_fee_asset,
            timestamp,
        )
    }
}

/// Fee for one side of a match: rate × received amount, in the received asset
fn side_fee(
    pair: &TradingPair,
    side: Side,
    rate: Decimal,
    price: Price,
    quantity: Quantity,
) -> (Decimal, String) {
    match side {
        // Buyer receives base
        Side::BUY => (rate * quantity.as_decimal(), pair.base().to_string()),
        // Seller receives quote
        Side::SELL => (
            rate * price.as_decimal() * quantity.as_decimal(),
            pair.quote().to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{AccountId, MarketId};
    use types::order::FeeSnapshot;

    const TS: i64 = 1708123456789000000;

    fn make_pair() -> TradingPair {
        TradingPair::new(
            MarketId::new("BTC/USDT"),
            Price::from_u64(1),
            Price::from_u64(1_000_000),
            Quantity::from_str("0.001").unwrap(),
            Decimal::from(10),
            2,
            4,
            Decimal::from_str_exact("0.001").unwrap(),
            Decimal::from_str_exact("0.002").unwrap(),
            TS,
        )
    }

    fn make_order(side: Side, price: u64, qty: &str, pair: &TradingPair) -> Order {
        Order::limit(
            AccountId::new(),
            pair.symbol.clone(),
            side,
            Price::from_u64(price),
            Quantity::from_str(qty).unwrap(),
            FeeSnapshot::from(pair),
            TS,
        )
    }

    #[test]
    fn test_sequence_monotonic() {
        let pair = make_pair();
        let maker = make_order(Side::SELL, 100, "1.0", &pair);
        let taker = make_order(Side::BUY, 100, "1.0", &pair);

        let mut builder = TradeBuilder::new(1000);
        let qty = Quantity::from_str("0.5").unwrap();
        let t1 = builder.build(&pair, &maker, &taker, Price::from_u64(100), qty, TS);
        let t2 = builder.build(&pair, &maker, &taker, Price::from_u64(100), qty, TS);

        assert_eq!(t1.sequence, 1000);
        assert_eq!(t2.sequence, 1001);
    }

    #[test]
    fn test_fees_charged_in_received_asset() {
        let pair = make_pair();
        // Maker sells, taker buys, 1.0 @ 100
        let maker = make_order(Side::SELL, 100, "1.0", &pair);
        let taker = make_order(Side::BUY, 100, "1.0", &pair);

        let mut builder = TradeBuilder::new(0);
        let trade = builder.build(
            &pair,
            &maker,
            &taker,
            Price::from_u64(100),
            Quantity::from_str("1.0").unwrap(),
            TS,
        );

        // Maker (seller) pays maker rate on the quote it receives:
        // 0.001 × 100 = 0.1 USDT
        assert_eq!(trade.maker_fee, Decimal::from_str_exact("0.1").unwrap());
        assert_eq!(trade.maker_fee_asset, "USDT");
        // Taker (buyer) pays taker rate on the base it receives:
        // 0.002 × 1.0 = 0.002 BTC
        assert_eq!(trade.taker_fee, Decimal::from_str_exact("0.002").unwrap());
        assert_eq!(trade.taker_fee_asset, "BTC");
    }

    #[test]
    fn test_fee_uses_order_snapshot_not_live_pair() {
        let pair = make_pair();
        let maker = make_order(Side::SELL, 100, "1.0", &pair);
        let taker = make_order(Side::BUY, 100, "1.0", &pair);

        // Admin doubles the live rates after the orders were created
        let mut repriced = pair.clone();
        repriced.maker_fee_rate = Decimal::from_str_exact("0.01").unwrap();
        repriced.taker_fee_rate = Decimal::from_str_exact("0.02").unwrap();

        let mut builder = TradeBuilder::new(0);
        let trade = builder.build(
            &repriced,
            &maker,
            &taker,
            Price::from_u64(100),
            Quantity::from_str("1.0").unwrap(),
            TS,
        );

        // Still the captured rates
        assert_eq!(trade.maker_fee, Decimal::from_str_exact("0.1").unwrap());
        assert_eq!(trade.taker_fee, Decimal::from_str_exact("0.002").unwrap());
    }

    #[test]
    fn test_taker_sell_orientation() {
        let pair = make_pair();
        let maker = make_order(Side::BUY, 100, "2.0", &pair);
        let taker = make_order(Side::SELL, 100, "1.0", &pair);

        let mut builder = TradeBuilder::new(0);
        let trade = builder.build(
            &pair,
            &maker,
            &taker,
            Price::from_u64(100),
            Quantity::from_str("1.0").unwrap(),
            TS,
        );

        assert_eq!(trade.taker_side, Side::SELL);
        // Maker buys → fee in base; taker sells → fee in quote
        assert_eq!(trade.maker_fee_asset, "BTC");
        assert_eq!(trade.taker_fee_asset, "USDT");
        assert_eq!(trade.buyer_account_id(), trade.maker_account_id);
    }
}
