//! Crossing detection
//!
//! Determines whether an incoming order can trade against a resting
//! price. A limit order crosses while the maker price is at or better
//! than its limit; a market order without a cap crosses unconditionally.

use types::numeric::Price;
use types::order::Side;

/// Check if an incoming order crosses a resting (maker) price
///
/// `taker_limit` is the incoming order's limit price, or its price cap
/// for market orders; `None` means unbounded (uncapped market order).
pub fn taker_crosses(taker_side: Side, taker_limit: Option<Price>, maker_price: Price) -> bool {
    match (taker_side, taker_limit) {
        (Side::BUY, Some(limit)) => limit >= maker_price,
        (Side::SELL, Some(limit)) => limit <= maker_price,
        (_, None) => true,
    }
}
