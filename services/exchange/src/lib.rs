//! Exchange facade
//!
//! The contract the web layer consumes: order submission and
//! cancellation, book/order/trade queries, deposits and withdrawals, and
//! the event stream for the notification sink. Orders for one trading
//! pair are processed strictly serially behind that pair's lock; orders
//! for different pairs run concurrently, meeting on the wallet ledger's
//! own atomic primitives.

pub mod events;
pub mod facade;

pub use events::EventBus;
pub use facade::{Exchange, TradeFilter};
