//! Types library for the order matching and settlement engine
//!
//! This library provides all core type definitions shared by the wallet
//! ledger, matching engine, settlement coordinator, and exchange facade,
//! ensuring type safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId, AccountId, EntryId, MarketId)
//! - `numeric`: Fixed-point decimal types (Price, Quantity)
//! - `market`: Trading pair metadata and admission limits
//! - `order`: Order lifecycle types
//! - `trade`: Trade execution types
//! - `ledger`: Append-only ledger entry types
//! - `events`: Event payloads emitted to the notification sink
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod market;
pub mod order;
pub mod trade;
pub mod ledger;
pub mod events;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::market::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::ledger::*;
    pub use crate::events::*;
    pub use crate::errors::*;
}
