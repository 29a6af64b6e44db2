//! Settlement Coordinator service
//!
//! Turns a matched trade into wallet mutations: the quote leg from the
//! buyer's reservation to the seller, the base leg from the seller's
//! reservation to the buyer, fees to the house account. Both legs apply
//! or neither does.

pub mod coordinator;

pub use coordinator::SettlementCoordinator;
