//! Wallet Ledger service
//!
//! Holds per-account, per-asset available and reserved balances and
//! exposes the reserve/release/settle primitives every other component
//! builds on. Each mutation is atomic and writes its ledger entry in the
//! same unit; total balance (available + reserved) is conserved by every
//! operation except deposit and withdrawal.

pub mod ledger;
pub mod wallet;

pub use ledger::{SettlementLeg, WalletLedger};
pub use wallet::Wallet;
