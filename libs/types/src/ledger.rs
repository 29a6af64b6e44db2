//! Append-only ledger entry types
//!
//! Every wallet balance mutation writes one entry in the same atomic
//! unit as the mutation itself. Entries reference their order/trade by
//! identifier and are never updated or deleted.

use crate::ids::{AccountId, EntryId, OrderId, TradeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which balance bucket the entry's amount moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalanceKind {
    Available,
    Reserved,
}

/// Why the balance moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryReason {
    /// External funds in
    Deposit,
    /// External funds out
    Withdrawal,
    /// Available → reserved, earmarked against an open order
    Reserve,
    /// Reserved → available, order cancelled or reservation unused
    Release,
    /// Reserved funds consumed by a trade leg
    TradeDebit,
    /// Funds received from a trade leg, net of fee
    TradeCredit,
    /// Fee credited to the house account
    FeeCredit,
}

/// Immutable record of one wallet balance mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub account_id: AccountId,
    pub asset: String,
    /// Signed amount applied to the `balance` bucket
    pub amount: Decimal,
    pub balance: BalanceKind,
    pub reason: EntryReason,
    pub order_id: Option<OrderId>,
    pub trade_id: Option<TradeId>,
    /// Wallet balances after the mutation
    pub available_after: Decimal,
    pub reserved_after: Decimal,
    pub created_at: i64, // Unix nanos
}

impl LedgerEntry {
    /// Create an entry capturing a wallet mutation's outcome
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: AccountId,
        asset: impl Into<String>,
        amount: Decimal,
        balance: BalanceKind,
        reason: EntryReason,
        order_id: Option<OrderId>,
        trade_id: Option<TradeId>,
        available_after: Decimal,
        reserved_after: Decimal,
        timestamp: i64,
    ) -> Self {
        Self {
            entry_id: EntryId::new(),
            account_id,
            asset: asset.into(),
            amount,
            balance,
            reason,
            order_id,
            trade_id,
            available_after,
            reserved_after,
            created_at: timestamp,
        }
    }
}
