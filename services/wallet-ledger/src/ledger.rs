//! Wallet ledger store
//!
//! One lock guards every wallet and the entry log, so each primitive —
//! including the two-leg trade settlement — observes and mutates a
//! consistent snapshot. Wallets from different trading pairs' matching
//! loops go through the same primitives, which is the only cross-pair
//! synchronization the engine needs.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::error;
use types::errors::LedgerError;
use types::ids::{AccountId, OrderId, TradeId};
use types::ledger::{BalanceKind, EntryReason, LedgerEntry};

use crate::wallet::Wallet;

type WalletKey = (AccountId, String);

/// One settlement leg: reserved funds of `from_account` move to the
/// available balance of `to_account`, net of `fee`; the fee is credited
/// to the house account.
#[derive(Debug, Clone)]
pub struct SettlementLeg {
    pub from_account: AccountId,
    /// Order whose reservation this leg consumes
    pub from_order_id: OrderId,
    pub to_account: AccountId,
    pub to_order_id: OrderId,
    pub asset: String,
    pub amount: Decimal,
    pub fee: Decimal,
}

struct Inner {
    wallets: HashMap<WalletKey, Wallet>,
    entries: Vec<LedgerEntry>,
}

/// The wallet ledger: balances plus the append-only entry log
pub struct WalletLedger {
    inner: Mutex<Inner>,
    fee_account: AccountId,
}

impl WalletLedger {
    /// Create an empty ledger with a fresh house fee account
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                wallets: HashMap::new(),
                entries: Vec::new(),
            }),
            fee_account: AccountId::new(),
        }
    }

    /// Account that collects trading fees
    pub fn fee_account(&self) -> AccountId {
        self.fee_account
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("wallet ledger mutex poisoned")
    }

    fn require_positive(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount { amount });
        }
        Ok(())
    }

    /// External funds in; creates the wallet on first use
    pub fn deposit(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
        timestamp: i64,
    ) -> Result<Wallet, LedgerError> {
        Self::require_positive(amount)?;
        let mut inner = self.locked();
        let wallet = wallet_mut(&mut inner.wallets, account_id, asset);
        wallet.credit_available(amount);
        let snapshot = wallet.clone();
        push_entry(
            &mut inner,
            &snapshot,
            amount,
            BalanceKind::Available,
            EntryReason::Deposit,
            None,
            None,
            timestamp,
        );
        Ok(snapshot)
    }

    /// External funds out; fails on insufficient available balance
    pub fn withdraw(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
        timestamp: i64,
    ) -> Result<Wallet, LedgerError> {
        Self::require_positive(amount)?;
        let mut inner = self.locked();
        let wallet = wallet_mut(&mut inner.wallets, account_id, asset);
        wallet.debit_available(amount)?;
        let snapshot = wallet.clone();
        push_entry(
            &mut inner,
            &snapshot,
            -amount,
            BalanceKind::Available,
            EntryReason::Withdrawal,
            None,
            None,
            timestamp,
        );
        Ok(snapshot)
    }

    /// Earmark available funds against an order
    ///
    /// Atomic per wallet: two reservations can never both succeed if
    /// their sum exceeds the available balance.
    pub fn reserve(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
        order_id: OrderId,
        timestamp: i64,
    ) -> Result<(), LedgerError> {
        Self::require_positive(amount)?;
        let mut inner = self.locked();
        let wallet = wallet_mut(&mut inner.wallets, account_id, asset);
        wallet.reserve(amount)?;
        let snapshot = wallet.clone();
        push_entry(
            &mut inner,
            &snapshot,
            amount,
            BalanceKind::Reserved,
            EntryReason::Reserve,
            Some(order_id),
            None,
            timestamp,
        );
        Ok(())
    }

    /// Return reserved funds to the available balance
    pub fn release(
        &self,
        account_id: AccountId,
        asset: &str,
        amount: Decimal,
        order_id: OrderId,
        timestamp: i64,
    ) -> Result<(), LedgerError> {
        Self::require_positive(amount)?;
        let mut inner = self.locked();
        let wallet = wallet_mut(&mut inner.wallets, account_id, asset);
        if let Err(err) = wallet.release(amount) {
            error!(%account_id, asset, %amount, %err, "release exceeds reservation");
            return Err(err);
        }
        let snapshot = wallet.clone();
        push_entry(
            &mut inner,
            &snapshot,
            amount,
            BalanceKind::Available,
            EntryReason::Release,
            Some(order_id),
            None,
            timestamp,
        );
        Ok(())
    }

    /// Apply a trade settlement: every leg's debit, credit, and fee, plus
    /// all ledger entries, succeed or fail as one unit
    ///
    /// Both legs are validated against the current state before anything
    /// mutates, so a failure leaves every wallet untouched.
    pub fn settle(
        &self,
        legs: &[SettlementLeg],
        trade_id: TradeId,
        timestamp: i64,
    ) -> Result<(), LedgerError> {
        let mut inner = self.locked();

        // Validate phase: no mutation yet
        for leg in legs {
            Self::require_positive(leg.amount)?;
            if leg.fee < Decimal::ZERO || leg.fee > leg.amount {
                return Err(LedgerError::InvariantViolation {
                    asset: leg.asset.clone(),
                    detail: format!("fee {} out of range for amount {}", leg.fee, leg.amount),
                });
            }
            let key = (leg.from_account, leg.asset.clone());
            let from = inner.wallets.get(&key).ok_or_else(|| {
                error!(account_id = %leg.from_account, asset = %leg.asset, "settlement debit against missing wallet");
                LedgerError::WalletNotFound {
                    account_id: leg.from_account.to_string(),
                    asset: leg.asset.clone(),
                }
            })?;
            if from.reserved < leg.amount {
                error!(
                    account_id = %leg.from_account,
                    asset = %leg.asset,
                    reserved = %from.reserved,
                    required = %leg.amount,
                    "settlement debit exceeds reservation"
                );
                return Err(LedgerError::InvariantViolation {
                    asset: leg.asset.clone(),
                    detail: format!(
                        "settlement debit {} exceeds reserved {}",
                        leg.amount, from.reserved
                    ),
                });
            }
        }

        // Apply phase: validated above, so the individual ops cannot fail
        for leg in legs {
            let from = wallet_mut(&mut inner.wallets, leg.from_account, &leg.asset);
            from.debit_reserved(leg.amount)?;
            let from_snapshot = from.clone();
            push_entry(
                &mut inner,
                &from_snapshot,
                -leg.amount,
                BalanceKind::Reserved,
                EntryReason::TradeDebit,
                Some(leg.from_order_id),
                Some(trade_id),
                timestamp,
            );

            let net = leg.amount - leg.fee;
            let to = wallet_mut(&mut inner.wallets, leg.to_account, &leg.asset);
            to.credit_available(net);
            let to_snapshot = to.clone();
            push_entry(
                &mut inner,
                &to_snapshot,
                net,
                BalanceKind::Available,
                EntryReason::TradeCredit,
                Some(leg.to_order_id),
                Some(trade_id),
                timestamp,
            );

            if leg.fee > Decimal::ZERO {
                let house = wallet_mut(&mut inner.wallets, self.fee_account, &leg.asset);
                house.credit_available(leg.fee);
                let house_snapshot = house.clone();
                push_entry(
                    &mut inner,
                    &house_snapshot,
                    leg.fee,
                    BalanceKind::Available,
                    EntryReason::FeeCredit,
                    None,
                    Some(trade_id),
                    timestamp,
                );
            }
        }

        Ok(())
    }

    /// Snapshot of one wallet, if it exists
    pub fn balance(&self, account_id: AccountId, asset: &str) -> Option<Wallet> {
        self.locked()
            .wallets
            .get(&(account_id, asset.to_string()))
            .cloned()
    }

    /// Available balance, zero for a missing wallet
    pub fn available(&self, account_id: AccountId, asset: &str) -> Decimal {
        self.balance(account_id, asset)
            .map(|w| w.available)
            .unwrap_or(Decimal::ZERO)
    }

    /// Reserved balance, zero for a missing wallet
    pub fn reserved(&self, account_id: AccountId, asset: &str) -> Decimal {
        self.balance(account_id, asset)
            .map(|w| w.reserved)
            .unwrap_or(Decimal::ZERO)
    }

    /// Total of available + reserved for an asset across every wallet,
    /// house account included; changes only through deposit/withdrawal
    pub fn asset_total(&self, asset: &str) -> Decimal {
        self.locked()
            .wallets
            .values()
            .filter(|w| w.asset == asset)
            .map(|w| w.total())
            .sum()
    }

    /// Snapshot of the full entry log
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.locked().entries.clone()
    }

    /// Entries touching one account
    pub fn entries_for(&self, account_id: AccountId) -> Vec<LedgerEntry> {
        self.locked()
            .entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect()
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn wallet_mut<'a>(
    wallets: &'a mut HashMap<WalletKey, Wallet>,
    account_id: AccountId,
    asset: &str,
) -> &'a mut Wallet {
    wallets
        .entry((account_id, asset.to_string()))
        .or_insert_with(|| Wallet::new(account_id, asset))
}

#[allow(clippy::too_many_arguments)]
fn push_entry(
    inner: &mut Inner,
    wallet: &Wallet,
    amount: Decimal,
    balance: BalanceKind,
    reason: EntryReason,
    order_id: Option<OrderId>,
    trade_id: Option<TradeId>,
    timestamp: i64,
) {
    inner.entries.push(LedgerEntry::new(
        wallet.account_id,
        wallet.asset.clone(),
        amount,
        balance,
        reason,
        order_id,
        trade_id,
        wallet.available,
        wallet.reserved,
        timestamp,
    ));
}
