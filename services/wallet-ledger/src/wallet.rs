//! Per-account, per-asset wallet balances
//!
//! Invariant: `available >= 0` and `reserved >= 0` at all times. Every
//! mutation validates before applying, so a wallet can never observe a
//! negative bucket.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::errors::LedgerError;
use types::ids::AccountId;

/// Balances for one (account, asset) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub account_id: AccountId,
    pub asset: String,
    pub available: Decimal,
    pub reserved: Decimal,
}

impl Wallet {
    /// Create an empty wallet
    pub fn new(account_id: AccountId, asset: impl Into<String>) -> Self {
        Self {
            account_id,
            asset: asset.into(),
            available: Decimal::ZERO,
            reserved: Decimal::ZERO,
        }
    }

    /// Total balance: available + reserved
    pub fn total(&self) -> Decimal {
        self.available + self.reserved
    }

    /// Check balance invariant: both buckets non-negative
    pub fn check_invariant(&self) -> bool {
        self.available >= Decimal::ZERO && self.reserved >= Decimal::ZERO
    }

    /// Credit the available bucket
    pub fn credit_available(&mut self, amount: Decimal) {
        self.available += amount;
    }

    /// Debit the available bucket; fails rather than going negative
    pub fn debit_available(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount > self.available {
            return Err(LedgerError::InsufficientFunds {
                asset: self.asset.clone(),
                required: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        Ok(())
    }

    /// Move funds from available to reserved
    pub fn reserve(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount > self.available {
            return Err(LedgerError::InsufficientFunds {
                asset: self.asset.clone(),
                required: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        self.reserved += amount;
        Ok(())
    }

    /// Move funds from reserved back to available
    ///
    /// A shortfall here means a bookkeeping bug upstream, not a user error.
    pub fn release(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount > self.reserved {
            return Err(LedgerError::InvariantViolation {
                asset: self.asset.clone(),
                detail: format!("release of {} exceeds reserved {}", amount, self.reserved),
            });
        }
        self.reserved -= amount;
        self.available += amount;
        Ok(())
    }

    /// Consume reserved funds (trade settlement leg)
    pub fn debit_reserved(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount > self.reserved {
            return Err(LedgerError::InvariantViolation {
                asset: self.asset.clone(),
                detail: format!("debit of {} exceeds reserved {}", amount, self.reserved),
            });
        }
        self.reserved -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_wallet(available: u64) -> Wallet {
        let mut wallet = Wallet::new(AccountId::new(), "USDT");
        wallet.credit_available(Decimal::from(available));
        wallet
    }

    #[test]
    fn test_wallet_starts_empty() {
        let wallet = Wallet::new(AccountId::new(), "BTC");
        assert_eq!(wallet.total(), Decimal::ZERO);
        assert!(wallet.check_invariant());
    }

    #[test]
    fn test_reserve_moves_funds() {
        let mut wallet = make_wallet(1000);
        wallet.reserve(Decimal::from(300)).unwrap();

        assert_eq!(wallet.available, Decimal::from(700));
        assert_eq!(wallet.reserved, Decimal::from(300));
        assert_eq!(wallet.total(), Decimal::from(1000));
    }

    #[test]
    fn test_reserve_insufficient() {
        let mut wallet = make_wallet(100);
        let result = wallet.reserve(Decimal::from(200));
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        // No partial effect
        assert_eq!(wallet.available, Decimal::from(100));
        assert_eq!(wallet.reserved, Decimal::ZERO);
    }

    #[test]
    fn test_release_returns_funds() {
        let mut wallet = make_wallet(1000);
        wallet.reserve(Decimal::from(300)).unwrap();
        wallet.release(Decimal::from(100)).unwrap();

        assert_eq!(wallet.available, Decimal::from(800));
        assert_eq!(wallet.reserved, Decimal::from(200));
    }

    #[test]
    fn test_release_beyond_reserved_is_invariant_violation() {
        let mut wallet = make_wallet(1000);
        wallet.reserve(Decimal::from(100)).unwrap();
        let result = wallet.release(Decimal::from(200));
        assert!(matches!(result, Err(LedgerError::InvariantViolation { .. })));
        assert_eq!(wallet.reserved, Decimal::from(100));
    }

    #[test]
    fn test_debit_reserved() {
        let mut wallet = make_wallet(1000);
        wallet.reserve(Decimal::from(300)).unwrap();
        wallet.debit_reserved(Decimal::from(300)).unwrap();

        assert_eq!(wallet.reserved, Decimal::ZERO);
        assert_eq!(wallet.total(), Decimal::from(700));
    }

    #[test]
    fn test_debit_available_insufficient() {
        let mut wallet = make_wallet(50);
        assert!(wallet.debit_available(Decimal::from(100)).is_err());
        assert_eq!(wallet.available, Decimal::from(50));
    }
}
