//! Per-account balances.

use rust_decimal::Decimal;

use super::error::{ExchangeError, Result};
use crate::domain::Asset;

/// Available balances for one account.
///
/// Funds committed to resting orders are escrowed out of the wallet and
/// returned on cancellation, so `available` is always the spendable amount.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    fiat: Decimal,
    token: Decimal,
    stable: Decimal,
}

impl Wallet {
    pub fn new(fiat: Decimal, token: Decimal, stable: Decimal) -> Self {
        Self { fiat, token, stable }
    }

    pub fn available(&self, asset: Asset) -> Decimal {
        match asset {
            Asset::Fiat => self.fiat,
            Asset::Token => self.token,
            Asset::Stable => self.stable,
        }
    }

    pub fn deposit(&mut self, asset: Asset, amount: Decimal) {
        *self.slot_mut(asset) += amount;
    }

    /// Deduct `amount`, rejecting overdrafts.
    pub fn withdraw(&mut self, asset: Asset, amount: Decimal) -> Result<()> {
        let slot = self.slot_mut(asset);
        if *slot < amount {
            return Err(ExchangeError::InsufficientBalance {
                asset,
                needed: amount,
                available: *slot,
            });
        }
        *slot -= amount;
        Ok(())
    }

    fn slot_mut(&mut self, asset: Asset) -> &mut Decimal {
        match asset {
            Asset::Fiat => &mut self.fiat,
            Asset::Token => &mut self.token,
            Asset::Stable => &mut self.stable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deposit_and_withdraw() {
        let mut wallet = Wallet::default();
        wallet.deposit(Asset::Fiat, dec!(100));
        assert_eq!(wallet.available(Asset::Fiat), dec!(100));

        wallet.withdraw(Asset::Fiat, dec!(40)).unwrap();
        assert_eq!(wallet.available(Asset::Fiat), dec!(60));
    }

    #[test]
    fn test_overdraft_rejected() {
        let mut wallet = Wallet::new(dec!(10), Decimal::ZERO, Decimal::ZERO);
        let err = wallet.withdraw(Asset::Fiat, dec!(11)).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::InsufficientBalance {
                asset: Asset::Fiat,
                ..
            }
        ));
        // Balance untouched on rejection
        assert_eq!(wallet.available(Asset::Fiat), dec!(10));
    }

    #[test]
    fn test_balances_are_per_asset() {
        let mut wallet = Wallet::default();
        wallet.deposit(Asset::Token, dec!(5));
        assert_eq!(wallet.available(Asset::Token), dec!(5));
        assert_eq!(wallet.available(Asset::Stable), Decimal::ZERO);
        assert_eq!(wallet.available(Asset::Fiat), Decimal::ZERO);
    }
}
