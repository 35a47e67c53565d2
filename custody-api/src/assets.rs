use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use core_types::{AccountId, AssetId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("account holds {available} of asset, transfer needs {needed}")]
    InsufficientBalance { needed: u128, available: u128 },
    #[error("custody pool holds {available} of asset, payout needs {needed}")]
    InsufficientCustody { needed: u128, available: u128 },
}

/// Fungible asset custody.
///
/// `transfer_in` pulls an amount from an account into the custody pool;
/// `transfer_out` pays from the pool back to an account. Both are
/// all-or-nothing: a failed transfer moves nothing.
pub trait AssetLedger: Send + Sync {
    fn transfer_in(
        &self,
        asset: AssetId,
        from: AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;

    fn transfer_out(&self, asset: AssetId, to: AccountId, amount: u128)
        -> Result<(), TransferError>;

    fn total_supply(&self, asset: AssetId) -> u128;
}

#[derive(Default)]
struct AssetBook {
    balances: HashMap<(AssetId, AccountId), u128>,
    custodied: HashMap<AssetId, u128>,
    supply: HashMap<AssetId, u128>,
}

/// Account balances plus a per-asset custody pool, all behind one lock.
#[derive(Default)]
pub struct InMemoryAssetLedger {
    book: Mutex<AssetBook>,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits an account and grows the asset's total supply.
    pub fn mint(&self, asset: AssetId, account: AccountId, amount: u128) {
        let mut book = self.book.lock();
        *book.balances.entry((asset, account)).or_default() += amount;
        *book.supply.entry(asset).or_default() += amount;
    }

    pub fn balance_of(&self, asset: AssetId, account: AccountId) -> u128 {
        self.book
            .lock()
            .balances
            .get(&(asset, account))
            .copied()
            .unwrap_or_default()
    }

    /// Amount currently held by the custody pool for an asset.
    pub fn custodied(&self, asset: AssetId) -> u128 {
        self.book
            .lock()
            .custodied
            .get(&asset)
            .copied()
            .unwrap_or_default()
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn transfer_in(
        &self,
        asset: AssetId,
        from: AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut book = self.book.lock();
        let balance = book.balances.entry((asset, from)).or_default();
        if *balance < amount {
            return Err(TransferError::InsufficientBalance {
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        *book.custodied.entry(asset).or_default() += amount;
        Ok(())
    }

    fn transfer_out(
        &self,
        asset: AssetId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut book = self.book.lock();
        let held = book.custodied.entry(asset).or_default();
        if *held < amount {
            return Err(TransferError::InsufficientCustody {
                needed: amount,
                available: *held,
            });
        }
        *held -= amount;
        *book.balances.entry((asset, to)).or_default() += amount;
        Ok(())
    }

    fn total_supply(&self, asset: AssetId) -> u128 {
        self.book
            .lock()
            .supply
            .get(&asset)
            .copied()
            .unwrap_or_default()
    }
}
