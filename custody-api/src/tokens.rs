use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use core_types::{AccountId, TokenId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenLedgerError {
    #[error("account holds {available} of token {token}, burn needs {needed}")]
    InsufficientTokenBalance {
        token: TokenId,
        needed: u64,
        available: u64,
    },
}

/// Balance tracking for the fungible option tokens and the one-per-lot
/// claim tokens. The settlement core validates against and signals into
/// this ledger; it never stores balances itself.
pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, account: AccountId, token: TokenId) -> u64;

    fn mint(&self, account: AccountId, token: TokenId, amount: u64);

    fn burn(&self, account: AccountId, token: TokenId, amount: u64)
        -> Result<(), TokenLedgerError>;
}

#[derive(Default)]
pub struct InMemoryTokenLedger {
    balances: Mutex<HashMap<(AccountId, TokenId), u64>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance_of(&self, account: AccountId, token: TokenId) -> u64 {
        self.balances
            .lock()
            .get(&(account, token))
            .copied()
            .unwrap_or_default()
    }

    fn mint(&self, account: AccountId, token: TokenId, amount: u64) {
        let mut balances = self.balances.lock();
        *balances.entry((account, token)).or_default() += amount;
    }

    fn burn(
        &self,
        account: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<(), TokenLedgerError> {
        let mut balances = self.balances.lock();
        let balance = balances.entry((account, token)).or_default();
        if *balance < amount {
            return Err(TokenLedgerError::InsufficientTokenBalance {
                token,
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }
}
