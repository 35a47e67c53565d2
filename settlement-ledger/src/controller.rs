use std::{collections::HashMap, sync::Arc};

use log::error;
use parking_lot::{Mutex, RwLock};

use core_types::{
    day_index, option_key, AccountId, AssetId, OptionKey, OptionTerms, TokenId, TokenKind,
};
use custody_api::{AssetLedger, Clock, TokenLedger, TokenLedgerError};
use events::{EventSink, SettlementEvent};

use crate::{
    config::SettlementConfig,
    error::{Result, SettlementError},
    ledger::OptionTypeLedger,
    position::ClaimPosition,
};

/// Ids touched by a write: the fungible option token and the writer's lot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOutcome {
    pub option_id: TokenId,
    pub claim_id: TokenId,
}

/// Asset legs paid out by a redemption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedeemOutcome {
    pub exercise_amount: u128,
    pub underlying_amount: u128,
}

/// Read-only view of a live claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimView {
    pub option_id: TokenId,
    pub position: ClaimPosition,
}

/// Public settlement surface.
///
/// State is an option-key → ledger map; every ledger sits behind its own
/// mutex, so calls against one option type serialize while distinct types
/// proceed in parallel. Each operation validates fully before mutating;
/// when a collaborator call fails after core mutation, the per-type ledger
/// is restored from a checkpoint taken at the start of the mutation.
pub struct SettlementController {
    config: SettlementConfig,
    clock: Arc<dyn Clock>,
    assets: Arc<dyn AssetLedger>,
    tokens: Arc<dyn TokenLedger>,
    events: Arc<dyn EventSink>,
    types: RwLock<HashMap<OptionKey, Arc<Mutex<OptionTypeLedger>>>>,
}

impl SettlementController {
    pub fn new(
        config: SettlementConfig,
        clock: Arc<dyn Clock>,
        assets: Arc<dyn AssetLedger>,
        tokens: Arc<dyn TokenLedger>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            clock,
            assets,
            tokens,
            events,
            types: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Registers a new option type and returns its option-token id.
    pub fn new_option_type(&self, terms: OptionTerms) -> Result<TokenId> {
        let now = self.clock.now();
        if terms.underlying_asset == terms.exercise_asset {
            return Err(SettlementError::InvalidAssetPair);
        }
        if terms.exercise_ts >= terms.expiry_ts
            || terms.expiry_ts - terms.exercise_ts < self.config.min_exercise_window_s
        {
            return Err(SettlementError::ExerciseWindowTooShort {
                min_s: self.config.min_exercise_window_s,
            });
        }
        if terms.expiry_ts - now < self.config.min_expiry_lead_s {
            return Err(SettlementError::ExpiryWindowTooShort {
                min_s: self.config.min_expiry_lead_s,
            });
        }
        if self.assets.total_supply(terms.underlying_asset) < u128::from(terms.underlying_amount)
            || self.assets.total_supply(terms.exercise_asset) < u128::from(terms.exercise_amount)
        {
            return Err(SettlementError::InvalidAssetPair);
        }

        let key = option_key(&terms);
        let option_id = TokenId::encode(key, 0);
        {
            let mut types = self.types.write();
            if types.contains_key(&key) {
                return Err(SettlementError::OptionTypeAlreadyExists { option_id });
            }
            types.insert(key, Arc::new(Mutex::new(OptionTypeLedger::new(key, terms))));
        }
        self.events
            .publish(SettlementEvent::OptionTypeCreated { option_id, terms });
        Ok(option_id)
    }

    /// Writes `amount` contracts, locking underlying collateral.
    ///
    /// Passing an option id opens a new claim; passing a claim id adds the
    /// write to that claim, which must be live and owned by the caller.
    pub fn write(&self, caller: AccountId, id: TokenId, amount: u64) -> Result<WriteOutcome> {
        if amount == 0 {
            return Err(SettlementError::ZeroAmount);
        }
        let (key, claim_seq) = id
            .decode()
            .map_err(|_| SettlementError::TokenNotFound)?;
        let entry = self.ledger_for(key)?;
        let mut ledger = entry.lock();
        let terms = *ledger.terms();
        let now = self.clock.now();
        if now >= terms.expiry_ts {
            return Err(SettlementError::OptionTypeExpired {
                expiry_ts: terms.expiry_ts,
            });
        }
        let new_claim = claim_seq == 0;
        if !new_claim {
            if !ledger.claim_is_live(claim_seq) {
                return Err(SettlementError::TokenNotFound);
            }
            if self.tokens.balance_of(caller, id) != 1 {
                return Err(SettlementError::ClaimNotOwnedByCaller);
            }
        }

        // collateral moves first; the ledger mutation below cannot fail
        self.assets.transfer_in(
            terms.underlying_asset,
            caller,
            u128::from(amount) * u128::from(terms.underlying_amount),
        )?;

        let today = day_index(now);
        let claim_seq = if new_claim {
            ledger.write_new_claim(amount, today)
        } else {
            ledger.write_to_claim(claim_seq, amount, today);
            claim_seq
        };

        let option_id = TokenId::encode(key, 0);
        let claim_id = TokenId::encode(key, claim_seq);
        self.tokens.mint(caller, option_id, amount);
        if new_claim {
            self.tokens.mint(caller, claim_id, 1);
        }
        self.events.publish(SettlementEvent::OptionsWritten {
            option_id,
            writer: caller,
            claim_id,
            amount,
        });
        Ok(WriteOutcome {
            option_id,
            claim_id,
        })
    }

    /// Exercises `amount` contracts, assigning them across outstanding
    /// buckets and swapping the exercise asset in for the underlying.
    pub fn exercise(&self, caller: AccountId, id: TokenId, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(SettlementError::ZeroAmount);
        }
        let (key, claim_seq) = id
            .decode()
            .map_err(|_| SettlementError::TokenNotFound)?;
        if claim_seq != 0 {
            return Err(SettlementError::NotAnOption);
        }
        let entry = self.ledger_for(key)?;
        let mut ledger = entry.lock();
        let terms = *ledger.terms();
        let now = self.clock.now();
        if now < terms.exercise_ts {
            return Err(SettlementError::ExerciseNotYetOpen {
                exercise_ts: terms.exercise_ts,
            });
        }
        if now >= terms.expiry_ts {
            return Err(SettlementError::OptionTypeExpired {
                expiry_ts: terms.expiry_ts,
            });
        }
        let held = self.tokens.balance_of(caller, id);
        if held < amount {
            return Err(SettlementError::InsufficientOptionBalance {
                needed: amount,
                held,
            });
        }

        let checkpoint = ledger.clone();
        match self.exercise_steps(&mut ledger, caller, id, &terms, amount) {
            Ok(()) => {
                self.events.publish(SettlementEvent::OptionsExercised {
                    option_id: id,
                    exerciser: caller,
                    amount,
                });
                Ok(())
            }
            Err(err) => {
                *ledger = checkpoint;
                if matches!(err, SettlementError::AssignmentCapacityExhausted(_)) {
                    error!(
                        "[{}] assignment overran outstanding supply for {id}",
                        self.config.label
                    );
                }
                Err(err)
            }
        }
    }

    fn exercise_steps(
        &self,
        ledger: &mut OptionTypeLedger,
        caller: AccountId,
        option_id: TokenId,
        terms: &OptionTerms,
        amount: u64,
    ) -> Result<()> {
        ledger.assign_exercise(amount)?;
        let exercise_cost = u128::from(amount) * u128::from(terms.exercise_amount);
        self.assets
            .transfer_in(terms.exercise_asset, caller, exercise_cost)?;
        if let Err(err) = self.tokens.burn(caller, option_id, amount) {
            self.pay_back(terms.exercise_asset, caller, exercise_cost);
            let TokenLedgerError::InsufficientTokenBalance {
                needed, available, ..
            } = err;
            return Err(SettlementError::InsufficientOptionBalance {
                needed,
                held: available,
            });
        }
        let underlying_payout = u128::from(amount) * u128::from(terms.underlying_amount);
        if let Err(err) = self
            .assets
            .transfer_out(terms.underlying_asset, caller, underlying_payout)
        {
            self.tokens.mint(caller, option_id, amount);
            self.pay_back(terms.exercise_asset, caller, exercise_cost);
            return Err(err.into());
        }
        Ok(())
    }

    /// Redeems a claim for its pro-rata asset legs. Terminal: the claim is
    /// drained and its token burned; a second call reports `TokenNotFound`.
    pub fn redeem(&self, caller: AccountId, id: TokenId) -> Result<RedeemOutcome> {
        let (key, claim_seq) = id
            .decode()
            .map_err(|_| SettlementError::TokenNotFound)?;
        if claim_seq == 0 {
            return Err(SettlementError::NotAClaim);
        }
        let entry = self
            .ledger_for(key)
            .map_err(|_| SettlementError::TokenNotFound)?;
        let mut ledger = entry.lock();
        let terms = *ledger.terms();
        let Some(position) = ledger.claim_position(claim_seq) else {
            return Err(SettlementError::TokenNotFound);
        };
        if self.tokens.balance_of(caller, id) != 1 {
            return Err(SettlementError::ClaimNotOwnedByCaller);
        }
        let now = self.clock.now();
        if now < terms.expiry_ts {
            return Err(SettlementError::ClaimNotYetRedeemable {
                expiry_ts: terms.expiry_ts,
            });
        }

        let outcome = RedeemOutcome {
            exercise_amount: u128::from(position.amount_exercised)
                * u128::from(terms.exercise_amount),
            underlying_amount: u128::from(position.amount_unexercised)
                * u128::from(terms.underlying_amount),
        };

        let checkpoint = ledger.clone();
        match self.redeem_steps(&mut ledger, caller, id, &terms, claim_seq, outcome) {
            Ok(()) => {
                self.events.publish(SettlementEvent::ClaimRedeemed {
                    claim_id: id,
                    option_id: id.option_id(),
                    redeemer: caller,
                    exercise_amount_returned: outcome.exercise_amount,
                    underlying_amount_returned: outcome.underlying_amount,
                });
                Ok(outcome)
            }
            Err(err) => {
                *ledger = checkpoint;
                Err(err)
            }
        }
    }

    fn redeem_steps(
        &self,
        ledger: &mut OptionTypeLedger,
        caller: AccountId,
        claim_id: TokenId,
        terms: &OptionTerms,
        claim_seq: u64,
        outcome: RedeemOutcome,
    ) -> Result<()> {
        ledger.drain_claim(claim_seq);
        if self.tokens.burn(caller, claim_id, 1).is_err() {
            return Err(SettlementError::ClaimNotOwnedByCaller);
        }
        if outcome.exercise_amount > 0 {
            if let Err(err) =
                self.assets
                    .transfer_out(terms.exercise_asset, caller, outcome.exercise_amount)
            {
                self.tokens.mint(caller, claim_id, 1);
                return Err(err.into());
            }
        }
        if outcome.underlying_amount > 0 {
            if let Err(err) =
                self.assets
                    .transfer_out(terms.underlying_asset, caller, outcome.underlying_amount)
            {
                self.take_back(terms.exercise_asset, caller, outcome.exercise_amount);
                self.tokens.mint(caller, claim_id, 1);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Terms of an option type; the id must carry an empty claim field.
    pub fn option(&self, id: TokenId) -> Result<OptionTerms> {
        let (key, claim_seq) = id
            .decode()
            .map_err(|_| SettlementError::TokenNotFound)?;
        if claim_seq != 0 {
            return Err(SettlementError::NotAnOption);
        }
        let entry = self
            .ledger_for(key)
            .map_err(|_| SettlementError::TokenNotFound)?;
        let terms = *entry.lock().terms();
        Ok(terms)
    }

    /// Live-claim view: the owning option id plus the current split.
    pub fn claim(&self, id: TokenId) -> Result<ClaimView> {
        let (key, claim_seq) = id
            .decode()
            .map_err(|_| SettlementError::TokenNotFound)?;
        if claim_seq == 0 {
            return Err(SettlementError::NotAClaim);
        }
        let entry = self
            .ledger_for(key)
            .map_err(|_| SettlementError::TokenNotFound)?;
        let ledger = entry.lock();
        let Some(position) = ledger.claim_position(claim_seq) else {
            return Err(SettlementError::TokenNotFound);
        };
        Ok(ClaimView {
            option_id: id.option_id(),
            position,
        })
    }

    /// Current exercised/unexercised split for a claim, at any time.
    pub fn position(&self, id: TokenId) -> Result<ClaimPosition> {
        self.claim(id).map(|view| view.position)
    }

    /// Which token family a known id addresses.
    pub fn token_kind(&self, id: TokenId) -> Result<TokenKind> {
        let (key, claim_seq) = id
            .decode()
            .map_err(|_| SettlementError::TokenNotFound)?;
        let entry = self
            .ledger_for(key)
            .map_err(|_| SettlementError::TokenNotFound)?;
        if claim_seq == 0 {
            return Ok(TokenKind::Option);
        }
        if entry.lock().claim_is_live(claim_seq) {
            Ok(TokenKind::Claim)
        } else {
            Err(SettlementError::TokenNotFound)
        }
    }

    fn ledger_for(&self, key: OptionKey) -> Result<Arc<Mutex<OptionTypeLedger>>> {
        self.types
            .read()
            .get(&key)
            .cloned()
            .ok_or(SettlementError::UnknownOptionType)
    }

    /// Returns custodied funds to an account while unwinding a failed
    /// operation. The pool was credited moments earlier under the same
    /// type lock, so this cannot run dry; a failure is logged, not raised.
    fn pay_back(&self, asset: AssetId, to: AccountId, amount: u128) {
        if let Err(err) = self.assets.transfer_out(asset, to, amount) {
            error!(
                "[{}] rollback payout of {amount} failed: {err}",
                self.config.label
            );
        }
    }

    /// Re-collects a payout made moments earlier while unwinding a failed
    /// operation.
    fn take_back(&self, asset: AssetId, from: AccountId, amount: u128) {
        if amount == 0 {
            return;
        }
        if let Err(err) = self.assets.transfer_in(asset, from, amount) {
            error!(
                "[{}] rollback collection of {amount} failed: {err}",
                self.config.label
            );
        }
    }
}
