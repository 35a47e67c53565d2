// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Deterministic identifiers for option types and writer claims.
//!
//! An option type is keyed by a 160-bit blake3 digest over its immutable
//! terms only, so "does this type already exist" checks are idempotent.
//! A full token id packs that key into the high 160 bits and a per-type
//! claim sequence into the low 96 bits; a claim field of zero addresses
//! the fungible option token itself.

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{OptionTerms, TokenKind};

pub const OPTION_KEY_LEN: usize = 20;
pub const TOKEN_ID_LEN: usize = 32;

/// 160-bit key identifying an option type by its immutable terms.
pub type OptionKey = [u8; OPTION_KEY_LEN];

/// Per-option-type claim sequence number. Sequences start at 1; zero is
/// reserved for the option token.
pub type ClaimSeq = u64;

const OPTION_KEY_DOMAIN: &[u8] = b"option_type_key.v1";

/// Width of the claim field in bytes (96 bits).
const CLAIM_FIELD_LEN: usize = TOKEN_ID_LEN - OPTION_KEY_LEN;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenIdError {
    #[error("claim field exceeds the supported sequence range")]
    ClaimFieldOverflow,
}

/// 256-bit token identifier: option key high, claim sequence low.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub [u8; TOKEN_ID_LEN]);

impl TokenId {
    /// Packs an option key and claim sequence into a token id.
    pub fn encode(option_key: OptionKey, claim_seq: ClaimSeq) -> Self {
        let mut bytes = [0u8; TOKEN_ID_LEN];
        bytes[..OPTION_KEY_LEN].copy_from_slice(&option_key);
        bytes[TOKEN_ID_LEN - 8..].copy_from_slice(&claim_seq.to_be_bytes());
        Self(bytes)
    }

    /// Unpacks a token id into its option key and claim sequence.
    ///
    /// The claim field is 96 bits wide on the wire; ids whose claim field
    /// exceeds the in-memory sequence range were never minted here and are
    /// rejected rather than truncated.
    pub fn decode(&self) -> Result<(OptionKey, ClaimSeq), TokenIdError> {
        let mut option_key = [0u8; OPTION_KEY_LEN];
        option_key.copy_from_slice(&self.0[..OPTION_KEY_LEN]);
        if self.0[OPTION_KEY_LEN..OPTION_KEY_LEN + CLAIM_FIELD_LEN - 8]
            .iter()
            .any(|b| *b != 0)
        {
            return Err(TokenIdError::ClaimFieldOverflow);
        }
        let claim_seq = ClaimSeq::from_be_bytes(self.0[TOKEN_ID_LEN - 8..].try_into().unwrap());
        Ok((option_key, claim_seq))
    }

    /// Token family addressed by this id, from the claim field alone.
    pub fn kind(&self) -> Result<TokenKind, TokenIdError> {
        let (_, claim_seq) = self.decode()?;
        if claim_seq == 0 {
            Ok(TokenKind::Option)
        } else {
            Ok(TokenKind::Claim)
        }
    }

    /// Id of the option token for the same option type.
    pub fn option_id(&self) -> Self {
        let mut bytes = self.0;
        for b in &mut bytes[OPTION_KEY_LEN..] {
            *b = 0;
        }
        Self(bytes)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId(")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Derives the option-type key from immutable terms.
///
/// Mutable state (settlement seed, claim counters) never feeds the key.
pub fn option_key(terms: &OptionTerms) -> OptionKey {
    let mut hasher = Hasher::new();
    hasher.update(&(OPTION_KEY_DOMAIN.len() as u32).to_le_bytes());
    hasher.update(OPTION_KEY_DOMAIN);
    hasher.update(&terms.underlying_asset);
    hasher.update(&terms.underlying_amount.to_le_bytes());
    hasher.update(&terms.exercise_asset);
    hasher.update(&terms.exercise_amount.to_le_bytes());
    hasher.update(&terms.exercise_ts.to_le_bytes());
    hasher.update(&terms.expiry_ts.to_le_bytes());
    let digest = hasher.finalize();
    let mut key = [0u8; OPTION_KEY_LEN];
    key.copy_from_slice(&digest.as_bytes()[..OPTION_KEY_LEN]);
    key
}
