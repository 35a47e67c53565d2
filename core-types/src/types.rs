// Copyright (c) James Kassemi, SC, US. All rights reserved.

use serde::{Deserialize, Serialize};

/// Address-like identifier of an ERC-20-style asset.
pub type AssetId = [u8; 20];

/// Address-like identifier of an account holding assets or tokens.
pub type AccountId = [u8; 20];

/// Immutable contract terms defining one class of options.
///
/// `underlying_amount` and `exercise_amount` are per-contract quantities;
/// timestamps are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTerms {
    pub underlying_asset: AssetId,
    pub underlying_amount: u64,
    pub exercise_asset: AssetId,
    pub exercise_amount: u64,
    pub exercise_ts: i64,
    pub expiry_ts: i64,
}

/// Which of the two token families an identifier addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Fungible option contracts.
    Option,
    /// Non-fungible writer lot.
    Claim,
}
