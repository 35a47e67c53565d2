// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Shared value types and deterministic identifiers for the settlement system.

pub mod day;
pub mod id;
pub mod types;

pub use day::{day_index, DayIndex, SECONDS_PER_DAY};
pub use id::{option_key, ClaimSeq, OptionKey, TokenId, TokenIdError, OPTION_KEY_LEN, TOKEN_ID_LEN};
pub use types::{AccountId, AssetId, OptionTerms, TokenKind};
