use thiserror::Error;

use core_types::TokenId;
use custody_api::TransferError;

use crate::assign::AssignError;

pub type Result<T> = std::result::Result<T, SettlementError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("option type {option_id} already exists")]
    OptionTypeAlreadyExists { option_id: TokenId },
    #[error("expiry must be at least {min_s}s after creation")]
    ExpiryWindowTooShort { min_s: i64 },
    #[error("exercise window must span at least {min_s}s before expiry")]
    ExerciseWindowTooShort { min_s: i64 },
    #[error("underlying and exercise assets are not a usable pair")]
    InvalidAssetPair,
    #[error("unknown option type")]
    UnknownOptionType,
    #[error("option type expired at {expiry_ts}")]
    OptionTypeExpired { expiry_ts: i64 },
    #[error("exercise opens at {exercise_ts}")]
    ExerciseNotYetOpen { exercise_ts: i64 },
    #[error("amount must be nonzero")]
    ZeroAmount,
    #[error("claim is not owned by the caller")]
    ClaimNotOwnedByCaller,
    #[error("caller holds {held} option contracts, operation needs {needed}")]
    InsufficientOptionBalance { needed: u64, held: u64 },
    #[error("claim is redeemable at or after expiry {expiry_ts}")]
    ClaimNotYetRedeemable { expiry_ts: i64 },
    #[error("token not found")]
    TokenNotFound,
    #[error("token id does not address a claim")]
    NotAClaim,
    #[error("token id does not address an option")]
    NotAnOption,
    /// Defect class: reachable only if outstanding-supply accounting was
    /// violated upstream.
    #[error("assignment overran available capacity: {0}")]
    AssignmentCapacityExhausted(#[from] AssignError),
    #[error("asset transfer failed: {0}")]
    Transfer(#[from] TransferError),
}
