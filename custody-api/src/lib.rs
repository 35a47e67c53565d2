// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Boundary interfaces the settlement core depends on.
//!
//! The crate exposes:
//! - [`Clock`]: logical time for day bucketing and window gating.
//! - [`AssetLedger`]: fungible asset custody bracketing core mutation.
//! - [`TokenLedger`]: option/claim token balances the core validates against.
//!
//! Each trait ships with an in-memory implementation suitable for tests
//! and for embedding the core without an external token platform.

pub mod assets;
pub mod clock;
pub mod tokens;

pub use assets::{AssetLedger, InMemoryAssetLedger, TransferError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use tokens::{InMemoryTokenLedger, TokenLedger, TokenLedgerError};
