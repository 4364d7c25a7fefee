// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Wrapped-Token Contracts
//!
//! A derivative token issued 1:1 against deposits of an external base
//! asset, redeemable by burning it. The pieces, leaves first:
//!
//! - **Ledger**: derivative balances, allowances, total supply, and the
//!   event log. Plain ERC-20 semantics.
//! - **Base token**: the nominal surface of the wrapped asset. Untrusted:
//!   it may charge fees, lie about success, or call back into the wrapper.
//! - **Adapter**: turns raw base-token calls into *measured* custody
//!   deltas. Never trusts a return value on its own.
//! - **Engine**: deposit (pull, then mint what actually arrived) and
//!   withdraw (burn, then pay out). The only caller of mint/burn.
//! - **Tokens**: reference base assets, conformant and otherwise, used to
//!   exercise the engine.
//!
//! ## Design Principles
//!
//! 1. All monetary operations use `checked_add` and `checked_sub`.
//! 2. Custody is measured, not assumed: `custody >= total_supply` after
//!    every bridge operation or the operation is rolled back.
//! 3. Effects before interactions: burn before payout, mint after receipt.
//! 4. A failed call leaves no trace in the ledger or in the wrapped token.

pub mod adapter;
pub mod base_token;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod tokens;

pub use adapter::{AdapterError, BaseAssetAdapter, MeasuredAdapter, PushOutcome};
pub use base_token::{BaseToken, CallReturn};
pub use engine::{CallStatus, ErrorKind, Reentry, WrapperEngine, WrapperError};
pub use events::Event;
pub use ledger::{Ledger, LedgerError};
