//! # Reference Base Tokens
//!
//! Concrete [`BaseToken`](crate::base_token::BaseToken) implementations the
//! wrapper is exercised against. One is the well-behaved-but-pre-standard
//! asset the wrapper was written for; the rest each break one assumption a
//! naive wrapper would make.
//!
//! ```text
//! bad_erc20.rs        OMG-style: owner mint, transfers return nothing
//! fee_on_transfer.rs  recipient gets amount minus a basis-point fee
//! misreporting.rs     return flag disagrees with what moved
//! reentrant.rs        calls back into the wrapper mid-transfer
//! draining.rs         outbound transfers take more than asked
//! ```
//!
//! Every token keeps its books in a [`Ledger`](crate::ledger::Ledger), so
//! balances, allowances and the unlimited-allowance rule behave exactly as
//! they do for the derivative.

pub mod bad_erc20;
pub mod draining;
pub mod fee_on_transfer;
pub mod misreporting;
pub mod reentrant;

use thiserror::Error;
use wrapper_protocol::Address;

use crate::ledger::LedgerError;

pub use bad_erc20::BadErc20;
pub use draining::DrainingToken;
pub use fee_on_transfer::FeeOnTransferToken;
pub use misreporting::{Misreport, MisreportingToken};
pub use reentrant::{Observation, ReentrantToken, ReentryAttack, ReentryHook};

/// Errors from token administration (not from transfers, which revert with
/// a [`LedgerError`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Only the token owner may mint.
    #[error("unauthorized: {caller} is not the token owner")]
    Unauthorized {
        /// Who tried.
        caller: Address,
    },

    /// A fee above 100% was configured.
    #[error("invalid fee: {0} bps exceeds 10000")]
    InvalidFee(u32),

    /// The underlying book rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
