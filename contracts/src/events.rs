//! # Ledger Events
//!
//! Every state change the outside world can observe is announced by an
//! [`Event`]. The log is append-only within a call and is rolled back with
//! the rest of the state when a call fails, so an indexer never sees events
//! for operations that did not happen.

use serde::{Deserialize, Serialize};
use wrapper_protocol::{Address, Amount};

/// An observable state change.
///
/// Mints appear as `Transfer` from [`Address::ZERO`], burns as `Transfer` to
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Derivative units moved between holders (or were minted/burned).
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// An allowance was set.
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    /// Base asset was wrapped. `received` is what actually arrived and
    /// what was minted; `requested` is what the caller asked for.
    Deposit {
        caller: Address,
        requested: Amount,
        received: Amount,
    },
    /// Derivative was burned and the base asset paid out.
    Withdrawal { caller: Address, amount: Amount },
}

impl Event {
    /// Short name, mainly for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Transfer { .. } => "Transfer",
            Event::Approval { .. } => "Approval",
            Event::Deposit { .. } => "Deposit",
            Event::Withdrawal { .. } => "Withdrawal",
        }
    }
}
