//! # Base Token Surface
//!
//! The external asset being wrapped, seen exactly as a caller on the host
//! platform would see it: a nominal ERC-20 interface whose implementation
//! nobody here controls. Nothing about a [`BaseToken`] is trusted:
//!
//! - a value-moving call may revert, return a boolean, or return nothing at
//!   all (the pre-standard shape OMG and friends shipped with);
//! - the boolean, when present, may be a lie;
//! - the amount that moves may differ from the amount requested;
//! - the call may re-enter the wrapper through the [`Reentry`] handle before
//!   it returns.
//!
//! The engine never talks to a `BaseToken` directly. It goes through a
//! [`crate::adapter::BaseAssetAdapter`], which measures what actually
//! happened.

use wrapper_protocol::{Address, Amount};

use crate::engine::Reentry;
use crate::ledger::LedgerError;

/// What a value-moving base-token call handed back, when it did not revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallReturn {
    /// The call returned no data.
    Empty,
    /// The call returned a success flag.
    Bool(bool),
}

impl CallReturn {
    /// Returns `true` only when the token explicitly answered `false`.
    ///
    /// An empty return is the convention of pre-standard tokens for
    /// "succeeded", so it is not a failure signal.
    pub fn signals_failure(&self) -> bool {
        matches!(self, CallReturn::Bool(false))
    }
}

/// Nominal ERC-20 surface of the wrapped asset.
///
/// A revert is modelled as `Err`, carrying the token's own reason.
pub trait BaseToken {
    /// The token contract's own address.
    fn address(&self) -> Address;

    /// Base-asset holdings of `holder`.
    fn balance_of(&self, holder: Address) -> Amount;

    /// Allowance `owner` has granted `spender` on the base asset.
    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// `owner` grants `spender` an allowance of `amount`.
    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<CallReturn, LedgerError>;

    /// `sender` sends `amount` to `to`.
    fn transfer(
        &mut self,
        sender: Address,
        to: Address,
        amount: Amount,
        host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError>;

    /// `spender` moves `amount` from `from` to `to` using its allowance.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError>;
}
