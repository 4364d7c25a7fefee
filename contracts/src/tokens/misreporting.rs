//! Base token whose return flag cannot be believed.
//!
//! Depending on its [`Misreport`] mode a transfer may claim failure while
//! moving funds, claim success while moving nothing, or fail silently by
//! returning `false` without reverting.

use wrapper_protocol::{Address, Amount};

use super::{BadErc20, TokenError};
use crate::base_token::{BaseToken, CallReturn};
use crate::engine::Reentry;
use crate::ledger::LedgerError;

/// How transfers misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misreport {
    /// Move funds and return `true`.
    Honest,
    /// Move nothing and return `false`.
    FalseWithoutMoving,
    /// Move nothing and return `true`.
    TrueWithoutMoving,
    /// Move funds and return `false`.
    FalseAfterMoving,
}

#[derive(Debug, Clone)]
pub struct MisreportingToken {
    inner: BadErc20,
    mode: Misreport,
}

impl MisreportingToken {
    /// Deploys an honest token; switch modes with [`Self::set_mode`].
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            inner: BadErc20::conformant(address, owner),
            mode: Misreport::Honest,
        }
    }

    pub fn mode(&self) -> Misreport {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Misreport) {
        self.mode = mode;
    }

    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        self.inner.mint(caller, to, amount)
    }

    /// Runs `transfer` unless the mode says nothing moves, then answers
    /// according to the mode.
    fn respond(
        &mut self,
        transfer: impl FnOnce(&mut BadErc20) -> Result<(), LedgerError>,
    ) -> Result<CallReturn, LedgerError> {
        match self.mode {
            Misreport::Honest => {
                transfer(&mut self.inner)?;
                Ok(CallReturn::Bool(true))
            }
            Misreport::FalseWithoutMoving => Ok(CallReturn::Bool(false)),
            Misreport::TrueWithoutMoving => Ok(CallReturn::Bool(true)),
            Misreport::FalseAfterMoving => {
                transfer(&mut self.inner)?;
                Ok(CallReturn::Bool(false))
            }
        }
    }
}

impl BaseToken for MisreportingToken {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn balance_of(&self, holder: Address) -> Amount {
        self.inner.balance_of(holder)
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.inner.allowance(owner, spender)
    }

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<CallReturn, LedgerError> {
        self.inner.approve(owner, spender, amount)
    }

    fn transfer(
        &mut self,
        sender: Address,
        to: Address,
        amount: Amount,
        _host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        self.respond(|token| token.book_mut().transfer(sender, to, amount).map(drop))
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        _host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        self.respond(|token| {
            token
                .book_mut()
                .transfer_from(spender, from, to, amount)
                .map(drop)
        })
    }
}
