//! Base token that over-debits the sender on `transfer`.
//!
//! Every outbound `transfer` also moves `surcharge` from the sender to a
//! sink. Pulled into a wrapper, this drains custody faster than the
//! derivative is burned; the engine's solvency check has to catch it.

use wrapper_protocol::{Address, Amount};

use super::{BadErc20, TokenError};
use crate::base_token::{BaseToken, CallReturn};
use crate::engine::Reentry;
use crate::ledger::LedgerError;

#[derive(Debug, Clone)]
pub struct DrainingToken {
    inner: BadErc20,
    surcharge: Amount,
    sink: Address,
}

impl DrainingToken {
    pub fn new(address: Address, owner: Address, surcharge: Amount, sink: Address) -> Self {
        Self {
            inner: BadErc20::conformant(address, owner),
            surcharge,
            sink,
        }
    }

    pub fn surcharge(&self) -> Amount {
        self.surcharge
    }

    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        self.inner.mint(caller, to, amount)
    }
}

impl BaseToken for DrainingToken {
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
        let available = self.inner.balance_of(sender);
        // Takes whatever of the surcharge the sender can cover.
        let surcharge = available.saturating_sub(amount).min(self.surcharge);

        let sink = self.sink;
        let book = self.inner.book_mut();
        book.transfer(sender, to, amount)?;
        if surcharge > 0 {
            book.transfer(sender, sink, surcharge)?;
        }
        Ok(CallReturn::Bool(true))
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        self.inner.transfer_from(spender, from, to, amount, host)
    }
}
