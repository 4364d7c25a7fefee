//! OMG-style base token.
//!
//! Mintable by its owner, otherwise a plain ERC-20 except that `transfer`
//! and `transfer_from` return no data. Insufficient balance or allowance
//! reverts. [`BadErc20::conformant`] builds the same token returning `true`,
//! and the other reference tokens are layered on top of it.

use wrapper_protocol::{Address, Amount};

use super::TokenError;
use crate::base_token::{BaseToken, CallReturn};
use crate::engine::Reentry;
use crate::ledger::{Ledger, LedgerError};

#[derive(Debug, Clone)]
pub struct BadErc20 {
    address: Address,
    owner: Address,
    book: Ledger,
    returns: CallReturn,
}

impl BadErc20 {
    /// Deploys at `address`; only `owner` can mint. Transfers return nothing.
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            book: Ledger::new(),
            returns: CallReturn::Empty,
        }
    }

    /// Same token, but transfers return `true`.
    pub fn conformant(address: Address, owner: Address) -> Self {
        Self {
            returns: CallReturn::Bool(true),
            ..Self::new(address, owner)
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn total_supply(&self) -> Amount {
        self.book.total_supply()
    }

    /// The token's own books.
    pub fn book(&self) -> &Ledger {
        &self.book
    }

    pub(crate) fn book_mut(&mut self) -> &mut Ledger {
        &mut self.book
    }

    /// What a successful transfer hands back.
    pub(crate) fn returns(&self) -> CallReturn {
        self.returns
    }

    /// Creates `amount` base units for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Unauthorized`] unless `caller` is the owner.
    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        if caller != self.owner {
            return Err(TokenError::Unauthorized { caller });
        }
        self.book.mint(to, amount)?;
        Ok(())
    }

    /// Holder-to-holder transfer with no wrapper in the call path.
    pub fn transfer_direct(
        &mut self,
        sender: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.book.transfer(sender, to, amount)?;
        Ok(())
    }
}

impl BaseToken for BadErc20 {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, holder: Address) -> Amount {
        self.book.balance_of(holder)
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.book.allowance(owner, spender)
    }

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<CallReturn, LedgerError> {
        self.book.approve(owner, spender, amount)?;
        Ok(CallReturn::Bool(true))
    }

    fn transfer(
        &mut self,
        sender: Address,
        to: Address,
        amount: Amount,
        _host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        self.book.transfer(sender, to, amount)?;
        Ok(self.returns)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        _host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        self.book.transfer_from(spender, from, to, amount)?;
        Ok(self.returns)
    }
}
