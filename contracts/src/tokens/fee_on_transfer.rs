//! Fee-on-transfer base token.
//!
//! The sender is debited the full amount; the recipient is credited the
//! amount minus `fee_bps` basis points, and the difference goes to the fee
//! collector. A wrapper that minted the requested amount on deposit would
//! be insolvent after the first one.

use wrapper_protocol::config::BPS_DENOMINATOR;
use wrapper_protocol::{Address, Amount};

use super::{BadErc20, TokenError};
use crate::base_token::{BaseToken, CallReturn};
use crate::engine::Reentry;
use crate::ledger::LedgerError;

#[derive(Debug, Clone)]
pub struct FeeOnTransferToken {
    inner: BadErc20,
    fee_bps: u32,
    collector: Address,
}

impl FeeOnTransferToken {
    /// Deploys at `address` charging `fee_bps` on every transfer, paid to
    /// `collector`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidFee`] if `fee_bps` exceeds 100%.
    pub fn new(
        address: Address,
        owner: Address,
        fee_bps: u32,
        collector: Address,
    ) -> Result<Self, TokenError> {
        if u128::from(fee_bps) > BPS_DENOMINATOR {
            return Err(TokenError::InvalidFee(fee_bps));
        }
        Ok(Self {
            inner: BadErc20::conformant(address, owner),
            fee_bps,
            collector,
        })
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    pub fn collector(&self) -> Address {
        self.collector
    }

    /// Fee charged on a transfer of `amount`, rounded down.
    pub fn fee_for(&self, amount: Amount) -> Amount {
        // (q*D + r) * bps / D without the intermediate overflow.
        let bps = u128::from(self.fee_bps);
        (amount / BPS_DENOMINATOR) * bps + (amount % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR
    }

    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        self.inner.mint(caller, to, amount)
    }

    fn charge(
        &mut self,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<CallReturn, LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        let book = self.inner.book();
        if let Some(spender) = spender {
            let available = book.allowance(from, spender);
            if available < amount {
                return Err(LedgerError::InsufficientAllowance {
                    available,
                    requested: amount,
                });
            }
        }
        let available = book.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        let fee = self.fee_for(amount);
        let net = amount - fee;
        let collector = self.collector;
        let book = self.inner.book_mut();
        match spender {
            Some(spender) => {
                book.transfer_from(spender, from, to, net)?;
                book.transfer_from(spender, from, collector, fee)?;
            }
            None => {
                book.transfer(from, to, net)?;
                book.transfer(from, collector, fee)?;
            }
        }
        Ok(self.inner.returns())
    }
}

impl BaseToken for FeeOnTransferToken {
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
        self.charge(None, sender, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        _host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        self.charge(Some(spender), from, to, amount)
    }
}
