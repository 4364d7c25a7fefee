//! Base token that calls back into the wrapper mid-transfer.
//!
//! After moving funds (the way a receive hook fires), the token records
//! what the wrapper looks like from inside the call and then runs its
//! configured [`ReentryAttack`] through the [`Reentry`] handle, acting as
//! itself. Failures of
//! the nested call are recorded, not propagated, so the outer operation
//! completes and the observations survive.

use wrapper_protocol::{Address, Amount};

use super::{BadErc20, TokenError};
use crate::base_token::{BaseToken, CallReturn};
use crate::engine::{CallStatus, ErrorKind, Reentry};
use crate::ledger::LedgerError;

/// What the token does once it has control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReentryAttack {
    /// Only record an [`Observation`].
    Observe,
    /// Deposit again.
    Deposit(Amount),
    /// Withdraw again.
    Withdraw(Amount),
    /// Send the token's own derivative to `to`.
    TransferTo { to: Address, amount: Amount },
    /// Spend an allowance `from` granted the token.
    TransferFrom {
        from: Address,
        to: Address,
        amount: Amount,
    },
}

/// Which transfers trigger the attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReentryHook {
    /// `transfer_from` into the wrapper (deposits).
    Inbound,
    /// `transfer` out of the wrapper (withdrawals).
    Outbound,
    Both,
}

impl ReentryHook {
    fn fires_on_inbound(self) -> bool {
        matches!(self, ReentryHook::Inbound | ReentryHook::Both)
    }

    fn fires_on_outbound(self) -> bool {
        matches!(self, ReentryHook::Outbound | ReentryHook::Both)
    }
}

/// The wrapper's state as seen from inside one base-asset call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Bridge operation in flight.
    pub status: CallStatus,
    /// Holder on the other side of the transfer.
    pub party: Address,
    /// Party's derivative balance.
    pub party_balance: Amount,
    /// Derivative supply.
    pub total_supply: Amount,
    /// Base asset held by the wrapper after this transfer moved.
    pub custody: Amount,
    /// Result of the nested call.
    pub outcome: Result<(), ErrorKind>,
}

#[derive(Debug, Clone)]
pub struct ReentrantToken {
    inner: BadErc20,
    attack: ReentryAttack,
    hook: ReentryHook,
    observations: Vec<Observation>,
}

impl ReentrantToken {
    pub fn new(address: Address, owner: Address, attack: ReentryAttack, hook: ReentryHook) -> Self {
        Self {
            inner: BadErc20::new(address, owner),
            attack,
            hook,
            observations: Vec::new(),
        }
    }

    pub fn set_attack(&mut self, attack: ReentryAttack, hook: ReentryHook) {
        self.attack = attack;
        self.hook = hook;
    }

    /// Everything recorded so far, oldest first.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        self.inner.mint(caller, to, amount)
    }

    fn strike(&mut self, party: Address, custody: Amount, host: &mut dyn Reentry) {
        let party_balance = host.balance_of(party);
        let total_supply = host.total_supply();

        let outcome = match self.attack {
            ReentryAttack::Observe => Ok(()),
            ReentryAttack::Deposit(amount) => host.deposit(amount),
            ReentryAttack::Withdraw(amount) => host.withdraw(amount),
            ReentryAttack::TransferTo { to, amount } => host.transfer(to, amount).map(drop),
            ReentryAttack::TransferFrom { from, to, amount } => {
                host.transfer_from(from, to, amount).map(drop)
            }
        }
        .map_err(|err| err.kind());

        self.observations.push(Observation {
            status: host.status(),
            party,
            party_balance,
            total_supply,
            custody,
            outcome,
        });
    }
}

impl BaseToken for ReentrantToken {
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
        host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        let returned = self.inner.transfer(sender, to, amount, host)?;
        if self.hook.fires_on_outbound() {
            let custody = self.inner.balance_of(sender);
            self.strike(to, custody, host);
        }
        Ok(returned)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        host: &mut dyn Reentry,
    ) -> Result<CallReturn, LedgerError> {
        let returned = self.inner.transfer_from(spender, from, to, amount, host)?;
        if self.hook.fires_on_inbound() {
            let custody = self.inner.balance_of(to);
            self.strike(from, custody, host);
        }
        Ok(returned)
    }
}
