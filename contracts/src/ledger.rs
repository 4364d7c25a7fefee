//! # Derivative Ledger
//!
//! Balances, allowances and total supply with ERC-20 semantics, plus the
//! event log. The ledger knows nothing about the base asset; it is driven
//! by holders (transfer/approve) and by the engine (mint/burn).
//!
//! ## Invariants
//!
//! - `total_supply == Σ balances` after every mutation. Checked with
//!   `debug_assert!` in debug builds and exposed as [`Ledger::is_conserved`].
//! - Every operation validates fully before writing anything, so a failed
//!   call leaves the ledger untouched.
//! - Missing entries read as zero; a zeroed entry is indistinguishable from
//!   one that never existed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};
use wrapper_protocol::amount::{self, Amount};
use wrapper_protocol::Address;

use crate::events::Event;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The debited account holds less than the amount.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Current balance of the debited account.
        available: Amount,
        /// Amount the caller tried to move.
        requested: Amount,
    },

    /// The spender's allowance is below the amount.
    #[error("insufficient allowance: available {available}, requested {requested}")]
    InsufficientAllowance {
        /// Allowance currently granted to the spender.
        available: Amount,
        /// Amount the spender tried to move.
        requested: Amount,
    },

    /// The recipient is the null address.
    #[error("invalid recipient: cannot transfer to the null address")]
    InvalidRecipient,

    /// The spender is the null address.
    #[error("invalid spender: cannot approve the null address")]
    InvalidSpender,

    /// A balance or the total supply would exceed `Amount::MAX`.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Derivative-token state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Per-holder balances.
    balances: HashMap<Address, Amount>,
    /// `owner -> (spender -> allowance)`.
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    /// Sum of all balances.
    total_supply: Amount,
    /// Events in emission order.
    events: Vec<Event>,
}

impl Ledger {
    /// Creates an empty ledger with zero supply.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Reads --------------------------------------------------------------

    /// Balance of `account`, zero if it never held anything.
    pub fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Outstanding derivative supply.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// How much `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or(0)
    }

    /// Events emitted so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and returns every event emitted so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Accounts with a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(account, balance)| (*account, *balance))
    }

    /// Returns `true` if the balances add up to the total supply.
    pub fn is_conserved(&self) -> bool {
        let mut sum: Amount = 0;
        for balance in self.balances.values() {
            match sum.checked_add(*balance) {
                Some(next) => sum = next,
                None => return false,
            }
        }
        sum == self.total_supply
    }

    // -- Holder operations --------------------------------------------------

    /// Sets `spender`'s allowance over `owner`'s balance to exactly `amount`.
    ///
    /// Not additive: a second approval replaces the first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSpender`] if `spender` is the null
    /// address.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<bool, LedgerError> {
        if spender.is_zero() {
            return Err(LedgerError::InvalidSpender);
        }

        self.set_allowance(owner, spender, amount);
        trace!(%owner, %spender, amount, "approval set");
        self.emit(Event::Approval {
            owner,
            spender,
            amount,
        });
        Ok(true)
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRecipient`] if `to` is the null address
    /// and [`LedgerError::InsufficientBalance`] if `from` holds too little.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool, LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        self.move_balance(from, to, amount)?;
        Ok(true)
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance unless it is unlimited.
    ///
    /// # Errors
    ///
    /// Checked in order: [`LedgerError::InvalidRecipient`],
    /// [`LedgerError::InsufficientAllowance`],
    /// [`LedgerError::InsufficientBalance`].
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool, LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        let current = self.allowance(from, spender);
        let remaining =
            amount::spend_allowance(current, amount).ok_or(LedgerError::InsufficientAllowance {
                available: current,
                requested: amount,
            })?;

        // Balance moves first: if it fails nothing has been written yet.
        self.move_balance(from, to, amount)?;
        if remaining != current {
            self.set_allowance(from, spender, remaining);
        }

        trace!(%spender, %from, remaining, "allowance spent");
        Ok(true)
    }

    // -- Supply operations (engine only) ------------------------------------

    /// Creates `amount` new units in `to`'s balance.
    pub(crate) fn mint(&mut self, to: Address, amount: Amount) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.total_supply = new_supply;
        self.balances.insert(to, new_balance);
        debug_assert!(self.is_conserved(), "mint broke supply conservation");

        debug!(%to, amount, total_supply = new_supply, "minted");
        self.emit(Event::Transfer {
            from: Address::ZERO,
            to,
            amount,
        });
        Ok(())
    }

    /// Destroys `amount` units from `from`'s balance.
    pub(crate) fn burn(&mut self, from: Address, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        let new_balance = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available,
                requested: amount,
            })?;
        let new_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.balances.insert(from, new_balance);
        self.total_supply = new_supply;
        debug_assert!(self.is_conserved(), "burn broke supply conservation");

        debug!(%from, amount, total_supply = new_supply, "burned");
        self.emit(Event::Transfer {
            from,
            to: Address::ZERO,
            amount,
        });
        Ok(())
    }

    /// Appends an event to the log.
    pub(crate) fn emit(&mut self, event: Event) {
        trace!(event = event.name(), "event emitted");
        self.events.push(event);
    }

    // -- Internals ----------------------------------------------------------

    fn move_balance(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(from);
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available: from_balance,
                requested: amount,
            })?;

        if from != to {
            let new_to = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            self.balances.insert(from, new_from);
            self.balances.insert(to, new_to);
        }
        debug_assert!(self.is_conserved(), "transfer broke supply conservation");

        trace!(%from, %to, amount, "transfer");
        self.emit(Event::Transfer { from, to, amount });
        Ok(())
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrapper_protocol::INFINITE_ALLOWANCE;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    fn carol() -> Address {
        Address::from_label("carol")
    }

    fn funded(amount: Amount) -> Ledger {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), amount).unwrap();
        ledger
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert_eq!(ledger.total_supply(), 0);
        assert_eq!(ledger.balance_of(alice()), 0);
        assert_eq!(ledger.allowance(alice(), bob()), 0);
        assert!(ledger.events().is_empty());
        assert!(ledger.is_conserved());
    }

    #[test]
    fn mint_increases_supply_and_balance() {
        let ledger = funded(1_000);
        assert_eq!(ledger.total_supply(), 1_000);
        assert_eq!(ledger.balance_of(alice()), 1_000);
        assert_eq!(
            ledger.events().last(),
            Some(&Event::Transfer {
                from: Address::ZERO,
                to: alice(),
                amount: 1_000
            })
        );
    }

    #[test]
    fn mint_to_null_rejected() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.mint(Address::ZERO, 1),
            Err(LedgerError::InvalidRecipient)
        );
    }

    #[test]
    fn mint_overflow_rejected_without_side_effects() {
        let mut ledger = funded(Amount::MAX);
        let before = ledger.clone();
        assert_eq!(
            ledger.mint(bob(), 1),
            Err(LedgerError::ArithmeticOverflow)
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn burn_decreases_supply_and_balance() {
        let mut ledger = funded(1_000);
        ledger.burn(alice(), 400).unwrap();
        assert_eq!(ledger.total_supply(), 600);
        assert_eq!(ledger.balance_of(alice()), 600);
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut ledger = funded(100);
        let before = ledger.clone();
        assert_eq!(
            ledger.burn(alice(), 101),
            Err(LedgerError::InsufficientBalance {
                available: 100,
                requested: 101
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn transfer_moves_balance() {
        let mut ledger = funded(100);
        assert!(ledger.transfer(alice(), bob(), 30).unwrap());
        assert_eq!(ledger.balance_of(alice()), 70);
        assert_eq!(ledger.balance_of(bob()), 30);
        assert_eq!(ledger.total_supply(), 100);
        assert!(ledger.is_conserved());
    }

    #[test]
    fn transfer_to_null_rejected() {
        let mut ledger = funded(100);
        assert_eq!(
            ledger.transfer(alice(), Address::ZERO, 1),
            Err(LedgerError::InvalidRecipient)
        );
    }

    #[test]
    fn transfer_to_self_keeps_balance() {
        let mut ledger = funded(100);
        ledger.transfer(alice(), alice(), 60).unwrap();
        assert_eq!(ledger.balance_of(alice()), 100);
        assert!(ledger.transfer(alice(), alice(), 101).is_err());
    }

    #[test]
    fn zero_transfer_is_legal() {
        let mut ledger = Ledger::new();
        assert!(ledger.transfer(alice(), bob(), 0).unwrap());
        assert_eq!(ledger.balance_of(bob()), 0);
    }

    #[test]
    fn approve_replaces_previous_value() {
        let mut ledger = Ledger::new();
        ledger.approve(alice(), bob(), 100).unwrap();
        ledger.approve(alice(), bob(), 40).unwrap();
        assert_eq!(ledger.allowance(alice(), bob()), 40);
        assert_eq!(ledger.allowance(bob(), alice()), 0);
    }

    #[test]
    fn approve_null_spender_rejected() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.approve(alice(), Address::ZERO, 1),
            Err(LedgerError::InvalidSpender)
        );
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut ledger = funded(100);
        ledger.approve(alice(), bob(), 50).unwrap();
        ledger.transfer_from(bob(), alice(), carol(), 20).unwrap();
        assert_eq!(ledger.allowance(alice(), bob()), 30);
        assert_eq!(ledger.balance_of(carol()), 20);
        assert_eq!(ledger.balance_of(alice()), 80);
    }

    #[test]
    fn transfer_from_with_infinite_allowance_keeps_it() {
        let mut ledger = funded(100);
        ledger.approve(alice(), bob(), INFINITE_ALLOWANCE).unwrap();
        for _ in 0..5 {
            ledger.transfer_from(bob(), alice(), carol(), 20).unwrap();
        }
        assert_eq!(ledger.allowance(alice(), bob()), INFINITE_ALLOWANCE);
        assert_eq!(ledger.balance_of(carol()), 100);
    }

    #[test]
    fn transfer_from_insufficient_allowance_rejected() {
        let mut ledger = funded(100);
        ledger.approve(alice(), bob(), 10).unwrap();
        let before = ledger.clone();
        assert_eq!(
            ledger.transfer_from(bob(), alice(), carol(), 11),
            Err(LedgerError::InsufficientAllowance {
                available: 10,
                requested: 11
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn transfer_from_insufficient_balance_keeps_allowance() {
        let mut ledger = funded(10);
        ledger.approve(alice(), bob(), 100).unwrap();
        let result = ledger.transfer_from(bob(), alice(), carol(), 11);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.allowance(alice(), bob()), 100);
    }

    #[test]
    fn holders_skip_zero_balances() {
        let mut ledger = funded(10);
        ledger.transfer(alice(), bob(), 10).unwrap();
        let holders: Vec<_> = ledger.holders().collect();
        assert_eq!(holders, vec![(bob(), 10)]);
    }

    #[test]
    fn drain_events_empties_log() {
        let mut ledger = funded(10);
        let drained = ledger.drain_events();
        assert_eq!(drained.len(), 1);
        assert!(ledger.events().is_empty());
    }
}
