//! # Wrapper Engine
//!
//! The deposit/withdraw bridge between the base asset and the derivative
//! ledger, and the only code path that mints or burns.
//!
//! ## Ordering
//!
//! ```text
//! deposit:   check amount -> pull (external) -> mint(received) -> Deposit
//! withdraw:  check amount -> burn(amount) -> push (external) -> Withdrawal
//! ```
//!
//! Mint happens only after custody has grown; burn happens before custody
//! shrinks. Whatever the base token does while it holds control, it sees a
//! ledger that never claims more than custody backs.
//!
//! ## Reentrancy
//!
//! While the base token runs, it holds a [`Reentry`] handle onto the
//! wrapper, bound to the token's own address. Reads and plain ERC-20
//! operations go through against the in-flight state, acting as the token;
//! a nested `deposit` or `withdraw` is refused with
//! [`WrapperError::ReentrantCall`].
//!
//! ## Atomicity
//!
//! Each deposit/withdraw runs against a checkpoint of the ledger and the
//! adapter (which owns the wrapped token's state). Any error restores both,
//! the way the host platform reverts every contract a failed call touched.
//! After every bridge operation `custody >= total_supply` is re-checked; a
//! violation is an error like any other and is rolled back.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use wrapper_protocol::{Address, Amount, ConfigError, WrapperConfig};

use crate::adapter::{AdapterError, BaseAssetAdapter, MeasuredAdapter};
use crate::base_token::BaseToken;
use crate::events::Event;
use crate::ledger::{Ledger, LedgerError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the wrapper's public surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WrapperError {
    /// A derivative-ledger precondition failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The base asset refused, misreported, or under-delivered.
    #[error("base asset transfer failed: {0}")]
    BaseAsset(#[from] AdapterError),

    /// Deposit and withdraw amounts must be non-zero.
    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Custody fell below outstanding supply.
    #[error("insolvent: custody {custody} below total supply {supply}")]
    Insolvent {
        /// Base asset held after the operation.
        custody: Amount,
        /// Derivative outstanding after the operation.
        supply: Amount,
    },

    /// A deposit or withdraw was attempted from inside a base-asset call.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// The deployment configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<ConfigError> for WrapperError {
    fn from(err: ConfigError) -> Self {
        WrapperError::Config(err.to_string())
    }
}

/// Flat classification of every failure the wrapper can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The debited account, on either ledger, holds too little.
    InsufficientBalance,
    /// The spender's allowance, on either ledger, is too small.
    InsufficientAllowance,
    /// Zero deposit or withdraw.
    InvalidAmount,
    /// Null recipient or caller.
    InvalidRecipient,
    /// Null spender.
    InvalidSpender,
    /// A balance or supply would leave the `Amount` range.
    ArithmeticOverflow,
    /// The base asset did not move what it had to, or left custody short.
    BaseAssetTransferFailed,
    /// Deposit or withdraw attempted from inside a base-asset call.
    Reentrancy,
    /// Deployment configuration rejected.
    InvalidConfig,
}

impl LedgerError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            LedgerError::InvalidRecipient => ErrorKind::InvalidRecipient,
            LedgerError::InvalidSpender => ErrorKind::InvalidSpender,
            LedgerError::ArithmeticOverflow => ErrorKind::ArithmeticOverflow,
        }
    }
}

impl AdapterError {
    /// Classification of this error. A revert keeps the base token's own
    /// reason, so a missing base-asset allowance reads as
    /// `InsufficientAllowance`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Reverted(reason) => reason.kind(),
            _ => ErrorKind::BaseAssetTransferFailed,
        }
    }
}

impl WrapperError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WrapperError::Ledger(e) => e.kind(),
            WrapperError::BaseAsset(e) => e.kind(),
            WrapperError::InvalidAmount => ErrorKind::InvalidAmount,
            WrapperError::Insolvent { .. } => ErrorKind::BaseAssetTransferFailed,
            WrapperError::ReentrantCall => ErrorKind::Reentrancy,
            WrapperError::Config(_) => ErrorKind::InvalidConfig,
        }
    }
}

// ---------------------------------------------------------------------------
// Reentry
// ---------------------------------------------------------------------------

/// Which bridge operation currently has an external call in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStatus {
    /// No external call in flight.
    Idle,
    /// Pulling base asset in for a deposit.
    Depositing,
    /// Paying base asset out for a withdrawal.
    Withdrawing,
}

/// The wrapper as seen from inside a base-asset call.
///
/// Every mutating call acts as [`Reentry::caller`], the base-asset contract
/// itself. It can spend its own derivative balance and allowances holders
/// granted to it, and nothing else.
pub trait Reentry {
    /// Operation in flight.
    fn status(&self) -> CallStatus;

    /// Identity nested calls act as.
    fn caller(&self) -> Address;

    /// Derivative balance of `account`.
    fn balance_of(&self, account: Address) -> Amount;

    /// Derivative supply.
    fn total_supply(&self) -> Amount;

    /// Allowance `owner` has granted `spender` on the derivative.
    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// The caller sets `spender`'s allowance over its own balance.
    fn approve(&mut self, spender: Address, amount: Amount) -> Result<bool, WrapperError>;

    /// The caller sends `amount` of its own derivative to `to`.
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<bool, WrapperError>;

    /// The caller spends an allowance `from` granted it.
    fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool, WrapperError>;

    /// Nested deposit. Always refused.
    fn deposit(&mut self, amount: Amount) -> Result<(), WrapperError>;

    /// Nested withdraw. Always refused.
    fn withdraw(&mut self, amount: Amount) -> Result<(), WrapperError>;
}

/// Handle lent to the base token for the duration of one external call.
pub(crate) struct CallFrame<'a> {
    ledger: &'a mut Ledger,
    status: CallStatus,
    caller: Address,
}

impl<'a> CallFrame<'a> {
    /// Frame whose mutating calls act as `caller`.
    pub(crate) fn new(ledger: &'a mut Ledger, status: CallStatus, caller: Address) -> Self {
        Self {
            ledger,
            status,
            caller,
        }
    }
}

impl Reentry for CallFrame<'_> {
    fn status(&self) -> CallStatus {
        self.status
    }

    fn caller(&self) -> Address {
        self.caller
    }

    fn balance_of(&self, account: Address) -> Amount {
        self.ledger.balance_of(account)
    }

    fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    fn approve(&mut self, spender: Address, amount: Amount) -> Result<bool, WrapperError> {
        Ok(self.ledger.approve(self.caller, spender, amount)?)
    }

    fn transfer(&mut self, to: Address, amount: Amount) -> Result<bool, WrapperError> {
        Ok(self.ledger.transfer(self.caller, to, amount)?)
    }

    fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool, WrapperError> {
        Ok(self.ledger.transfer_from(self.caller, from, to, amount)?)
    }

    fn deposit(&mut self, amount: Amount) -> Result<(), WrapperError> {
        warn!(caller = %self.caller, amount, status = ?self.status, "nested deposit refused");
        Err(WrapperError::ReentrantCall)
    }

    fn withdraw(&mut self, amount: Amount) -> Result<(), WrapperError> {
        warn!(caller = %self.caller, amount, status = ?self.status, "nested withdraw refused");
        Err(WrapperError::ReentrantCall)
    }
}

// ---------------------------------------------------------------------------
// WrapperEngine
// ---------------------------------------------------------------------------

/// A deployed wrapper: derivative ledger plus custody of one base asset.
#[derive(Debug, Clone)]
pub struct WrapperEngine<A> {
    config: WrapperConfig,
    underlying: Address,
    ledger: Ledger,
    adapter: A,
}

impl<T: BaseToken + Clone> WrapperEngine<MeasuredAdapter<T>> {
    /// Deploys a wrapper over `token`, holding custody at `config.address`.
    pub fn over_token(config: WrapperConfig, token: T) -> Result<Self, WrapperError> {
        let underlying = token.address();
        let adapter = MeasuredAdapter::new(token, config.address);
        Self::new(config, underlying, adapter)
    }

    /// The wrapped token.
    pub fn base_token(&self) -> &T {
        self.adapter.token()
    }

    /// Mutable access to the wrapped token, for acting on it outside the
    /// wrapper (minting base units, approving the wrapper).
    pub fn base_token_mut(&mut self) -> &mut T {
        self.adapter.token_mut()
    }
}

impl<A: BaseAssetAdapter + Clone> WrapperEngine<A> {
    /// Deploys a wrapper for the asset at `underlying`, reached through
    /// `adapter`. Supply starts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`WrapperError::Config`] if the config fails validation or
    /// `underlying` is the null address or the wrapper's own address.
    pub fn new(config: WrapperConfig, underlying: Address, adapter: A) -> Result<Self, WrapperError> {
        config.validate()?;
        if underlying.is_zero() {
            return Err(WrapperError::Config(
                "underlying asset cannot be the null address".into(),
            ));
        }
        if underlying == config.address {
            return Err(WrapperError::Config(
                "wrapper cannot wrap itself".into(),
            ));
        }

        info!(
            name = %config.name,
            symbol = %config.symbol,
            wrapper = %config.address,
            %underlying,
            "wrapper deployed"
        );
        Ok(Self {
            config,
            underlying,
            ledger: Ledger::new(),
            adapter,
        })
    }

    // -- Metadata -----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    /// The wrapper's own address (the custodian of the base asset).
    pub fn address(&self) -> Address {
        self.config.address
    }

    /// Address of the wrapped base asset. Fixed at construction.
    pub fn underlying(&self) -> Address {
        self.underlying
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    // -- Reads --------------------------------------------------------------

    pub fn balance_of(&self, account: Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    /// Base asset currently held by the wrapper.
    pub fn custody(&self) -> Amount {
        self.adapter.balance_of_base(self.config.address)
    }

    /// Returns `true` if custody covers the outstanding supply.
    pub fn is_solvent(&self) -> bool {
        self.custody() >= self.total_supply()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn events(&self) -> &[Event] {
        self.ledger.events()
    }

    /// Hands the event log over to an indexer.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.ledger.drain_events()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Ledger state as JSON.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.ledger)
    }

    // -- ERC-20 surface -----------------------------------------------------

    /// `owner` sets `spender`'s allowance to `amount`.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<bool, WrapperError> {
        Ok(self.ledger.approve(owner, spender, amount)?)
    }

    /// `from` sends `amount` derivative to `to`.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool, WrapperError> {
        Ok(self.ledger.transfer(from, to, amount)?)
    }

    /// `spender` moves `amount` of `owner`'s derivative to `to`.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        owner: Address,
        to: Address,
        amount: Amount,
    ) -> Result<bool, WrapperError> {
        Ok(self.ledger.transfer_from(spender, owner, to, amount)?)
    }

    // -- Bridge -------------------------------------------------------------

    /// Wraps up to `amount` of `caller`'s base asset.
    ///
    /// The caller must have approved the wrapper for at least `amount` on
    /// the base asset. The derivative minted is whatever custody actually
    /// grew by, which is less than `amount` for fee-charging assets.
    ///
    /// # Errors
    ///
    /// [`WrapperError::InvalidAmount`] for zero; base-asset reverts
    /// (insufficient allowance or balance) as [`WrapperError::BaseAsset`];
    /// [`WrapperError::Insolvent`] if custody ends below supply. State is
    /// unchanged on every error.
    pub fn deposit(&mut self, caller: Address, amount: Amount) -> Result<(), WrapperError> {
        self.atomically("deposit", |engine| engine.deposit_inner(caller, amount))
    }

    /// Burns `amount` of `caller`'s derivative and pays out the same amount
    /// of base asset.
    ///
    /// # Errors
    ///
    /// [`WrapperError::InvalidAmount`] for zero; insufficient derivative
    /// balance as [`WrapperError::Ledger`]; a payout the base asset did not
    /// deliver as [`WrapperError::BaseAsset`];
    /// [`WrapperError::Insolvent`] if the payout drained more custody than
    /// was burned. State is unchanged on every error.
    pub fn withdraw(&mut self, caller: Address, amount: Amount) -> Result<(), WrapperError> {
        self.atomically("withdraw", |engine| engine.withdraw_inner(caller, amount))
    }

    fn deposit_inner(&mut self, caller: Address, amount: Amount) -> Result<(), WrapperError> {
        if amount == 0 {
            return Err(WrapperError::InvalidAmount);
        }
        if caller.is_zero() {
            return Err(LedgerError::InvalidRecipient.into());
        }

        let custodian = self.config.address;
        let custody_before = self.adapter.balance_of_base(custodian);
        let received = {
            let mut frame =
                CallFrame::new(&mut self.ledger, CallStatus::Depositing, self.underlying);
            self.adapter.pull_from(caller, amount, &mut frame)?
        };
        let custody_after = self.adapter.balance_of_base(custodian);

        // The adapter's figure must agree with what the engine sees.
        if custody_after.checked_sub(custody_before) != Some(received) {
            return Err(AdapterError::UnexpectedDelta {
                before: custody_before,
                after: custody_after,
            }
            .into());
        }

        self.ledger.mint(caller, received)?;
        self.ledger.emit(Event::Deposit {
            caller,
            requested: amount,
            received,
        });
        self.ensure_solvent()?;

        info!(%caller, requested = amount, received, total_supply = self.total_supply(), "deposit");
        Ok(())
    }

    fn withdraw_inner(&mut self, caller: Address, amount: Amount) -> Result<(), WrapperError> {
        if amount == 0 {
            return Err(WrapperError::InvalidAmount);
        }

        self.ledger.burn(caller, amount)?;

        let outcome = {
            let mut frame =
                CallFrame::new(&mut self.ledger, CallStatus::Withdrawing, self.underlying);
            self.adapter.push_to(caller, amount, &mut frame)
        };
        if let Some(reason) = outcome.failure {
            return Err(reason.into());
        }
        if outcome.released != amount {
            warn!(
                %caller,
                burned = amount,
                released = outcome.released,
                "payout custody delta differs from burned amount"
            );
        }

        self.ledger.emit(Event::Withdrawal { caller, amount });
        self.ensure_solvent()?;

        info!(%caller, amount, total_supply = self.total_supply(), "withdrawal");
        Ok(())
    }

    fn ensure_solvent(&self) -> Result<(), WrapperError> {
        let custody = self.custody();
        let supply = self.total_supply();
        if custody < supply {
            error!(custody, supply, "custody below supply");
            return Err(WrapperError::Insolvent { custody, supply });
        }
        Ok(())
    }

    /// Runs `op` against a checkpoint; restores it if `op` fails.
    fn atomically<R>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self) -> Result<R, WrapperError>,
    ) -> Result<R, WrapperError> {
        let ledger = self.ledger.clone();
        let adapter = self.adapter.clone();

        match op(self) {
            Ok(value) => {
                debug_assert!(self.ledger.is_conserved());
                Ok(value)
            }
            Err(err) => {
                self.ledger = ledger;
                self.adapter = adapter;
                debug!(operation, kind = ?err.kind(), %err, "rolled back");
                Err(err)
            }
        }
    }
}
