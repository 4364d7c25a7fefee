//! # Base Asset Adapter
//!
//! The engine's only window onto the wrapped asset. The contract is
//! *measure, don't trust*: how much value moved is decided by reading the
//! wrapper's own base-asset balance immediately before and after the call,
//! never by what the token says it did.
//!
//! ```text
//! pull_from:  before = balance(custodian)
//!             token.transfer_from(owner -> custodian)
//!             after  = balance(custodian)
//!             received = after - before          (0 or negative => error)
//!
//! push_to:    before = balance(custodian)
//!             token.transfer(custodian -> recipient)
//!             after  = balance(custodian)
//!             released = before - after          (0 => not delivered)
//! ```
//!
//! The token's return flag is kept only for diagnostics: a `false` next to
//! a positive delta is logged and otherwise ignored.

use thiserror::Error;
use tracing::{debug, warn};
use wrapper_protocol::{Address, Amount};

use crate::base_token::BaseToken;
use crate::engine::Reentry;
use crate::ledger::LedgerError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a base-asset movement is considered failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The base token reverted with its own reason.
    #[error("base asset reverted: {0}")]
    Reverted(#[from] LedgerError),

    /// The token returned `false` and nothing moved.
    #[error("base asset reported transfer failure")]
    ReportedFailure,

    /// Custody moved in the wrong direction during the call.
    #[error("unexpected custody delta: before {before}, after {after}")]
    UnexpectedDelta {
        /// Custodian balance before the call.
        before: Amount,
        /// Custodian balance after the call.
        after: Amount,
    },

    /// The pull claimed success but custody did not grow.
    #[error("no base asset received")]
    NothingReceived,

    /// The push claimed success but custody did not shrink.
    #[error("no base asset released")]
    NothingReleased,
}

/// Result of an outbound payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// Observed decrease of the custodian's balance.
    pub released: Amount,
    /// Why the payout is not considered delivered, if it is not.
    pub failure: Option<AdapterError>,
}

impl PushOutcome {
    /// Returns `true` if the payout went through.
    pub fn delivered(&self) -> bool {
        self.failure.is_none()
    }
}

// ---------------------------------------------------------------------------
// BaseAssetAdapter
// ---------------------------------------------------------------------------

/// Measured access to the wrapped asset.
pub trait BaseAssetAdapter {
    /// Current base-asset holdings of `holder`.
    fn balance_of_base(&self, holder: Address) -> Amount;

    /// Pulls up to `amount` from `owner` into custody via the owner's
    /// allowance and returns the quantity that actually arrived.
    fn pull_from(
        &mut self,
        owner: Address,
        amount: Amount,
        host: &mut dyn Reentry,
    ) -> Result<Amount, AdapterError>;

    /// Pays `amount` out of custody to `recipient`.
    fn push_to(&mut self, recipient: Address, amount: Amount, host: &mut dyn Reentry)
        -> PushOutcome;
}

/// [`BaseAssetAdapter`] over any [`BaseToken`], holding custody under
/// `custodian`.
#[derive(Debug, Clone)]
pub struct MeasuredAdapter<T> {
    token: T,
    custodian: Address,
}

impl<T: BaseToken> MeasuredAdapter<T> {
    /// Wraps `token`, measuring deltas on `custodian`'s balance.
    pub fn new(token: T, custodian: Address) -> Self {
        Self { token, custodian }
    }

    /// The address whose base-asset balance is custody.
    pub fn custodian(&self) -> Address {
        self.custodian
    }

    /// The wrapped token.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// Mutable access to the wrapped token, for holders acting on it
    /// directly (approving the wrapper, receiving mints).
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    fn custody(&self) -> Amount {
        self.token.balance_of(self.custodian)
    }
}

impl<T: BaseToken> BaseAssetAdapter for MeasuredAdapter<T> {
    fn balance_of_base(&self, holder: Address) -> Amount {
        self.token.balance_of(holder)
    }

    fn pull_from(
        &mut self,
        owner: Address,
        amount: Amount,
        host: &mut dyn Reentry,
    ) -> Result<Amount, AdapterError> {
        let before = self.custody();
        let returned = self
            .token
            .transfer_from(self.custodian, owner, self.custodian, amount, host)?;
        let after = self.custody();

        let received = after
            .checked_sub(before)
            .ok_or(AdapterError::UnexpectedDelta { before, after })?;

        if received == 0 {
            return Err(if returned.signals_failure() {
                AdapterError::ReportedFailure
            } else {
                AdapterError::NothingReceived
            });
        }
        if returned.signals_failure() {
            warn!(%owner, requested = amount, received, "base asset reported failure but delivered; trusting measurement");
        }
        if received != amount {
            debug!(%owner, requested = amount, received, "inbound delta differs from request");
        }
        Ok(received)
    }

    fn push_to(
        &mut self,
        recipient: Address,
        amount: Amount,
        host: &mut dyn Reentry,
    ) -> PushOutcome {
        let before = self.custody();
        let result = self
            .token
            .transfer(self.custodian, recipient, amount, host);
        let after = self.custody();
        let released = before.saturating_sub(after);

        let failure = match result {
            Err(reason) => Some(AdapterError::Reverted(reason)),
            Ok(_) if after > before => Some(AdapterError::UnexpectedDelta { before, after }),
            Ok(returned) if released == 0 => Some(if returned.signals_failure() {
                AdapterError::ReportedFailure
            } else {
                AdapterError::NothingReleased
            }),
            Ok(returned) => {
                if returned.signals_failure() {
                    warn!(%recipient, amount, released, "base asset reported failure but released; trusting measurement");
                }
                None
            }
        };

        if let Some(reason) = &failure {
            warn!(%recipient, amount, %reason, "payout not delivered");
        }
        PushOutcome { released, failure }
    }
}
