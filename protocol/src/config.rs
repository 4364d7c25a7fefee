//! # Protocol Configuration & Constants
//!
//! Every magic number of the wrapper lives here, next to the
//! [`WrapperConfig`] a deployment is created from.
//!
//! A deployment's identity (name, symbol, decimals, own address) is fixed
//! at construction and never changes afterwards; the base asset it wraps is
//! fixed alongside it by the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Token Metadata Defaults
// ---------------------------------------------------------------------------

/// Default derivative name. The reference deployment wraps OMG.
pub const DEFAULT_NAME: &str = "Wrapped OMG";

/// Default derivative ticker.
pub const DEFAULT_SYMBOL: &str = "WOMG";

/// Default decimal precision. Matches the wrapped asset so 1 unit of
/// derivative is always 1 unit of base, no rescaling.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Label the default deployment address is derived from.
pub const DEFAULT_DEPLOYMENT_LABEL: &str = "wrapper/womg";

// ---------------------------------------------------------------------------
// Validation Limits
// ---------------------------------------------------------------------------

/// Largest decimal precision an `Amount` (u128, ~3.4e38) can meaningfully
/// display with at least one whole unit.
pub const MAX_DECIMALS: u8 = 38;

/// Maximum ticker length in bytes.
pub const MAX_SYMBOL_LENGTH: usize = 16;

/// Maximum name length in bytes.
pub const MAX_NAME_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Fee Arithmetic
// ---------------------------------------------------------------------------

/// Denominator for basis-point fees (1 bp = 0.01%).
pub const BPS_DENOMINATOR: u128 = 10_000;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "wrapper_contracts=info,wrapper_protocol=info";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while loading or validating a [`WrapperConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse wrapper config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field is present but its value is unusable.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// WrapperConfig
// ---------------------------------------------------------------------------

/// Per-deployment settings for a wrapper instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WrapperConfig {
    /// Human-readable derivative name.
    pub name: String,
    /// Derivative ticker symbol.
    pub symbol: String,
    /// Display precision.
    pub decimals: u8,
    /// Address the wrapper holds custody under.
    pub address: Address,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            address: Address::from_label(DEFAULT_DEPLOYMENT_LABEL),
        }
    }
}

impl WrapperConfig {
    /// Builds a config for a named deployment, deriving its address from
    /// `label`.
    pub fn labelled(name: &str, symbol: &str, decimals: u8, label: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            address: Address::from_label(label),
        }
    }

    /// Parses a JSON document and validates it. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WrapperConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against the protocol limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(ConfigError::InvalidField {
                field: "name",
                reason: format!("longer than {MAX_NAME_LENGTH} bytes"),
            });
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "symbol",
                reason: "must not be empty".into(),
            });
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(ConfigError::InvalidField {
                field: "symbol",
                reason: format!("longer than {MAX_SYMBOL_LENGTH} bytes"),
            });
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::InvalidField {
                field: "decimals",
                reason: format!("{} exceeds maximum of {MAX_DECIMALS}", self.decimals),
            });
        }
        if self.address.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "address",
                reason: "wrapper cannot live at the null address".into(),
            });
        }
        Ok(())
    }
}
