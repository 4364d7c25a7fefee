// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Wrapper Protocol: Shared Primitives
//!
//! The wrapped-token ledger is split in two: this crate holds the vocabulary
//! every other piece speaks, and `wrapper-contracts` holds the accounting
//! core built on top of it.
//!
//! ## Modules
//!
//! - **address**: 20-byte account identifiers and the null address.
//! - **amount**: the `Amount` integer type and the infinite-allowance sentinel.
//! - **config**: protocol constants and the per-deployment [`WrapperConfig`].
//! - **logging**: `tracing` subscriber setup for hosts and tests.
//!
//! ## Design Philosophy
//!
//! 1. Money is an unsigned integer. No floats, no implicit wrapping.
//! 2. The null address is a value, not an `Option`; it exists on the wire
//!    and every entry point must reject it explicitly.
//! 3. Every public type is serializable so ledger state can be snapshotted.

pub mod address;
pub mod amount;
pub mod config;
pub mod logging;

pub use address::{Address, AddressError};
pub use amount::{Amount, INFINITE_ALLOWANCE};
pub use config::{ConfigError, WrapperConfig};
