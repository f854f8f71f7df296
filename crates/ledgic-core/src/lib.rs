//! Typed call layer for ICRC ledgers and their index canisters.
//!
//! ## Layering
//!
//! - `wire/` encodes and decodes Candid binary against explicit descriptors.
//! - `types/` and `spec/` define the ledger values and fixed method signatures.
//! - `infra/` dispatches encoded calls in query or update mode.
//! - `ops/` builds ledger and index operations on top of the dispatcher.
//! - `memo` packs two identifiers into a 32-byte transaction memo.
//!
//! The default flow is: ops → spec → wire → infra → transport.

pub mod config;
pub mod context;
pub mod error;
pub mod infra;
pub mod log;
pub mod memo;
pub mod ops;
pub mod spec;
pub mod types;
pub mod wire;

#[cfg(test)]
pub mod test;

pub use ::ledgic_cdk as cdk;
pub use error::Error;

pub use {
    context::ClientContext,
    memo::{Memo, decode_uuids, encode_uuids},
    ops::{IndexOps, LedgerOps, TransactionPager, TransactionQuery},
    types::{Account, Amount, Principal, Subaccount, Timestamp},
};

///
/// Crate Version
///

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
