//!
//! Ledger value types shared by the operation builders and the indexer client.
//!
//! Every type here knows its own wire descriptor, so request builders compose
//! them into larger records without restating field shapes.
//!

mod account;
mod account_identifier;
mod amount;
mod timestamp;

pub use account::*;
pub use account_identifier::*;
pub use amount::*;
pub use timestamp::*;

//
// common types
//

pub use crate::cdk::candid::{Int, Nat, Principal};

use thiserror::Error as ThisError;

///
/// ParseError
/// Textual account, identifier, or principal input that does not parse.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ParseError {
    #[error("invalid account: {0}")]
    Account(String),

    #[error("account identifier is {0} bytes, expected 32")]
    AccountIdLength(usize),

    #[error("checksum mismatch: expected {expected}, found {found}")]
    Checksum { expected: String, found: String },

    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("invalid principal: {0}")]
    Principal(String),
}
